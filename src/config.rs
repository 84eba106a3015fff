//! RON scene configuration: seeds the shell's camera, frustum, light
//! and output settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb;
use crate::math::Vec3;
use crate::shaders::blinn_phong::Light;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub up: [f64; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 100.0, 0.0],
            direction: [0.0, -1.0, 0.0],
            up: [1.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    pub near: f64,
    pub far: f64,
    /// Vertical field of view in degrees.
    pub fov_y: f64,
    pub aspect_ratio: f64,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 200.0,
            fov_y: 90.0,
            aspect_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f64; 3],
    pub intensity: [f64; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [-4.0, 16.0, 30.0],
            intensity: [600.0, 600.0, 600.0],
        }
    }
}

impl LightConfig {
    pub fn to_light(&self) -> Light {
        Light {
            position: Vec3::from(self.position),
            intensity: Rgb::new(self.intensity[0], self.intensity[1], self.intensity[2]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub frustum: FrustumConfig,
    pub light: LightConfig,
    pub width: usize,
    pub height: usize,
    pub model: Option<PathBuf>,
    pub output: PathBuf,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            frustum: FrustumConfig::default(),
            light: LightConfig::default(),
            width: 800,
            height: 800,
            model: None,
            output: PathBuf::from("out.png"),
        }
    }
}

impl SceneConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(ron::from_str(&std::fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config: SceneConfig = ron::from_str(
            r#"(
                camera: (position: (2.0, 16.0, 13.0), direction: (-2.0, -2.0, -10.0)),
                frustum: (near: 0.5),
                width: 600,
                height: 1000,
                model: Some("samples/keqing.obj"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.camera.position, [2.0, 16.0, 13.0]);
        assert_eq!(config.camera.up, [1.0, 0.0, 0.0]);
        assert_eq!(config.frustum.near, 0.5);
        assert_eq!(config.frustum.far, 200.0);
        assert_eq!((config.width, config.height), (600, 1000));
        assert_eq!(config.output, PathBuf::from("out.png"));
    }

    #[test]
    fn test_defaults_form_a_valid_light() {
        let light = SceneConfig::default().light.to_light();
        assert_eq!(light.position, Vec3::new(-4.0, 16.0, 30.0));
        assert_eq!(light.intensity, Rgb::new(600.0, 600.0, 600.0));
    }
}
