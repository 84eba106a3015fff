//! Blinn-Phong local lighting with optional diffuse and
//! tangent-space normal maps.
//!
//! The attribute bundle interpolates the world normal, UV and tangent
//! frame; the material handle and eye position ride along unblended
//! (copy-on-add), which requires every vertex of a triangle to share
//! the same material. Mesh construction enforces that, not this module.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::math::{Mat4, Vec2, Vec3};
use crate::shading::{Fragment, FragmentShader, Interpolatable, Vertex, VertexShader};
use crate::texture::Texture;

/// A point light: world position plus RGB intensity (not limited to
/// [0, 1]; attenuation is inverse squared distance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Rgb,
}

/// Shader-global data shared by all shading invocations in a frame.
#[derive(Debug, Clone, Default)]
pub struct BlinnPhongUniform {
    pub lights: Vec<Light>,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub ambient: Rgb,
    pub diffuse: Rgb,
    pub specular: Rgb,
    pub shininess: f64,
    pub diffuse_map: Option<Arc<Texture>>,
    pub normal_map: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Rgb::new(0.25, 0.25, 0.25),
            diffuse: Rgb::new(0.8, 0.8, 0.8),
            specular: Rgb::new(0.2, 0.2, 0.2),
            shininess: 32.0,
            diffuse_map: None,
            normal_map: None,
        }
    }
}

/// Raw mesh vertex as produced by the loader. The tangent frame is
/// zero when no normal map is in play.
#[derive(Debug, Clone)]
pub struct SurfaceVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

#[derive(Clone)]
pub struct SurfaceAttr {
    pub normal: Vec3,
    pub uv: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    /// Copy-on-add.
    pub eye: Vec3,
    /// Copy-on-add.
    pub material: Arc<Material>,
}

impl Interpolatable for SurfaceAttr {
    fn scale(&self, k: f64) -> Self {
        Self {
            normal: self.normal * k,
            uv: self.uv * k,
            tangent: self.tangent * k,
            bitangent: self.bitangent * k,
            eye: self.eye,
            material: Arc::clone(&self.material),
        }
    }

    fn add(&self, other: &Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            uv: self.uv + other.uv,
            tangent: self.tangent + other.tangent,
            bitangent: self.bitangent + other.bitangent,
            eye: self.eye,
            material: Arc::clone(&self.material),
        }
    }
}

/// Carries normals and the tangent frame into world space, and seeds
/// the eye position and material handle into the bundle.
pub struct BlinnPhongVertexShader {
    pub material: Arc<Material>,
}

impl VertexShader for BlinnPhongVertexShader {
    type In = SurfaceVertex;
    type Attr = SurfaceAttr;
    type Uniform = BlinnPhongUniform;

    fn shade(
        &self,
        input: &SurfaceVertex,
        _uniform: &BlinnPhongUniform,
        model: &Mat4,
        camera_pos: Vec3,
    ) -> Vertex<SurfaceAttr> {
        let to_world = |d: Vec3| (*model * d.to_vec4_dir()).to_vec3_dir();
        Vertex {
            position: input.position,
            attributes: SurfaceAttr {
                normal: to_world(input.normal),
                uv: input.uv,
                tangent: to_world(input.tangent),
                bitangent: to_world(input.bitangent),
                eye: camera_pos,
                material: Arc::clone(&self.material),
            },
        }
    }
}

/// Ambient + diffuse + half-vector specular per light, attenuated by
/// inverse squared distance.
pub struct BlinnPhongFragmentShader;

impl FragmentShader for BlinnPhongFragmentShader {
    type Attr = SurfaceAttr;
    type Uniform = BlinnPhongUniform;

    fn shade(&self, fragment: &Fragment<SurfaceAttr>, uniform: &BlinnPhongUniform) -> Rgb {
        let attr = &fragment.attributes;
        let material = &attr.material;

        let mut normal = attr.normal.normalized();
        if let Some(map) = &material.normal_map {
            let s = map.sample(attr.uv.x(), attr.uv.y());
            let tn = Vec3::new(s.r * 2.0 - 1.0, s.g * 2.0 - 1.0, s.b * 2.0 - 1.0);
            let tangent = attr.tangent.normalized();
            let bitangent = attr.bitangent.normalized();
            normal = (tangent * tn.x() + bitangent * tn.y() + normal * tn.z()).normalized();
        }

        let base = match &material.diffuse_map {
            Some(map) => map.sample(attr.uv.x(), attr.uv.y()),
            None => Rgb::WHITE,
        };

        let view = (attr.eye - fragment.position).normalized();
        let mut out = material.ambient * base;
        for light in &uniform.lights {
            let to_light = light.position - fragment.position;
            let irradiance = light.intensity * (1.0 / to_light.norm_squared());
            let l = to_light.normalized();

            let n_dot_l = normal.dot(&l);
            if n_dot_l <= 0.0 {
                continue;
            }
            out += material.diffuse * base * irradiance * n_dot_l;

            let half = (l + view).normalized();
            let highlight = normal.dot(&half).max(0.0).powf(material.shininess);
            out += material.specular * irradiance * highlight;
        }
        out.clamped()
    }
}
