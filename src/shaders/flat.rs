//! Unlit shaders: solid color and interpolated per-vertex color.

use crate::color::Rgb;
use crate::math::{Mat4, Vec3};
use crate::shading::{Fragment, FragmentShader, Vertex, VertexShader};

/// Passes a bare position through; no attributes.
pub struct PositionVertexShader;

impl VertexShader for PositionVertexShader {
    type In = Vec3;
    type Attr = ();
    type Uniform = ();

    fn shade(&self, input: &Vec3, _uniform: &(), _model: &Mat4, _camera_pos: Vec3) -> Vertex<()> {
        Vertex {
            position: *input,
            attributes: (),
        }
    }
}

/// A single constant color, independent of the fragment.
pub struct SolidShader {
    color: Rgb,
}

impl SolidShader {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }

    /// The classic half-gray debug material.
    pub fn gray() -> Self {
        Self::new(Rgb::new(0.5, 0.5, 0.5))
    }
}

impl FragmentShader for SolidShader {
    type Attr = ();
    type Uniform = ();

    fn shade(&self, _fragment: &Fragment<()>, _uniform: &()) -> Rgb {
        self.color
    }
}

/// Raw vertex carrying its own color.
#[derive(Debug, Clone, Copy)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Rgb,
}

pub struct ColorVertexShader;

impl VertexShader for ColorVertexShader {
    type In = ColorVertex;
    type Attr = Rgb;
    type Uniform = ();

    fn shade(
        &self,
        input: &ColorVertex,
        _uniform: &(),
        _model: &Mat4,
        _camera_pos: Vec3,
    ) -> Vertex<Rgb> {
        Vertex {
            position: input.position,
            attributes: input.color,
        }
    }
}

/// Emits the barycentrically blended vertex color.
pub struct ColorFragmentShader;

impl FragmentShader for ColorFragmentShader {
    type Attr = Rgb;
    type Uniform = ();

    fn shade(&self, fragment: &Fragment<Rgb>, _uniform: &()) -> Rgb {
        fragment.attributes
    }
}
