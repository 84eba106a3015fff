//! Built-in materials: flat shading and Blinn-Phong with texturing
//! and normal mapping.

pub mod blinn_phong;
pub mod flat;

pub use blinn_phong::{
    BlinnPhongFragmentShader, BlinnPhongUniform, BlinnPhongVertexShader, Light, Material,
    SurfaceVertex,
};
pub use flat::{ColorFragmentShader, ColorVertex, ColorVertexShader, PositionVertexShader, SolidShader};
