//! CPU triangle rasterization pipeline.
//!
//! Emulates a fixed-function GPU on the CPU: meshes go through a
//! user-supplied vertex-shader stage, triangles are scanned with
//! barycentric edge tests, visibility is resolved with a depth buffer,
//! and surviving fragments are shaded once per pixel in a deferred pass
//! with perspective-correct attribute interpolation.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod color;
pub mod config;
pub mod framebuffer;
pub mod loader;
pub mod math;
pub mod raster;
pub mod scene;
pub mod shaders;
pub mod shading;
pub mod texture;
pub mod transform;

pub use color::Rgb;
pub use framebuffer::ColorBuffer;
pub use raster::{Rasterizer, RenderError};
pub use scene::{Mesh, MeshError, Placement, SceneMesh};
pub use shading::{Fragment, FragmentShader, Interpolatable, Vertex, VertexShader};
pub use texture::Texture;
