//! Rasterizer engine: per-frame geometry/visibility pass followed by
//! a deferred shading pass.
//!
//! The geometry pass transforms and scans every triangle, resolving
//! visibility in a depth buffer and storing an arena handle to the
//! winning fragment per pixel. The shading pass then runs each
//! pixel's fragment shader at most once, after the nearest surface is
//! already known. The two phases are kept separable on purpose.

mod arena;
mod render;

pub use arena::FrameArena;
pub use render::{barycentric, in_triangle, to_left};

use thiserror::Error;

use crate::color::Rgb;
use crate::framebuffer::ColorBuffer;
use crate::math::{Mat3, Mat4, Vec3};
use crate::scene::{Placement, SceneMesh};
use crate::transform::{model_transform, projection_transform, screen_transform, view_transform};
use std::sync::Arc;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid frustum: near {near} and far {far} must satisfy 0 < near < far")]
    InvalidFrustum { near: f64, far: f64 },
    #[error("field of view {0} rad is outside (0, pi)")]
    InvalidFieldOfView(f64),
    #[error("aspect ratio {0} must be positive")]
    InvalidAspectRatio(f64),
    #[error("output size {width}x{height} has no pixels")]
    EmptyViewport { width: usize, height: usize },
    #[error("arena element size {size} exceeds the {block_bytes}-byte block size")]
    ArenaElementTooLarge { size: usize, block_bytes: usize },
}

/// Read-only per-frame parameters shared by every mesh pass.
pub struct FrameContext {
    pub(crate) world_to_clip: Mat4,
    pub(crate) model: Mat4,
    pub(crate) camera_pos: Vec3,
    pub(crate) near: f64,
    pub(crate) far: f64,
    pub(crate) width: usize,
    pub(crate) height: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PixelRef {
    pub(crate) pass: u32,
    pub(crate) fragment: u32,
}

/// Depth buffer plus per-pixel fragment handles, bottom-left origin.
/// Created fresh for each `rasterize` call and owned by it.
pub struct FrameTargets {
    pub(crate) width: usize,
    pub(crate) depth: Vec<f64>,
    pub(crate) slots: Vec<Option<PixelRef>>,
}

impl FrameTargets {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            // Sentinel farther than any valid depth.
            depth: vec![f64::INFINITY; width * height],
            slots: vec![None; width * height],
        }
    }
}

/// One mesh's share of a frame: the typed geometry pass plus deferred
/// shading over the fragments it stored. Holds the mesh's vertex and
/// fragment arenas for the duration of the `rasterize` call.
pub trait MeshPass<U> {
    fn run(
        &mut self,
        ctx: &FrameContext,
        uniform: &U,
        pass_index: u32,
        targets: &mut FrameTargets,
    ) -> Result<(), RenderError>;

    fn shade(&self, fragment: u32, uniform: &U) -> Rgb;

    fn fragment_count(&self) -> usize;
}

/// The scene-facing entry point: a list of placed meshes, the shared
/// shading uniform, and the frame algorithm.
pub struct Rasterizer<U> {
    placements: Vec<Placement<U>>,
    pub uniform: U,
    pub background: Rgb,
}

impl<U> Rasterizer<U> {
    pub fn new(uniform: U) -> Self {
        Self {
            placements: Vec::new(),
            uniform,
            background: Rgb::BLACK,
        }
    }

    pub fn add_placement(&mut self, placement: Placement<U>) {
        self.placements.push(placement);
    }

    pub fn place(&mut self, mesh: Arc<dyn SceneMesh<U>>, orientation: Mat3, position: Vec3) {
        self.add_placement(Placement {
            mesh,
            orientation,
            position,
        });
    }

    pub fn clear_placements(&mut self) {
        self.placements.clear();
    }

    pub fn placements(&self) -> &[Placement<U>] {
        &self.placements
    }

    /// Renders one frame and returns the finished color buffer.
    ///
    /// `fov_y` is the vertical field of view in radians; `near` and
    /// `far` are positive distances along the viewing axis. The call
    /// runs to completion or fails as a whole; it never returns a
    /// partially-correct image.
    #[allow(clippy::too_many_arguments)]
    pub fn rasterize(
        &self,
        camera_pos: Vec3,
        camera_dir: Vec3,
        camera_up: Vec3,
        near: f64,
        far: f64,
        fov_y: f64,
        aspect_ratio: f64,
        width: usize,
        height: usize,
    ) -> Result<ColorBuffer, RenderError> {
        if !(near > 0.0 && far > near) {
            return Err(RenderError::InvalidFrustum { near, far });
        }
        if !(fov_y > 0.0 && fov_y < std::f64::consts::PI) {
            return Err(RenderError::InvalidFieldOfView(fov_y));
        }
        if !(aspect_ratio > 0.0) {
            return Err(RenderError::InvalidAspectRatio(aspect_ratio));
        }
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyViewport { width, height });
        }

        let view = view_transform(camera_pos, camera_dir, camera_up);
        let projection = projection_transform(near, far);
        let screen = screen_transform(fov_y, aspect_ratio, near);
        let world_to_clip = screen * projection * view;

        log::debug!(
            "rasterizing {}x{} frame, {} placements",
            width,
            height,
            self.placements.len()
        );

        let mut targets = FrameTargets::new(width, height);
        let mut passes: Vec<Box<dyn MeshPass<U> + '_>> = Vec::with_capacity(self.placements.len());

        // Geometry pass: transform, scan and depth-test every
        // triangle of every placed mesh.
        for placement in &self.placements {
            let pass_index = passes.len() as u32;
            let mut pass = placement.mesh.begin_frame()?;
            let ctx = FrameContext {
                world_to_clip,
                model: model_transform(placement.position, placement.orientation),
                camera_pos,
                near,
                far,
                width,
                height,
            };
            pass.run(&ctx, &self.uniform, pass_index, &mut targets)?;
            log::debug!(
                "mesh {}: {} triangles, {} fragments stored",
                pass_index,
                placement.mesh.triangle_count(),
                pass.fragment_count()
            );
            passes.push(pass);
        }

        // Deferred shading pass: each surviving fragment is shaded at
        // most once, after the winning surface per pixel is known.
        let mut color = ColorBuffer::filled(width, height, self.background);
        for y in 0..height {
            for x in 0..width {
                if let Some(px) = targets.slots[y * width + x] {
                    let shaded = passes[px.pass as usize].shade(px.fragment, &self.uniform);
                    color.set_pixel(x, y, shaded.clamped());
                }
            }
        }
        Ok(color)
    }
}
