//! Scene model: meshes with bound shader pairs and their placements
//! in world space.

use std::sync::Arc;

use thiserror::Error;

use crate::math::{Mat3, Vec3};
use crate::raster::{MeshPass, RenderError};
use crate::shading::{FragmentShader, VertexShader};

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, but the mesh has {len} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: usize,
        len: usize,
    },
}

/// A vertex-data buffer, a triangle index list and the shader pair
/// bound to them. The `FS: FragmentShader<Attr = VS::Attr, ...>`
/// bound is the construction-time check that both stages agree on the
/// attribute bundle and uniform types.
pub struct Mesh<VS: VertexShader, FS> {
    pub(crate) vertex_data: Vec<VS::In>,
    pub(crate) triangles: Vec<[usize; 3]>,
    pub(crate) vertex_shader: VS,
    pub(crate) fragment_shader: FS,
}

impl<VS, FS> Mesh<VS, FS>
where
    VS: VertexShader,
    FS: FragmentShader<Attr = VS::Attr, Uniform = VS::Uniform>,
{
    pub fn new(
        vertex_data: Vec<VS::In>,
        triangles: Vec<[usize; 3]>,
        vertex_shader: VS,
        fragment_shader: FS,
    ) -> Result<Self, MeshError> {
        let len = vertex_data.len();
        for (triangle, indices) in triangles.iter().enumerate() {
            for &index in indices {
                if index >= len {
                    return Err(MeshError::IndexOutOfBounds {
                        triangle,
                        index,
                        len,
                    });
                }
            }
        }
        Ok(Self {
            vertex_data,
            triangles,
            vertex_shader,
            fragment_shader,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_data.len()
    }
}

/// Type-erased seam letting one rasterizer loop drive meshes with
/// heterogeneous attribute types. Implemented for every `Mesh` whose
/// shader pair agrees; `begin_frame` hands back the per-frame pass
/// object owning that mesh's typed vertex/fragment arenas.
pub trait SceneMesh<U> {
    fn begin_frame<'a>(&'a self) -> Result<Box<dyn MeshPass<U> + 'a>, RenderError>;

    fn triangle_count(&self) -> usize;
}

/// Locates a shared, read-only mesh instance in world space.
/// `orientation` columns are the world images of the mesh's local
/// X/Y/Z axes.
pub struct Placement<U> {
    pub mesh: Arc<dyn SceneMesh<U>>,
    pub orientation: Mat3,
    pub position: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::shaders::flat::{PositionVertexShader, SolidShader};

    #[test]
    fn test_triangle_index_out_of_bounds() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let Err(MeshError::IndexOutOfBounds {
            triangle,
            index,
            len,
        }) = Mesh::new(
            vertices,
            vec![[0, 1, 3]],
            PositionVertexShader,
            SolidShader::new(Rgb::WHITE),
        )
        else {
            panic!("out-of-bounds triangle index was accepted");
        };
        assert_eq!((triangle, index, len), (0, 3, 3));
    }

    #[test]
    fn test_valid_mesh_counts() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(
            vertices,
            vec![[0, 1, 2]],
            PositionVertexShader,
            SolidShader::new(Rgb::WHITE),
        )
        .unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }
}
