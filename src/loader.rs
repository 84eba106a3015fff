//! OBJ/MTL loading: turns a Wavefront model into Blinn-Phong meshes.
//!
//! Missing normals are reconstructed by area-weighted averaging of
//! face normals; per-vertex tangent frames are accumulated from UV
//! deltas when the material carries a normal map.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::color::Rgb;
use crate::math::{Vec2, Vec3};
use crate::scene::{Mesh, MeshError};
use crate::shaders::blinn_phong::{
    BlinnPhongFragmentShader, BlinnPhongVertexShader, Material, SurfaceVertex,
};
use crate::texture::Texture;

pub type SurfaceMesh = Mesh<BlinnPhongVertexShader, BlinnPhongFragmentShader>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Loads every model in an OBJ file as a Blinn-Phong mesh. Texture
/// paths in the companion MTL are resolved relative to the OBJ.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<Arc<SurfaceMesh>>, LoadError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)?;
    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("no materials for {}: {e}", path.display());
            Vec::new()
        }
    };
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut meshes = Vec::with_capacity(models.len());
    for model in &models {
        let record = model.mesh.material_id.and_then(|id| materials.get(id));
        let material = Arc::new(convert_material(record, base)?);
        let mesh = build_mesh(&model.mesh, material)?;
        log::info!(
            "loaded mesh '{}': {} vertices, {} triangles",
            model.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        meshes.push(Arc::new(mesh));
    }
    Ok(meshes)
}

fn convert_material(record: Option<&tobj::Material>, base: &Path) -> Result<Material, LoadError> {
    let defaults = Material::default();
    let Some(record) = record else {
        return Ok(defaults);
    };

    let rgb = |v: Option<[f32; 3]>, fallback: Rgb| {
        v.map(|c| Rgb::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .unwrap_or(fallback)
    };
    let texture = |name: &Option<String>| -> Result<Option<Arc<Texture>>, LoadError> {
        match name {
            Some(name) if !name.is_empty() => Ok(Some(Arc::new(Texture::open(base.join(name))?))),
            _ => Ok(None),
        }
    };

    Ok(Material {
        ambient: rgb(record.ambient, defaults.ambient),
        diffuse: rgb(record.diffuse, defaults.diffuse),
        specular: rgb(record.specular, defaults.specular),
        shininess: record.shininess.map(f64::from).unwrap_or(defaults.shininess),
        diffuse_map: texture(&record.diffuse_texture)?,
        normal_map: texture(&record.normal_texture)?,
    })
}

fn build_mesh(mesh: &tobj::Mesh, material: Arc<Material>) -> Result<SurfaceMesh, LoadError> {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        .collect();
    let triangles: Vec<[usize; 3]> = mesh
        .indices
        .chunks_exact(3)
        .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
        .collect();

    let uvs: Vec<Vec2> = if mesh.texcoords.is_empty() {
        vec![Vec2::zero(); positions.len()]
    } else {
        mesh.texcoords
            .chunks_exact(2)
            .map(|uv| Vec2::new(uv[0] as f64, uv[1] as f64))
            .collect()
    };
    let normals: Vec<Vec3> = if mesh.normals.is_empty() {
        averaged_normals(&positions, &triangles)
    } else {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64))
            .collect()
    };
    let (tangents, bitangents) = if material.normal_map.is_some() {
        tangent_frames(&positions, &uvs, &triangles)
    } else {
        (
            vec![Vec3::zero(); positions.len()],
            vec![Vec3::zero(); positions.len()],
        )
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &position)| SurfaceVertex {
            position,
            normal: normals[i],
            uv: uvs[i],
            tangent: tangents[i],
            bitangent: bitangents[i],
        })
        .collect();

    Ok(Mesh::new(
        vertices,
        triangles,
        BlinnPhongVertexShader { material },
        BlinnPhongFragmentShader,
    )?)
}

/// Area-weighted per-vertex normals from face geometry.
pub(crate) fn averaged_normals(positions: &[Vec3], triangles: &[[usize; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::zero(); positions.len()];
    for &[a, b, c] in triangles {
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        for i in [a, b, c] {
            normals[i] += face;
        }
    }
    normals
        .into_iter()
        .map(|n| if n.norm_squared() > 0.0 { n.normalized() } else { n })
        .collect()
}

/// Per-vertex tangent/bitangent accumulation from triangle UV deltas.
/// Triangles with degenerate UV area contribute nothing.
pub(crate) fn tangent_frames(
    positions: &[Vec3],
    uvs: &[Vec2],
    triangles: &[[usize; 3]],
) -> (Vec<Vec3>, Vec<Vec3>) {
    let mut tangents = vec![Vec3::zero(); positions.len()];
    let mut bitangents = vec![Vec3::zero(); positions.len()];

    for &[a, b, c] in triangles {
        let e1 = positions[b] - positions[a];
        let e2 = positions[c] - positions[a];
        let d1 = uvs[b] - uvs[a];
        let d2 = uvs[c] - uvs[a];

        let det = d1.x() * d2.y() - d1.y() * d2.x();
        if det.abs() < 1e-12 {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (e1 * d2.y() - e2 * d1.y()) * r;
        let bitangent = (e2 * d1.x() - e1 * d2.x()) * r;
        for i in [a, b, c] {
            tangents[i] += tangent;
            bitangents[i] += bitangent;
        }
    }

    let normalize = |v: Vec3| if v.norm_squared() > 0.0 { v.normalized() } else { v };
    (
        tangents.into_iter().map(normalize).collect(),
        bitangents.into_iter().map(normalize).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averaged_normals_of_flat_triangle() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normals = averaged_normals(&positions, &[[0, 1, 2]]);
        for n in normals {
            assert!((n - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_tangent_frame_follows_uv_axes() {
        // A unit quad with identity UVs: tangent tracks +X, bitangent +Y.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let (tangents, bitangents) = tangent_frames(&positions, &uvs, &[[0, 1, 2], [0, 2, 3]]);
        for t in tangents {
            assert!((t - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-9);
        }
        for b in bitangents {
            assert!((b - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_uvs_leave_zero_tangents() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![Vec2::zero(); 3];
        let (tangents, _) = tangent_frames(&positions, &uvs, &[[0, 1, 2]]);
        for t in tangents {
            assert_eq!(t, Vec3::zero());
        }
    }
}
