//! Triangle scan conversion: edge tests, barycentric weights and the
//! typed per-mesh geometry pass.

use super::arena::FrameArena;
use super::{FrameContext, FrameTargets, MeshPass, PixelRef, RenderError};
use crate::color::Rgb;
use crate::math::{Vec2, Vec3};
use crate::scene::{Mesh, SceneMesh};
use crate::shading::{Fragment, FragmentShader, Interpolatable, Vertex, VertexShader};

/// Sign of the cross product of (xa, ya) and (xb, yb).
pub fn to_left(xa: f64, ya: f64, xb: f64, yb: f64) -> bool {
    xa * yb - xb * ya > 0.0
}

/// Edge-function membership test. The winding is normalized first, so
/// back faces rasterize too; strictly interior points pass all three
/// edge tests. A point exactly on an edge is claimed by exactly one of
/// two adjacent triangles sharing that edge: the shared edge runs in
/// opposite directions in the two triangles, and the fill rule keys
/// off that direction.
pub fn in_triangle(pt: Vec2, v1: Vec2, v2: Vec2, v3: Vec2) -> bool {
    let orient = cross2(v2 - v1, v3 - v1);
    if orient == 0.0 {
        return false;
    }
    let s = orient.signum();

    edge_covers(s * cross2(v2 - v1, pt - v1), (v2 - v1) * s)
        && edge_covers(s * cross2(v3 - v2, pt - v2), (v3 - v2) * s)
        && edge_covers(s * cross2(v1 - v3, pt - v3), (v1 - v3) * s)
}

/// One normalized edge test: interior side is positive. On the edge
/// line itself, accept only edges pointing upward (or leftward when
/// horizontal); the opposing triangle sees the reversed direction and
/// rejects.
fn edge_covers(value: f64, dir: Vec2) -> bool {
    if value != 0.0 {
        return value > 0.0;
    }
    dir.y() > 0.0 || (dir.y() == 0.0 && dir.x() < 0.0)
}

fn cross2(a: Vec2, b: Vec2) -> f64 {
    a.x() * b.y() - a.y() * b.x()
}

/// Screen-space barycentric weights of `pt`, from the areas of the
/// three sub-triangles it forms with each pair of vertices. `None`
/// for a degenerate triangle.
pub fn barycentric(pt: Vec2, v1: Vec2, v2: Vec2, v3: Vec2) -> Option<(f64, f64, f64)> {
    let a1 = cross2(pt - v2, pt - v3).abs();
    let a2 = cross2(pt - v3, pt - v1).abs();
    let a3 = cross2(pt - v1, pt - v2).abs();

    let sum = a1 + a2 + a3;
    if sum == 0.0 {
        return None;
    }
    Some((a1 / sum, a2 / sum, a3 / sum))
}

/// Typed geometry pass over one mesh. The arenas hold every vertex
/// and fragment produced during the frame; handles stored in the
/// pixel slots stay valid until the pass is dropped with its frame.
pub(crate) struct TypedPass<'m, VS: VertexShader, FS> {
    mesh: &'m Mesh<VS, FS>,
    vertices: FrameArena<Vertex<VS::Attr>>,
    fragments: FrameArena<Fragment<VS::Attr>>,
}

impl<VS, FS> MeshPass<VS::Uniform> for TypedPass<'_, VS, FS>
where
    VS: VertexShader,
    FS: FragmentShader<Attr = VS::Attr, Uniform = VS::Uniform>,
{
    fn run(
        &mut self,
        ctx: &FrameContext,
        uniform: &VS::Uniform,
        pass_index: u32,
        targets: &mut FrameTargets,
    ) -> Result<(), RenderError> {
        let (width, height) = (ctx.width, ctx.height);
        // Pixel centers sit half a pixel from the grid origin in NDC.
        let fw = 2.0 / width as f64;
        let fh = 2.0 / height as f64;

        for &[i1, i2, i3] in &self.mesh.triangles {
            let handles = [i1, i2, i3].map(|i| {
                let vertex = self.mesh.vertex_shader.shade(
                    &self.mesh.vertex_data[i],
                    uniform,
                    &ctx.model,
                    ctx.camera_pos,
                );
                self.vertices.alloc(vertex)
            });
            let verts = handles.map(|h| &self.vertices[h]);

            let world = verts.map(|v| (ctx.model * v.position.to_vec4_point()).to_vec3_point());
            let clip = world.map(|w| ctx.world_to_clip * w.to_vec4_point());
            let ws = clip.map(|c| c.w());
            let ndc = clip.map(|c| c.to_vec3_point());
            let screen = ndc.map(|p| p.xy());

            // Clipped bounding box, expanded by a pixel on each side
            // so fragment-center sampling cannot miss edge pixels.
            let min = |f: fn(&Vec3) -> f64| ndc.iter().map(f).fold(f64::INFINITY, f64::min);
            let max = |f: fn(&Vec3) -> f64| ndc.iter().map(f).fold(f64::NEG_INFINITY, f64::max);
            let x_lo = (((min(|p| p.x()) + 1.0) / fw - 0.5).floor() as i64 - 1).max(0);
            let x_hi = ((((max(|p| p.x()) + 1.0) / fw - 0.5).ceil() as i64) + 2).min(width as i64);
            let y_lo = (((min(|p| p.y()) + 1.0) / fh - 0.5).floor() as i64 - 1).max(0);
            let y_hi = ((((max(|p| p.y()) + 1.0) / fh - 0.5).ceil() as i64) + 2).min(height as i64);

            for y_index in y_lo..y_hi {
                for x_index in x_lo..x_hi {
                    let pt = Vec2::new(
                        (x_index as f64 + 0.5) * fw - 1.0,
                        (y_index as f64 + 0.5) * fh - 1.0,
                    );
                    if !in_triangle(pt, screen[0], screen[1], screen[2]) {
                        continue;
                    }
                    let Some((k1, k2, k3)) = barycentric(pt, screen[0], screen[1], screen[2])
                    else {
                        continue;
                    };

                    let z = k1 * ndc[0].z() + k2 * ndc[1].z() + k3 * ndc[2].z();
                    let slot = y_index as usize * targets.width + x_index as usize;
                    // Depth-range test doubles as the NaN guard for
                    // triangles degenerate under projection.
                    if !(z >= ctx.near && z <= ctx.far) {
                        continue;
                    }
                    // Nearer-or-equal: on an exact tie the
                    // later-processed triangle wins, deterministically.
                    if !(z <= targets.depth[slot]) {
                        continue;
                    }

                    // Perspective-correct weights: divide by each
                    // vertex's clip w and renormalize, so attributes
                    // vary linearly in 3-D rather than screen space.
                    let (c1, c2, c3) = (k1 / ws[0], k2 / ws[1], k3 / ws[2]);
                    let cs = c1 + c2 + c3;
                    let (c1, c2, c3) = (c1 / cs, c2 / cs, c3 / cs);

                    let attributes = Interpolatable::blend3(
                        &verts[0].attributes,
                        &verts[1].attributes,
                        &verts[2].attributes,
                        c1,
                        c2,
                        c3,
                    );
                    let position = world[0] * c1 + world[1] * c2 + world[2] * c3;
                    let fragment = self.fragments.alloc(Fragment {
                        position,
                        attributes,
                    });

                    targets.depth[slot] = z;
                    targets.slots[slot] = Some(PixelRef {
                        pass: pass_index,
                        fragment,
                    });
                }
            }
        }
        Ok(())
    }

    fn shade(&self, fragment: u32, uniform: &VS::Uniform) -> Rgb {
        self.mesh.fragment_shader.shade(&self.fragments[fragment], uniform)
    }

    fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

impl<VS, FS> SceneMesh<VS::Uniform> for Mesh<VS, FS>
where
    VS: VertexShader,
    FS: FragmentShader<Attr = VS::Attr, Uniform = VS::Uniform>,
{
    fn begin_frame<'a>(&'a self) -> Result<Box<dyn MeshPass<VS::Uniform> + 'a>, RenderError> {
        Ok(Box::new(TypedPass {
            mesh: self,
            vertices: FrameArena::new()?,
            fragments: FrameArena::new()?,
        }))
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_left_sign() {
        assert!(to_left(1.0, 0.0, 0.0, 1.0));
        assert!(!to_left(1.0, 0.0, 0.0, -1.0));
        // Collinear is not strictly to the left.
        assert!(!to_left(1.0, 0.0, 2.0, 0.0));
    }

    #[test]
    fn test_strictly_inside_and_outside() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(10.0, 0.0);
        let v3 = Vec2::new(5.0, 10.0);
        assert!(in_triangle(Vec2::new(5.0, 3.0), v1, v2, v3));
        assert!(!in_triangle(Vec2::new(-1.0, -1.0), v1, v2, v3));
        assert!(!in_triangle(Vec2::new(5.0, 11.0), v1, v2, v3));
    }

    #[test]
    fn test_winding_does_not_matter() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(10.0, 0.0);
        let v3 = Vec2::new(5.0, 10.0);
        let p = Vec2::new(5.0, 3.0);
        assert!(in_triangle(p, v1, v2, v3));
        assert!(in_triangle(p, v3, v2, v1));
    }

    #[test]
    fn test_shared_edge_claimed_exactly_once() {
        // Quad split along its diagonal; points on the shared edge
        // must land in exactly one of the two triangles.
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let c = Vec2::new(10.0, 10.0);
        let d = Vec2::new(0.0, 10.0);
        for t in [0.1, 0.25, 0.5, 0.75, 0.9] {
            let p = Vec2::new(10.0 * t, 10.0 * t);
            let in_first = in_triangle(p, a, b, c);
            let in_second = in_triangle(p, a, c, d);
            assert!(
                in_first != in_second,
                "edge point {p:?} covered {} times",
                in_first as u8 + in_second as u8
            );
        }
    }

    #[test]
    fn test_horizontal_shared_edge_claimed_exactly_once() {
        // Horizontal edge between an upper and a lower triangle, the
        // lower one wound clockwise as given.
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        let up = Vec2::new(5.0, 10.0);
        let down = Vec2::new(5.0, -10.0);
        for t in [0.1, 0.5, 0.9] {
            let p = Vec2::new(10.0 * t, 0.0);
            let in_upper = in_triangle(p, a, b, up);
            let in_lower = in_triangle(p, a, b, down);
            assert!(
                in_upper != in_lower,
                "edge point {p:?} covered {} times",
                in_upper as u8 + in_lower as u8
            );
        }
    }

    #[test]
    fn test_barycentric_valid_for_interior_points() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(8.0, 0.0);
        let v3 = Vec2::new(2.0, 6.0);
        for p in [
            Vec2::new(3.0, 1.0),
            Vec2::new(2.0, 3.0),
            Vec2::new(4.0, 2.0),
        ] {
            let (k1, k2, k3) = barycentric(p, v1, v2, v3).unwrap();
            for k in [k1, k2, k3] {
                assert!((0.0..=1.0).contains(&k));
            }
            assert!((k1 + k2 + k3 - 1.0).abs() < 1e-12);
            let back = v1 * k1 + v2 * k2 + v3 * k3;
            assert!((back - p).norm() < 1e-9);
        }
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(4.0, 0.0);
        let v3 = Vec2::new(0.0, 4.0);
        let (k1, k2, k3) = barycentric(v1, v1, v2, v3).unwrap();
        assert!((k1 - 1.0).abs() < 1e-12 && k2.abs() < 1e-12 && k3.abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_has_no_weights() {
        let v = Vec2::new(1.0, 1.0);
        assert!(barycentric(v, v, v, v).is_none());
    }
}
