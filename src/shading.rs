//! Pipeline stage contracts: interpolatable attribute bundles, the
//! vertex/fragment value containers, and the shader traits.
//!
//! A mesh binds one vertex-shader/fragment-shader pair; their
//! attribute and uniform types must agree, which `Mesh::new` enforces
//! through trait bounds at construction time.

use crate::color::Rgb;
use crate::math::{Mat4, Matrix, Vec3};

/// Attribute bundles that can be blended with barycentric weights.
///
/// The closure property: for weights summing to 1,
/// `blend3(a, b, c, k1, k2, k3)` must yield a semantically valid
/// attribute. Non-numeric payloads (texture or material handles) are
/// carried through unchanged by convention: `scale` and `add` copy
/// them from `self` instead of combining, and all three vertices of a
/// triangle must reference the same handle. That is a precondition on
/// mesh construction, not something interpolation enforces.
pub trait Interpolatable: Clone {
    fn scale(&self, k: f64) -> Self;

    fn add(&self, other: &Self) -> Self;

    fn blend3(a: &Self, b: &Self, c: &Self, k1: f64, k2: f64, k3: f64) -> Self {
        a.scale(k1).add(&b.scale(k2)).add(&c.scale(k3))
    }
}

impl Interpolatable for () {
    fn scale(&self, _k: f64) -> Self {}

    fn add(&self, _other: &Self) -> Self {}
}

impl Interpolatable for f64 {
    fn scale(&self, k: f64) -> Self {
        self * k
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }
}

impl<const R: usize, const C: usize> Interpolatable for Matrix<R, C> {
    fn scale(&self, k: f64) -> Self {
        *self * k
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }
}

impl Interpolatable for Rgb {
    fn scale(&self, k: f64) -> Self {
        *self * k
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }
}

/// Output of the vertex stage: a model-space position plus one
/// attribute bundle.
#[derive(Debug, Clone)]
pub struct Vertex<A> {
    pub position: Vec3,
    pub attributes: A,
}

/// Output of interpolation: a world-space position plus the blended
/// attribute bundle of the three originating vertices. Owned by the
/// rasterizer's frame arena; invalidated en masse when the frame ends.
#[derive(Debug, Clone)]
pub struct Fragment<A> {
    pub position: Vec3,
    pub attributes: A,
}

/// Per-vertex stage. Must be deterministic and side-effect-free given
/// its inputs. `camera_pos` lets lit materials seed view-dependent
/// data into the attribute bundle.
pub trait VertexShader {
    type In;
    type Attr: Interpolatable;
    type Uniform;

    fn shade(
        &self,
        input: &Self::In,
        uniform: &Self::Uniform,
        model: &Mat4,
        camera_pos: Vec3,
    ) -> Vertex<Self::Attr>;
}

/// Per-fragment stage. Must not mutate the fragment.
pub trait FragmentShader {
    type Attr: Interpolatable;
    type Uniform;

    fn shade(&self, fragment: &Fragment<Self::Attr>, uniform: &Self::Uniform) -> Rgb;
}
