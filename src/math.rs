//! Fixed-dimension vector/matrix math for the rendering pipeline.
//!
//! `Matrix<R, C>` is a row-major R x C array of f64; dimension
//! compatibility of products is checked by the type system through
//! const generics. Column vectors are `Matrix<N, 1>`.

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const R: usize, const C: usize>(pub [[f64; C]; R]);

// serde cannot derive through the nested const-generic array, so the
// elements travel as a flat row-major sequence of R * C numbers.
impl<const R: usize, const C: usize> Serialize for Matrix<R, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(R * C))?;
        for row in &self.0 {
            for v in row {
                seq.serialize_element(v)?;
            }
        }
        seq.end()
    }
}

impl<'de, const R: usize, const C: usize> Deserialize<'de> for Matrix<R, C> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ElementsVisitor<const R: usize, const C: usize>;

        impl<'de, const R: usize, const C: usize> Visitor<'de> for ElementsVisitor<R, C> {
            type Value = Matrix<R, C>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a sequence of {} numbers", R * C)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut out = Matrix::zero();
                for i in 0..R {
                    for j in 0..C {
                        out.0[i][j] = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::invalid_length(i * C + j, &self))?;
                    }
                }
                Ok(out)
            }
        }

        deserializer.deserialize_seq(ElementsVisitor::<R, C>)
    }
}

pub type Vec2 = Matrix<2, 1>;
pub type Vec3 = Matrix<3, 1>;
pub type Vec4 = Matrix<4, 1>;
pub type Mat3 = Matrix<3, 3>;
pub type Mat4 = Matrix<4, 4>;

impl<const R: usize, const C: usize> Matrix<R, C> {
    pub const fn zero() -> Self {
        Matrix([[0.0; C]; R])
    }

    pub fn transposed(&self) -> Matrix<C, R> {
        let mut out = Matrix::<C, R>::zero();
        for i in 0..R {
            for j in 0..C {
                out.0[j][i] = self.0[i][j];
            }
        }
        out
    }

    /// Squared Frobenius norm (squared length for vectors).
    pub fn norm_squared(&self) -> f64 {
        let mut sum = 0.0;
        for row in &self.0 {
            for v in row {
                sum += v * v;
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Divides by the norm. A zero-length input yields NaN components;
    /// callers must guarantee non-degenerate vectors.
    pub fn normalized(&self) -> Self {
        *self * (1.0 / self.norm())
    }
}

impl<const R: usize, const C: usize> Default for Matrix<R, C> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> Matrix<N, N> {
    pub fn identity() -> Self {
        let mut out = Self::zero();
        for i in 0..N {
            out.0[i][i] = 1.0;
        }
        out
    }

    /// Inverse via Gaussian elimination, pivoting on the
    /// largest-magnitude candidate in each column. `None` for a
    /// singular matrix.
    pub fn inverted(&self) -> Option<Self> {
        let mut a = self.0;
        let mut inv = Self::identity().0;

        for col in 0..N {
            let pivot = (col..N).max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(Ordering::Equal)
            })?;
            if a[pivot][col].abs() < 1e-12 {
                return None;
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);

            let d = a[col][col];
            for k in 0..N {
                a[col][k] /= d;
                inv[col][k] /= d;
            }
            for row in 0..N {
                if row == col {
                    continue;
                }
                let f = a[row][col];
                if f == 0.0 {
                    continue;
                }
                for k in 0..N {
                    a[row][k] -= f * a[col][k];
                    inv[row][k] -= f * inv[col][k];
                }
            }
        }
        Some(Matrix(inv))
    }
}

impl Matrix<2, 1> {
    pub const fn new(x: f64, y: f64) -> Self {
        Matrix([[x], [y]])
    }

    pub fn x(&self) -> f64 {
        self.0[0][0]
    }

    pub fn y(&self) -> f64 {
        self.0[1][0]
    }
}

impl Matrix<3, 1> {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Matrix([[x], [y], [z]])
    }

    pub fn x(&self) -> f64 {
        self.0[0][0]
    }

    pub fn y(&self) -> f64 {
        self.0[1][0]
    }

    pub fn z(&self) -> f64 {
        self.0[2][0]
    }

    pub fn cross(&self, other: &Self) -> Self {
        Vec3::new(
            self.y() * other.z() - other.y() * self.z(),
            self.z() * other.x() - other.z() * self.x(),
            self.x() * other.y() - other.x() * self.y(),
        )
    }

    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x(), self.y())
    }

    /// Homogeneous point: w = 1.
    pub fn to_vec4_point(&self) -> Vec4 {
        Vec4::new(self.x(), self.y(), self.z(), 1.0)
    }

    /// Homogeneous direction: w = 0.
    pub fn to_vec4_dir(&self) -> Vec4 {
        Vec4::new(self.x(), self.y(), self.z(), 0.0)
    }
}

impl Matrix<4, 1> {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Matrix([[x], [y], [z], [w]])
    }

    pub fn x(&self) -> f64 {
        self.0[0][0]
    }

    pub fn y(&self) -> f64 {
        self.0[1][0]
    }

    pub fn z(&self) -> f64 {
        self.0[2][0]
    }

    pub fn w(&self) -> f64 {
        self.0[3][0]
    }

    /// Back to 3-space as a point: perspective divide by w.
    pub fn to_vec3_point(&self) -> Vec3 {
        Vec3::new(self.x() / self.w(), self.y() / self.w(), self.z() / self.w())
    }

    /// Back to 3-space as a direction: w dropped.
    pub fn to_vec3_dir(&self) -> Vec3 {
        Vec3::new(self.x(), self.y(), self.z())
    }
}

impl<const R: usize> Matrix<R, 1> {
    pub fn dot(&self, other: &Self) -> f64 {
        let mut sum = 0.0;
        for i in 0..R {
            sum += self.0[i][0] * other.0[i][0];
        }
        sum
    }
}

impl<const R: usize> From<[f64; R]> for Matrix<R, 1> {
    fn from(values: [f64; R]) -> Self {
        let mut out = Self::zero();
        for (i, v) in values.into_iter().enumerate() {
            out.0[i][0] = v;
        }
        out
    }
}

impl<const R: usize, const C: usize> Index<(usize, usize)> for Matrix<R, C> {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.0[r][c]
    }
}

impl<const R: usize, const C: usize> IndexMut<(usize, usize)> for Matrix<R, C> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.0[r][c]
    }
}

impl<const R: usize> Index<usize> for Matrix<R, 1> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i][0]
    }
}

impl<const R: usize> IndexMut<usize> for Matrix<R, 1> {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i][0]
    }
}

impl<const R: usize, const C: usize> Add for Matrix<R, C> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const R: usize, const C: usize> AddAssign for Matrix<R, C> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..R {
            for j in 0..C {
                self.0[i][j] += rhs.0[i][j];
            }
        }
    }
}

impl<const R: usize, const C: usize> Sub for Matrix<R, C> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<const R: usize, const C: usize> SubAssign for Matrix<R, C> {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..R {
            for j in 0..C {
                self.0[i][j] -= rhs.0[i][j];
            }
        }
    }
}

impl<const R: usize, const C: usize> Mul<f64> for Matrix<R, C> {
    type Output = Self;

    fn mul(mut self, k: f64) -> Self {
        for i in 0..R {
            for j in 0..C {
                self.0[i][j] *= k;
            }
        }
        self
    }
}

impl<const R: usize, const C: usize> Neg for Matrix<R, C> {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

impl<const R: usize, const C: usize, const K: usize> Mul<Matrix<C, K>> for Matrix<R, C> {
    type Output = Matrix<R, K>;

    fn mul(self, rhs: Matrix<C, K>) -> Matrix<R, K> {
        let mut out = Matrix::<R, K>::zero();
        for i in 0..R {
            for j in 0..C {
                for k in 0..K {
                    out.0[i][k] += self.0[i][j] * rhs.0[j][k];
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(&b) - 32.0).abs() < EPS);
    }

    #[test]
    fn test_cross_right_handed() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert!((z.x()).abs() < EPS && (z.y()).abs() < EPS && (z.z() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_matrix_product_identity() {
        let m = Matrix::<3, 3>([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]]);
        let p = m * Mat3::identity();
        assert_eq!(p, m);
    }

    #[test]
    fn test_product_dimensions() {
        let a = Matrix::<2, 3>([[1.0, 0.0, 2.0], [0.0, 1.0, 1.0]]);
        let b = Matrix::<3, 1>([[3.0], [4.0], [5.0]]);
        let c = a * b;
        assert!((c[0] - 13.0).abs() < EPS);
        assert!((c[1] - 9.0).abs() < EPS);
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::<2, 3>([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let t = m.transposed();
        assert_eq!(t.0, [[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);
    }

    #[test]
    fn test_normalize() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        let n = v.normalized();
        assert!((n.norm() - 1.0).abs() < EPS);
        assert!((n.x() - 0.6).abs() < EPS);
    }

    #[test]
    fn test_normalize_zero_propagates_nan() {
        let n = Vec3::zero().normalized();
        assert!(n.x().is_nan());
    }

    #[test]
    fn test_inverse_times_self_is_identity() {
        let m = Matrix::<3, 3>([[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]]);
        let inv = m.inverted().unwrap();
        let p = inv * m;
        let id = Mat3::identity();
        for i in 0..3 {
            for j in 0..3 {
                assert!((p[(i, j)] - id[(i, j)]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_inverse_singular() {
        let m = Matrix::<2, 2>([[1.0, 2.0], [2.0, 4.0]]);
        assert!(m.inverted().is_none());
    }

    #[test]
    fn test_inverse_needs_pivoting() {
        // Zero in the top-left forces a row swap.
        let m = Matrix::<2, 2>([[0.0, 1.0], [1.0, 0.0]]);
        let inv = m.inverted().unwrap();
        assert_eq!(inv.0, [[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn test_homogeneous_round_trip() {
        let p = Vec3::new(1.5, -2.0, 7.0);
        let back = p.to_vec4_point().to_vec3_point();
        assert!((back - p).norm() < EPS);

        let scaled = p.to_vec4_point() * 3.0;
        let back = scaled.to_vec3_point();
        assert!((back - p).norm() < EPS);
    }

    #[test]
    fn test_serde_round_trip() {
        let v = Vec3::new(1.0, -2.5, 3.0);
        let text = ron::to_string(&v).unwrap();
        let back: Vec3 = ron::from_str(&text).unwrap();
        assert_eq!(back, v);

        let m = Mat3::identity();
        let back: Mat3 = ron::from_str(&ron::to_string(&m).unwrap()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_deserialize_rejects_short_sequence() {
        assert!(ron::from_str::<Vec3>("[1.0, 2.0]").is_err());
    }

    #[test]
    fn test_direction_has_zero_w() {
        let d = Vec3::new(1.0, 2.0, 3.0).to_vec4_dir();
        assert_eq!(d.w(), 0.0);
        assert_eq!(d.to_vec3_dir(), Vec3::new(1.0, 2.0, 3.0));
    }
}
