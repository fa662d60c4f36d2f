//! Symmetric 4x4 error quadrics.

use std::ops::{Add, AddAssign};

use nalgebra::Point3;

/// Sum of squared distances to a set of planes, as a symmetric 4x4 matrix.
///
/// Stored as the 10 upper-triangular entries:
///
/// ```text
/// | 0 1 2 3 |
/// | 1 4 5 6 |
/// | 2 5 7 8 |
/// | 3 6 8 9 |
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Quadric {
    data: [f64; 10],
}

impl Quadric {
    pub(crate) fn zero() -> Self {
        Self { data: [0.0; 10] }
    }

    /// Quadric of the plane `ax + by + cz + d = 0`, with `(a, b, c)` of unit length.
    pub(crate) fn from_plane(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            data: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    /// Determinant of the 3x3 matrix picked out by the nine packed indices, row by row.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn det(
        &self,
        a11: usize,
        a12: usize,
        a13: usize,
        a21: usize,
        a22: usize,
        a23: usize,
        a31: usize,
        a32: usize,
        a33: usize,
    ) -> f64 {
        let m = &self.data;
        m[a11] * m[a22] * m[a33] + m[a13] * m[a21] * m[a32] + m[a12] * m[a23] * m[a31]
            - m[a13] * m[a22] * m[a31]
            - m[a11] * m[a23] * m[a32]
            - m[a12] * m[a21] * m[a33]
    }

    /// `vᵀ Q v` for `v = [x, y, z, 1]`.
    pub(crate) fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let (x, y, z) = (p.x, p.y, p.z);
        let m = &self.data;
        m[0] * x * x
            + 2.0 * m[1] * x * y
            + 2.0 * m[2] * x * z
            + 2.0 * m[3] * x
            + m[4] * y * y
            + 2.0 * m[5] * y * z
            + 2.0 * m[6] * y
            + m[7] * z * z
            + 2.0 * m[8] * z
            + m[9]
    }

    /// Point minimizing the error, by Cramer's rule on the upper-left 3x3 block.
    ///
    /// Returns `None` when that block is singular.
    pub(crate) fn minimizer(&self) -> Option<Point3<f64>> {
        let det = self.det(0, 1, 2, 1, 4, 5, 2, 5, 7);
        if det == 0.0 {
            return None;
        }
        Some(Point3::new(
            -1.0 / det * self.det(1, 2, 3, 4, 5, 6, 5, 7, 8),
            1.0 / det * self.det(0, 2, 3, 1, 5, 6, 2, 7, 8),
            -1.0 / det * self.det(0, 1, 3, 1, 4, 6, 2, 5, 8),
        ))
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        for (a, b) in self.data.iter_mut().zip(other.data) {
            *a += b;
        }
    }
}

impl Add for Quadric {
    type Output = Quadric;

    fn add(mut self, other: Quadric) -> Quadric {
        self += other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadric_from_plane() {
        // z = 0
        let q = Quadric::from_plane(0.0, 0.0, 1.0, 0.0);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 0.0, 0.0)), 0.0);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 0.0, 1.0)), 1.0);
        assert_relative_eq!(q.evaluate(&Point3::new(5.0, 3.0, 2.0)), 4.0);
    }

    #[test]
    fn test_quadric_addition() {
        let q = Quadric::from_plane(1.0, 0.0, 0.0, 0.0) + Quadric::from_plane(0.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(q.evaluate(&Point3::new(3.0, 4.0, 0.0)), 25.0);
    }

    #[test]
    fn test_minimizer_of_three_planes() {
        // x = 1, y = 2, z = -3
        let q = Quadric::from_plane(1.0, 0.0, 0.0, -1.0)
            + Quadric::from_plane(0.0, 1.0, 0.0, -2.0)
            + Quadric::from_plane(0.0, 0.0, 1.0, 3.0);
        let p = q.minimizer().unwrap();
        assert_relative_eq!(p, Point3::new(1.0, 2.0, -3.0), epsilon = 1e-12);
        assert_relative_eq!(q.evaluate(&p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_minimizer_singular() {
        // Two planes meet in a line, so there is no unique minimizer
        let q = Quadric::from_plane(1.0, 0.0, 0.0, 0.0) + Quadric::from_plane(0.0, 1.0, 0.0, 0.0);
        assert!(q.minimizer().is_none());
        assert_eq!(Quadric::zero().minimizer(), None);
    }
}
