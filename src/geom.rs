//! Small geometric helpers shared by the builder and the algorithms.
//!
//! Vector arithmetic (cross and dot products, norms) comes from `nalgebra`;
//! this module adds the few derived quantities the mesh code needs, with
//! explicit handling of zero-length vectors.

use nalgebra::{Point3, Vector3};

/// Unnormalized normal of the triangle `(p0, p1, p2)`: `(p1 - p0) × (p2 - p0)`.
#[inline]
pub fn triangle_cross(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    (p1 - p0).cross(&(p2 - p0))
}

/// Unit normal of the triangle `(p0, p1, p2)`.
///
/// Returns `None` when the cross product is exactly zero, i.e. the points are
/// collinear or coincident.
#[inline]
pub fn triangle_normal(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Option<Vector3<f64>> {
    normalize(&triangle_cross(p0, p1, p2))
}

/// Normalize a vector, or `None` if its length is zero.
#[inline]
pub fn normalize(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let len = v.norm();
    if len == 0.0 {
        None
    } else {
        Some(v / len)
    }
}

/// Normalize a vector, returning the zero vector for zero length.
#[inline]
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    normalize(v).unwrap_or_else(Vector3::zeros)
}

/// Axis-aligned bounding box of a point set as `(min, max)`.
pub fn bounding_box<'a, I>(points: I) -> Option<(Point3<f64>, Point3<f64>)>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut iter = points.into_iter();
    let first = iter.next()?;
    let mut min = *first;
    let mut max = *first;
    for p in iter {
        min = min.inf(p);
        max = max.sup(p);
    }
    Some((min, max))
}

/// Arithmetic mean of a point set.
pub fn centroid<'a, I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(Point3::from(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_triangle_normal_ccw() {
        let n = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(n, Vector3::z());
    }

    #[test]
    fn test_triangle_normal_collinear() {
        let n = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
            &Point3::new(2.0, 2.0, 2.0),
        );
        assert!(n.is_none());
    }

    #[test]
    fn test_normalize_zero() {
        assert!(normalize(&Vector3::zeros()).is_none());
        assert_eq!(normalize_or_zero(&Vector3::zeros()), Vector3::zeros());
        assert_relative_eq!(normalize_or_zero(&Vector3::new(3.0, 0.0, 4.0)).norm(), 1.0);
    }

    #[test]
    fn test_bounding_box_and_centroid() {
        let pts = [
            Point3::new(0.0, -1.0, 2.0),
            Point3::new(4.0, 1.0, 0.0),
            Point3::new(2.0, 3.0, 1.0),
        ];
        let (min, max) = bounding_box(&pts).unwrap();
        assert_eq!(min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(max, Point3::new(4.0, 3.0, 2.0));

        let c = centroid(&pts).unwrap();
        assert_relative_eq!(c, Point3::new(2.0, 1.0, 1.0));

        let empty: [Point3<f64>; 0] = [];
        assert!(bounding_box(&empty).is_none());
        assert!(centroid(&empty).is_none());
    }
}
