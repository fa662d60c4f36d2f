//! Quadric error metric simplification.
//!
//! Reduces the triangle count of a mesh by repeated edge collapses. Each
//! vertex carries a quadric, the summed squared distance to the planes of its
//! original triangles, and each collapse moves the surviving vertex to the
//! point that minimizes the merged quadric.
//!
//! Instead of a priority queue, every pass collapses every edge whose error is
//! below a threshold that grows with the pass number:
//!
//! ```text
//! threshold = 1e-9 * (iteration + 3) ^ aggressiveness
//! ```
//!
//! Higher aggressiveness runs faster at the cost of quality. Vertices on an
//! open boundary are never moved, and collapses that would flip or squash a
//! neighboring triangle are refused.
//!
//! # Example
//!
//! ```no_run
//! use halfmesh::algo::simplify::{simplify, SimplifyOptions};
//!
//! let mesh = halfmesh::io::load("input.ply").unwrap();
//!
//! // Keep half of the triangles
//! let options = SimplifyOptions::with_target_ratio(0.5);
//! let simplified = simplify(&mesh, &options).unwrap();
//!
//! halfmesh::io::save(&simplified, "output.ply").unwrap();
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using Quadric
//!   Error Metrics." SIGGRAPH '97.

mod collapse;
mod quadric;

use tracing::info;

use super::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, to_face_vertex, TriMesh};
use collapse::WorkingSet;

/// Options for mesh simplification.
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Target number of triangles. If `None`, `target_ratio` is used.
    pub target_triangles: Option<usize>,

    /// Fraction of triangles to keep, in `[0, 1]`.
    /// Only used if `target_triangles` is `None`.
    pub target_ratio: f64,

    /// Exponent of the collapse threshold schedule. Typical values are 4 to 20.
    pub aggressiveness: f64,

    /// Maximum number of passes. Reaching it is not an error.
    pub max_iterations: usize,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            target_triangles: None,
            target_ratio: 0.5,
            aggressiveness: 7.0,
            max_iterations: 1000,
        }
    }
}

impl SimplifyOptions {
    /// Reduce to at most `target` triangles.
    pub fn with_target_triangles(target: usize) -> Self {
        Self {
            target_triangles: Some(target),
            ..Self::default()
        }
    }

    /// Reduce to a fraction of the original triangle count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_ratio: ratio,
            ..Self::default()
        }
    }

    /// Set the threshold exponent.
    pub fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    /// Set the pass limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Target triangle count for a mesh with `original` triangles.
    ///
    /// A ratio target truncates toward zero.
    pub fn compute_target(&self, original: usize) -> usize {
        match self.target_triangles {
            Some(target) => target.min(original),
            None => ((original as f64) * self.target_ratio) as usize,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.target_triangles.is_none()
            && !(self.target_ratio.is_finite() && (0.0..=1.0).contains(&self.target_ratio))
        {
            return Err(MeshError::invalid_param(
                "target_ratio",
                self.target_ratio,
                "must be between 0 and 1",
            ));
        }
        if !(self.aggressiveness.is_finite() && self.aggressiveness > 0.0) {
            return Err(MeshError::invalid_param(
                "aggressiveness",
                self.aggressiveness,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Simplify `mesh` into a new mesh with about the requested number of triangles.
///
/// The result may keep more triangles than requested if the pass limit is
/// reached or no further collapse passes the flip checks. When the target is
/// not below the current count, a copy of `mesh` is returned.
///
/// # Errors
///
/// [`MeshError::InvalidParameter`] for a ratio outside `[0, 1]` or a
/// non-positive aggressiveness.
pub fn simplify(mesh: &TriMesh, options: &SimplifyOptions) -> Result<TriMesh> {
    simplify_with_progress(mesh, options, &Progress::none())
}

/// Simplify with progress reporting, one report per pass.
pub fn simplify_with_progress(
    mesh: &TriMesh,
    options: &SimplifyOptions,
    progress: &Progress,
) -> Result<TriMesh> {
    options.validate()?;

    let original = mesh.num_triangles();
    let target = options.compute_target(original);
    if target >= original {
        return Ok(mesh.clone());
    }

    info!(
        triangles = original,
        target,
        aggressiveness = options.aggressiveness,
        "Simplifying mesh"
    );

    let (vertices, faces) = to_face_vertex(mesh);
    let mut work = WorkingSet::new(vertices, faces);
    let iterations = work.run(target, options, progress);
    let (vertices, faces) = work.into_face_vertex();
    let simplified = build_from_triangles(&vertices, &faces)?;

    info!(
        iterations,
        vertices = simplified.num_vertices(),
        triangles = simplified.num_triangles(),
        "Simplification finished"
    );

    Ok(simplified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::manifold::is_two_manifold;
    use crate::fixtures;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn boundary_vertex_count(mesh: &TriMesh) -> usize {
        let mut boundary: Vec<_> = mesh
            .halfedges()
            .filter(|(_, he)| he.twin.is_none())
            .map(|(_, he)| he.source)
            .collect();
        boundary.sort();
        boundary.dedup();
        boundary.len()
    }

    #[test]
    fn test_compute_target() {
        assert_eq!(SimplifyOptions::with_target_triangles(10).compute_target(100), 10);
        assert_eq!(SimplifyOptions::with_target_triangles(500).compute_target(100), 100);
        assert_eq!(SimplifyOptions::with_target_ratio(0.5).compute_target(101), 50);
        assert_eq!(SimplifyOptions::with_target_ratio(0.0).compute_target(12), 0);
    }

    #[test]
    fn test_invalid_options() {
        let mesh = fixtures::octahedron();
        let bad_ratio = SimplifyOptions::with_target_ratio(1.5);
        assert!(matches!(
            simplify(&mesh, &bad_ratio),
            Err(MeshError::InvalidParameter { name: "target_ratio", .. })
        ));
        let bad_aggr = SimplifyOptions::with_target_triangles(4).with_aggressiveness(f64::NAN);
        assert!(simplify(&mesh, &bad_aggr).is_err());
    }

    #[test]
    fn test_target_at_count_returns_copy() {
        let mesh = fixtures::uv_sphere(8, 12);
        let options = SimplifyOptions::with_target_triangles(mesh.num_triangles());
        let result = simplify(&mesh, &options).unwrap();
        assert_eq!(result.num_triangles(), mesh.num_triangles());
        assert_eq!(to_face_vertex(&result), to_face_vertex(&mesh));
    }

    #[test]
    fn test_sphere_reduces() {
        let mesh = fixtures::uv_sphere(16, 24);
        let original = mesh.num_triangles();
        let options = SimplifyOptions::with_target_ratio(0.5);
        let result = simplify(&mesh, &options).unwrap();

        assert!(result.num_triangles() < original);
        assert!(result.num_triangles() > 0);
        assert!(result.is_valid());

        // Every collapse stays near the unit sphere
        for (_, v) in result.vertices() {
            assert!((v.position.coords.norm() - 1.0).abs() < 0.25);
        }
    }

    #[test]
    fn test_target_zero_does_not_panic() {
        let mesh = fixtures::uv_sphere(8, 12);
        let options = SimplifyOptions::with_target_triangles(0).with_max_iterations(50);
        let result = simplify(&mesh, &options).unwrap();

        assert!(result.num_triangles() <= mesh.num_triangles());
        assert!(result.is_valid());
        let (vertices, faces) = to_face_vertex(&result);
        assert!(faces.iter().flatten().all(|&i| i < vertices.len()));
    }

    #[test]
    fn test_boundary_preserved_on_open_grid() {
        let mesh = fixtures::grid(6);
        let before = boundary_vertex_count(&mesh);
        let options = SimplifyOptions::with_target_ratio(0.2);
        let result = simplify(&mesh, &options).unwrap();

        assert!(result.is_valid());
        assert!(boundary_vertex_count(&result) >= before);
        // Boundary corners keep their positions
        let (min, max) = result.bounding_box().unwrap();
        assert_eq!(min, nalgebra::Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, nalgebra::Point3::new(6.0, 6.0, 0.0));
    }

    #[test]
    fn test_octahedron() {
        let mesh = fixtures::octahedron();
        let options = SimplifyOptions::with_target_triangles(6);
        let result = simplify(&mesh, &options).unwrap();
        assert!(result.num_triangles() <= mesh.num_triangles());
        assert!(result.is_valid());
    }

    #[test]
    fn test_flat_patch_keeps_orientation() {
        let mesh = fixtures::grid(8);
        let options = SimplifyOptions::with_target_ratio(0.3);
        let result = simplify(&mesh, &options).unwrap();
        assert!(result.num_triangles() < mesh.num_triangles());
        // Flip checks keep every normal pointing up
        for (_, tri) in result.triangles() {
            assert!(tri.normal.z > 0.0);
        }
        assert!(!is_two_manifold(&result));
    }

    #[test]
    fn test_progress_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let mesh = fixtures::uv_sphere(8, 12);
        let options = SimplifyOptions::with_target_ratio(0.5);
        simplify_with_progress(&mesh, &options, &progress).unwrap();
        assert!(calls.load(Ordering::Relaxed) > 0);
    }
}
