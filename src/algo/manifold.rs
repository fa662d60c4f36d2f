//! Closed two-manifold check.
//!
//! A mesh passes when every edge is shared by exactly two triangles with
//! opposite orientation: each half-edge `u → v` has a twin `v → u`, and both
//! belong to distinct live triangles. Boundary edges, non-manifold fans and
//! dangling records all fail.

use tracing::debug;

use crate::mesh::{HalfEdge, HalfEdgeKey, TriMesh};

/// Tally of half-edges that violate the closed two-manifold conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManifoldReport {
    /// Half-edges inspected.
    pub halfedges: usize,
    /// Half-edges without a twin (open boundary).
    pub boundary: usize,
    /// Half-edges whose twin or triangle links are inconsistent.
    pub broken: usize,
}

impl ManifoldReport {
    /// Whether no violations were found.
    pub fn is_two_manifold(&self) -> bool {
        self.boundary == 0 && self.broken == 0
    }
}

/// Whether `mesh` is a closed, consistently oriented two-manifold.
///
/// An empty mesh is trivially two-manifold.
///
/// # Example
///
/// ```
/// use halfmesh::algo::manifold::is_two_manifold;
/// use halfmesh::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let tetra = build_from_triangles(
///     &[
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(0.0, 0.0, 1.0),
///     ],
///     &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
/// )
/// .unwrap();
/// assert!(is_two_manifold(&tetra));
/// ```
pub fn is_two_manifold(mesh: &TriMesh) -> bool {
    for (key, he) in mesh.halfedges() {
        if !halfedge_is_manifold(mesh, key, he) {
            return false;
        }
    }
    true
}

/// Inspect every half-edge and count the failures by kind.
pub fn manifold_report(mesh: &TriMesh) -> ManifoldReport {
    let mut report = ManifoldReport::default();
    for (key, he) in mesh.halfedges() {
        report.halfedges += 1;
        if he.twin.is_none() {
            report.boundary += 1;
        } else if !halfedge_is_manifold(mesh, key, he) {
            report.broken += 1;
        }
    }
    if !report.is_two_manifold() {
        debug!(
            boundary = report.boundary,
            broken = report.broken,
            "Mesh is not a closed two-manifold"
        );
    }
    report
}

fn halfedge_is_manifold(mesh: &TriMesh, key: HalfEdgeKey, he: &HalfEdge) -> bool {
    // Exactly one half-edge in each direction
    if mesh.edge(he.source, he.target) != Some(key) || mesh.edge(he.target, he.source).is_none() {
        return false;
    }
    if mesh.triangle(he.triangle).is_none() {
        return false;
    }
    let Some(twin) = he.twin.and_then(|t| mesh.halfedge(t)) else {
        return false;
    };
    mesh.triangle(twin.triangle).is_some() && twin.triangle != he.triangle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    #[test]
    fn test_closed_meshes() {
        assert!(is_two_manifold(&fixtures::cube([0.0, 0.0, 0.0])));
        assert!(is_two_manifold(&fixtures::octahedron()));
        assert!(is_two_manifold(&fixtures::uv_sphere(6, 8)));
    }

    #[test]
    fn test_empty_is_manifold() {
        assert!(is_two_manifold(&TriMesh::new()));
        assert_eq!(manifold_report(&TriMesh::new()), ManifoldReport::default());
    }

    #[test]
    fn test_single_triangle() {
        let mesh = build_from_triangles(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        )
        .unwrap();
        assert!(!is_two_manifold(&mesh));
        let report = manifold_report(&mesh);
        assert_eq!(report.boundary, 3);
        assert_eq!(report.broken, 0);
    }

    #[test]
    fn test_cube_with_hole() {
        let vertices = fixtures::cube_vertices([0.0, 0.0, 0.0]);
        let faces = &fixtures::CUBE_FACES[1..];
        let mesh = build_from_triangles(&vertices, faces).unwrap();

        assert!(!is_two_manifold(&mesh));
        let report = manifold_report(&mesh);
        assert_eq!(report.halfedges, 33);
        assert_eq!(report.boundary, 3);
        assert!(!report.is_two_manifold());
    }

    #[test]
    fn test_halfedge_checks_on_fan() {
        // Two triangles sharing the edge 0-2
        let mesh = build_from_triangles(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let shared: Vec<HalfEdgeKey> = mesh
            .halfedges()
            .filter(|(key, he)| halfedge_is_manifold(&mesh, *key, he))
            .map(|(key, _)| key)
            .collect();
        assert_eq!(shared.len(), 2);
        for key in shared {
            let he: &HalfEdge = mesh.halfedge(key).unwrap();
            assert!([he.source, he.target]
                .iter()
                .all(|v| mesh.position(*v).unwrap().x == mesh.position(*v).unwrap().y));
        }
    }

    #[test]
    fn test_open_grid() {
        let mesh = fixtures::grid(4);
        let report = manifold_report(&mesh);
        // 4 x 4 cells have 16 boundary edges
        assert_eq!(report.boundary, 16);
        assert!(!is_two_manifold(&mesh));
    }
}
