//! Duplicate vertex removal.
//!
//! Marching cubes emits three private vertices per triangle, so neighboring
//! triangles are not connected. [`weld_vertices`] merges vertices whose
//! coordinates agree after rounding to a fixed number of decimals, then
//! rebuilds the triangles on the shared vertices.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::MeshError;
use crate::mesh::{TriMesh, VertexKey};

/// Merge vertices that coincide after rounding to `precision` decimals.
///
/// Each output vertex takes the rounded position. Vertices are created in the
/// order their triangles first reference them, so vertices used by no
/// triangle are dropped. Triangles are re-added in their original order;
/// those that collapse (two corners merged) or reuse an already taken
/// directed edge are skipped.
///
/// # Example
///
/// ```
/// use halfmesh::algo::weld::weld_vertices;
/// use halfmesh::mesh::TriMesh;
/// use nalgebra::Point3;
///
/// let mut mesh = TriMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// let b2 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c2 = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
/// mesh.add_triangle(a, b, c).unwrap();
/// mesh.add_triangle(b2, d, c2).unwrap();
///
/// let welded = weld_vertices(&mesh, 6);
/// assert_eq!(welded.num_vertices(), 4);
/// assert_eq!(welded.num_triangles(), 2);
/// ```
pub fn weld_vertices(mesh: &TriMesh, precision: i32) -> TriMesh {
    let factor = 10f64.powi(precision);
    let quantize = |p: &Point3<f64>| {
        [
            (p.x * factor).round() as i64,
            (p.y * factor).round() as i64,
            (p.z * factor).round() as i64,
        ]
    };

    let mut out = TriMesh::with_capacity(mesh.num_vertices() / 2, mesh.num_triangles());
    let mut merged: FxHashMap<[i64; 3], VertexKey> = FxHashMap::default();
    let mut triangles = Vec::with_capacity(mesh.num_triangles());

    for (t, _) in mesh.triangles() {
        let Some(corners) = mesh.triangle_positions(t) else {
            continue;
        };
        let keys = corners.map(|p| {
            let q = quantize(&p);
            *merged.entry(q).or_insert_with(|| {
                out.add_vertex(Point3::new(
                    q[0] as f64 / factor,
                    q[1] as f64 / factor,
                    q[2] as f64 / factor,
                ))
            })
        });
        triangles.push(keys);
    }

    let mut skipped = 0usize;
    let mut adder = out.adder();
    for [v0, v1, v2] in triangles {
        match adder.add(v0, v1, v2) {
            Ok(Some(_)) => {}
            Ok(None) | Err(MeshError::DegenerateTriangle) => skipped += 1,
            Err(e) => {
                debug!(error = %e, "Unexpected error while welding");
                skipped += 1;
            }
        }
    }

    debug!(
        vertices_in = mesh.num_vertices(),
        vertices_out = out.num_vertices(),
        skipped,
        "Welded duplicate vertices"
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_weld_is_identity_on_clean_mesh() {
        let mesh = fixtures::cube([0.0, 0.0, 0.0]);
        let welded = weld_vertices(&mesh, 6);
        assert_eq!(welded.num_vertices(), 8);
        assert_eq!(welded.num_triangles(), 12);
        assert!(welded.is_valid());
    }

    #[test]
    fn test_weld_merges_nearby_points() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let b2 = mesh.add_vertex(Point3::new(1.0 + 1e-9, 0.0, 0.0));
        let c2 = mesh.add_vertex(Point3::new(0.0, 1.0 - 1e-9, 0.0));
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();
        mesh.add_triangle(b2, d, c2).unwrap();

        let welded = weld_vertices(&mesh, 4);
        assert_eq!(welded.num_vertices(), 4);
        assert_eq!(welded.num_triangles(), 2);
        let shared = welded.halfedges().filter(|(_, he)| he.twin.is_some()).count();
        assert_eq!(shared, 2);

        // A precision finer than the gap keeps the copies apart
        let fine = weld_vertices(&mesh, 12);
        assert_eq!(fine.num_vertices(), 6);
    }

    #[test]
    fn test_weld_drops_collapsed_triangles() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(0.001, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();

        let welded = weld_vertices(&mesh, 1);
        assert_eq!(welded.num_triangles(), 0);
        assert_eq!(welded.num_vertices(), 2);
    }

    #[test]
    fn test_weld_rounds_positions() {
        let mut mesh = TriMesh::new();
        let a = mesh.add_vertex(Point3::new(0.123, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let _unused = mesh.add_vertex(Point3::new(9.0, 9.0, 9.0));
        mesh.add_triangle(a, b, c).unwrap();

        let welded = weld_vertices(&mesh, 1);
        assert_eq!(welded.num_vertices(), 3);
        let first = welded.vertices().next().unwrap().1.position;
        assert!((first.x - 0.1).abs() < 1e-12);
    }
}
