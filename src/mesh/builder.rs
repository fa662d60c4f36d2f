//! Conversion between [`TriMesh`] and indexed face-vertex lists.
//!
//! Mesh files and most external libraries exchange triangle meshes as a vertex
//! array plus an array of index triples. [`build_from_triangles`] feeds such
//! lists through the [`TriangleAdder`](super::TriangleAdder), and
//! [`to_face_vertex`] flattens a mesh back out.

use nalgebra::Point3;
use tracing::debug;

use super::keys::VertexKey;
use super::trimesh::TriMesh;
use crate::error::{MeshError, Result};

/// Build a mesh from vertices and triangle faces.
///
/// All vertices are added first, then every face in order. Faces the adder
/// refuses (a directed edge already in use, or collinear corners) are skipped
/// rather than aborting the build; the number skipped is logged at `debug`.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Errors
/// [`MeshError::InvalidVertexIndex`] if a face references a vertex outside
/// `vertices`. No mesh is returned in that case.
///
/// # Example
/// ```
/// use halfmesh::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2], [0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_triangles(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<TriMesh> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    let mut mesh = TriMesh::with_capacity(vertices.len(), faces.len());
    let keys: Vec<VertexKey> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    let mut rejected = 0usize;
    let mut degenerate = 0usize;
    let mut adder = mesh.adder();
    for face in faces {
        match adder.add(keys[face[0]], keys[face[1]], keys[face[2]]) {
            Ok(Some(_)) => {}
            Ok(None) => rejected += 1,
            Err(MeshError::DegenerateTriangle) => degenerate += 1,
            Err(e) => return Err(e),
        }
    }

    if rejected + degenerate > 0 {
        debug!(
            faces = faces.len(),
            rejected,
            degenerate,
            "Skipped faces while building mesh"
        );
    }

    Ok(mesh)
}

/// Flatten a mesh into a vertex list and triangle index list.
///
/// Vertices appear in iteration order, and indices refer to positions in the
/// returned vertex list.
pub fn to_face_vertex(mesh: &TriMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let ordinals = mesh.vertex_ordinals();
    let vertices: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| v.position).collect();

    let faces: Vec<[usize; 3]> = mesh
        .triangles()
        .map(|(_, tri)| tri.vertices.map(|v| ordinals[v]))
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        // Shared edge has twins, the rest are open
        let open = mesh.halfedges().filter(|(_, he)| he.twin.is_none()).count();
        assert_eq!(open, 4);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        let (out_vertices, out_faces) = to_face_vertex(&mesh);

        assert_eq!(out_vertices, vertices);
        assert_eq!(out_faces, faces);
    }

    #[test]
    fn test_invalid_index() {
        let (vertices, _) = two_triangles();
        let result = build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 9]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 1, vertex: 9 })
        ));
    }

    #[test]
    fn test_skips_bad_faces() {
        let mut vertices = two_triangles().0;
        vertices.push(Point3::new(2.0, 0.0, 0.0)); // collinear with 0 and 1
        let faces = vec![
            [0, 1, 2],
            [0, 1, 3], // 0 → 1 already used
            [4, 1, 0], // collinear
            [1, 0, 3],
        ];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.num_vertices(), 5);

        let (_, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_faces, vec![[0, 1, 2], [1, 0, 3]]);
    }

    #[test]
    fn test_empty_input() {
        let mesh = build_from_triangles(&[], &[]).unwrap();
        assert!(mesh.is_empty());
    }
}
