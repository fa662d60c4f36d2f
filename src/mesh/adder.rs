//! Triangle insertion.
//!
//! [`TriangleAdder`] is the only way triangles enter a [`TriMesh`]. Each call
//! to [`TriangleAdder::add`] creates one triangle and its three half-edges,
//! wires `next`/`prev` around the triangle, and links twins with any
//! already-present reverse edges. Insertion order does not matter: the edge
//! inserted second finds its partner through the edge index.
//!
//! Vertices must be supplied counter-clockwise as seen from outside. The adder
//! never reorders them, so a face supplied with inconsistent winding produces
//! a consistent-looking but wrongly oriented triangle, and usually causes its
//! neighbor to be rejected later.

use super::keys::{HalfEdgeKey, TriangleKey, VertexKey};
use super::trimesh::{HalfEdge, TriMesh, Triangle};
use crate::error::{MeshError, Result};
use crate::geom;

/// Adds triangles to a mesh while keeping the half-edge graph consistent.
///
/// # Example
///
/// ```
/// use halfmesh::mesh::TriMesh;
/// use nalgebra::Point3;
///
/// let mut mesh = TriMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
///
/// let mut adder = mesh.adder();
/// assert!(adder.add(a, b, c).unwrap().is_some());
/// // a → b is taken, so this triangle is rejected
/// assert!(adder.add(a, b, d).unwrap().is_none());
/// // b → d → c → b reuses b → c in the opposite direction: accepted
/// assert!(adder.add(b, d, c).unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct TriangleAdder<'a> {
    mesh: &'a mut TriMesh,
}

impl<'a> TriangleAdder<'a> {
    pub(crate) fn new(mesh: &'a mut TriMesh) -> Self {
        Self { mesh }
    }

    /// Add the triangle `(v0, v1, v2)`.
    ///
    /// Returns `Ok(None)` without touching the mesh if any of the directed
    /// edges `v0 → v1`, `v1 → v2`, `v2 → v0` already exists.
    ///
    /// # Errors
    ///
    /// - [`MeshError::StaleHandle`] if a vertex key does not address a live vertex.
    /// - [`MeshError::DegenerateTriangle`] if `(v1 - v0) × (v2 - v0)` is zero.
    pub fn add(
        &mut self,
        v0: VertexKey,
        v1: VertexKey,
        v2: VertexKey,
    ) -> Result<Option<TriangleKey>> {
        let mesh = &mut *self.mesh;
        let p0 = mesh.try_position(v0)?;
        let p1 = mesh.try_position(v1)?;
        let p2 = mesh.try_position(v2)?;

        let corners = [v0, v1, v2];
        if (0..3).any(|i| mesh.edge(corners[i], corners[(i + 1) % 3]).is_some()) {
            return Ok(None);
        }

        let normal = geom::triangle_normal(&p0, &p1, &p2).ok_or(MeshError::DegenerateTriangle)?;

        let triangle = mesh.triangles.allocate(Triangle {
            vertices: corners,
            normal,
            halfedge: HalfEdgeKey::default(),
        });

        let mut keys = [HalfEdgeKey::default(); 3];
        for (i, key) in keys.iter_mut().enumerate() {
            *key = mesh.halfedges.allocate(HalfEdge {
                source: corners[i],
                target: corners[(i + 1) % 3],
                next: HalfEdgeKey::default(),
                prev: HalfEdgeKey::default(),
                twin: None,
                triangle,
            });
        }

        for i in 0..3 {
            let (source, target) = (corners[i], corners[(i + 1) % 3]);
            let twin = mesh.edges.get(target, source);

            let he = mesh.halfedges.record_mut(keys[i])?;
            he.next = keys[(i + 1) % 3];
            he.prev = keys[(i + 2) % 3];
            he.twin = twin;
            mesh.edges.insert(source, target, keys[i]);

            if let Some(twin) = twin {
                mesh.halfedges.record_mut(twin)?.twin = Some(keys[i]);
            }
        }

        mesh.triangles.record_mut(triangle)?.halfedge = keys[0];
        Ok(Some(triangle))
    }

    /// Whether `v0`, `v1` and `v2` are pairwise joined by edges, in any direction.
    pub fn exists(&self, v0: VertexKey, v1: VertexKey, v2: VertexKey) -> bool {
        let connected = |a, b| self.mesh.edges_between(a, b) > 0;
        connected(v0, v1) && connected(v1, v2) && connected(v2, v0)
    }
}
