//! Arena-backed half-edge triangle mesh.
//!
//! A [`TriMesh`] owns three [`Arena`]s (vertices, half-edges, triangles) and an
//! edge index mapping each ordered `(source, target)` vertex pair to its
//! half-edge. All links between records are generational keys, never
//! references, so the mesh is plain data and `Send + Sync`.
//!
//! # Structure
//!
//! - A **vertex** stores only its position. Incident half-edges (outgoing and
//!   incoming) are found through the edge index.
//! - A **half-edge** is identified by its ordered `(source, target)` pair and
//!   stores `next`/`prev` around its triangle, an optional `twin`, and the
//!   owning triangle.
//! - A **triangle** stores its three vertices in the supplied winding, its unit
//!   normal, and one of its half-edges.
//!
//! For any two vertices `u != v` there is at most one half-edge `u → v` and at
//! most one `v → u`. Triangles are only created by the
//! [`TriangleAdder`](super::TriangleAdder), which enforces this. The mesh
//! grows monotonically: algorithms that remove elements build a new mesh.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;
use smallvec::SmallVec;

use super::arena::Arena;
use super::keys::{HalfEdgeKey, TriangleKey, VertexKey};
use super::TriangleAdder;
use crate::error::Result;
use crate::geom;

/// A vertex of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,
}

/// A directed edge of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// The vertex this half-edge starts at.
    pub source: VertexKey,
    /// The vertex this half-edge points to.
    pub target: VertexKey,
    /// The next half-edge around the owning triangle (counter-clockwise).
    pub next: HalfEdgeKey,
    /// The previous half-edge around the owning triangle.
    pub prev: HalfEdgeKey,
    /// The opposite half-edge `target → source`, once the adjacent triangle exists.
    pub twin: Option<HalfEdgeKey>,
    /// The triangle this half-edge belongs to.
    pub triangle: TriangleKey,
}

/// A triangle of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// The three vertices, in the winding supplied at construction.
    pub vertices: [VertexKey; 3],
    /// Unit normal, `normalize((v1 - v0) × (v2 - v0))`.
    pub normal: Vector3<f64>,
    /// The half-edge `v0 → v1`.
    pub halfedge: HalfEdgeKey,
}

type IncidentEdges = SmallVec<[HalfEdgeKey; 8]>;

/// Lookup structure from vertex pairs to half-edges.
#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeIndex {
    by_pair: FxHashMap<(VertexKey, VertexKey), HalfEdgeKey>,
    incident: SecondaryMap<VertexKey, IncidentEdges>,
}

impl EdgeIndex {
    fn with_capacity(num_halfedges: usize) -> Self {
        let mut by_pair = FxHashMap::default();
        by_pair.reserve(num_halfedges);
        Self {
            by_pair,
            incident: SecondaryMap::new(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, source: VertexKey, target: VertexKey) -> Option<HalfEdgeKey> {
        self.by_pair.get(&(source, target)).copied()
    }

    pub(crate) fn insert(&mut self, source: VertexKey, target: VertexKey, he: HalfEdgeKey) {
        self.by_pair.insert((source, target), he);
        for v in [source, target] {
            if let Some(entry) = self.incident.entry(v) {
                entry.or_default().push(he);
            }
        }
    }

    fn incident(&self, v: VertexKey) -> &[HalfEdgeKey] {
        self.incident.get(v).map_or(&[], |edges| edges.as_slice())
    }
}

/// A triangle mesh stored as a half-edge graph over generational arenas.
#[derive(Debug, Clone)]
pub struct TriMesh {
    pub(crate) vertices: Arena<VertexKey, Vertex>,
    pub(crate) halfedges: Arena<HalfEdgeKey, HalfEdge>,
    pub(crate) triangles: Arena<TriangleKey, Triangle>,
    pub(crate) edges: EdgeIndex,
}

impl Default for TriMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TriMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_triangles: usize) -> Self {
        Self {
            vertices: Arena::with_capacity("vertex", num_vertices),
            halfedges: Arena::with_capacity("half-edge", num_triangles * 3),
            triangles: Arena::with_capacity("triangle", num_triangles),
            edges: EdgeIndex::with_capacity(num_triangles * 3),
        }
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges (three per triangle).
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get a vertex.
    #[inline]
    pub fn vertex(&self, v: VertexKey) -> Option<&Vertex> {
        self.vertices.get(v)
    }

    /// Get a half-edge.
    #[inline]
    pub fn halfedge(&self, he: HalfEdgeKey) -> Option<&HalfEdge> {
        self.halfedges.get(he)
    }

    /// Get a triangle.
    #[inline]
    pub fn triangle(&self, t: TriangleKey) -> Option<&Triangle> {
        self.triangles.get(t)
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexKey) -> Option<&Point3<f64>> {
        self.vertices.get(v).map(|vertex| &vertex.position)
    }

    /// Position of a vertex, failing with
    /// [`MeshError::StaleHandle`](crate::error::MeshError::StaleHandle) when
    /// the key's slot is not live in this mesh.
    #[inline]
    pub fn try_position(&self, v: VertexKey) -> Result<Point3<f64>> {
        self.vertices.record(v).map(|vertex| vertex.position)
    }

    /// The three corner positions of a triangle.
    pub fn triangle_positions(&self, t: TriangleKey) -> Option<[Point3<f64>; 3]> {
        let [v0, v1, v2] = self.triangles.get(t)?.vertices;
        Some([*self.position(v0)?, *self.position(v1)?, *self.position(v2)?])
    }

    /// The half-edge `source → target`, if it exists.
    #[inline]
    pub fn edge(&self, source: VertexKey, target: VertexKey) -> Option<HalfEdgeKey> {
        self.edges.get(source, target)
    }

    /// Number of half-edges joining `a` and `b` in either direction (0, 1 or 2).
    pub fn edges_between(&self, a: VertexKey, b: VertexKey) -> usize {
        usize::from(self.edge(a, b).is_some()) + usize::from(self.edge(b, a).is_some())
    }

    /// All half-edges that start or end at `v`.
    #[inline]
    pub fn incident_halfedges(&self, v: VertexKey) -> &[HalfEdgeKey] {
        self.edges.incident(v)
    }

    // ==================== Iteration ====================

    /// Iterate over vertex keys.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    /// Iterate over vertices with their keys.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterate over half-edge keys.
    pub fn halfedge_keys(&self) -> impl Iterator<Item = HalfEdgeKey> + '_ {
        self.halfedges.keys()
    }

    /// Iterate over half-edges with their keys.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeKey, &HalfEdge)> + '_ {
        self.halfedges.iter()
    }

    /// Iterate over triangle keys.
    pub fn triangle_keys(&self) -> impl Iterator<Item = TriangleKey> + '_ {
        self.triangles.keys()
    }

    /// Iterate over triangles with their keys.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleKey, &Triangle)> + '_ {
        self.triangles.iter()
    }

    /// Iterate over the vertices adjacent to `v`.
    ///
    /// A neighbor joined by edges in both directions is reported twice.
    pub fn vertex_neighbors(&self, v: VertexKey) -> impl Iterator<Item = VertexKey> + '_ {
        self.incident_halfedges(v).iter().filter_map(move |&he| {
            let edge = self.halfedges.get(he)?;
            Some(if edge.source == v { edge.target } else { edge.source })
        })
    }

    /// Dense 0-based index of every vertex, in iteration order.
    pub fn vertex_ordinals(&self) -> SecondaryMap<VertexKey, usize> {
        self.vertices.ordinals()
    }

    // ==================== Construction ====================

    /// Add a vertex and return its key.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexKey {
        self.vertices.allocate(Vertex { position })
    }

    /// Triangle builder bound to this mesh.
    pub fn adder(&mut self) -> TriangleAdder<'_> {
        TriangleAdder::new(self)
    }

    /// Add a triangle. Shorthand for `self.adder().add(v0, v1, v2)`.
    pub fn add_triangle(
        &mut self,
        v0: VertexKey,
        v1: VertexKey,
        v2: VertexKey,
    ) -> Result<Option<TriangleKey>> {
        self.adder().add(v0, v1, v2)
    }

    // ==================== Geometry ====================

    /// Axis-aligned bounding box as `(min, max)`, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        geom::bounding_box(self.vertices.values().map(|v| &v.position))
    }

    /// Mean of all vertex positions, or `None` for an empty mesh.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        geom::centroid(self.vertices.values().map(|v| &v.position))
    }

    /// Scale all vertex positions per axis about the origin.
    ///
    /// Face normals are recomputed, since a non-uniform scale changes them. A
    /// negative product of the factors mirrors the mesh, which flips normals.
    pub fn scale(&mut self, factors: [f64; 3]) {
        let s = Vector3::from(factors);
        for (_, vertex) in self.vertices.iter_mut() {
            vertex.position = Point3::from(vertex.position.coords.component_mul(&s));
        }
        let keys: Vec<TriangleKey> = self.triangles.keys().collect();
        for t in keys {
            if let Some([p0, p1, p2]) = self.triangle_positions(t) {
                let normal = geom::triangle_normal(&p0, &p1, &p2).unwrap_or_else(Vector3::zeros);
                if let Some(tri) = self.triangles.get_mut(t) {
                    tri.normal = normal;
                }
            }
        }
    }

    // ==================== Validation ====================

    /// Check internal consistency of the half-edge links.
    ///
    /// Verifies that every half-edge is indexed under its vertex pair, that
    /// `next`/`prev` form the triangle's 3-cycle, and that twins are mutual,
    /// reversed, and belong to a different triangle.
    pub fn is_valid(&self) -> bool {
        for (key, he) in self.halfedges.iter() {
            if self.edge(he.source, he.target) != Some(key) {
                return false;
            }
            let (Some(next), Some(prev)) = (self.halfedge(he.next), self.halfedge(he.prev)) else {
                return false;
            };
            if next.prev != key || prev.next != key || next.source != he.target {
                return false;
            }
            if next.triangle != he.triangle || prev.triangle != he.triangle {
                return false;
            }
            let Some(tri) = self.triangle(he.triangle) else {
                return false;
            };
            if !tri.vertices.contains(&he.source) || !tri.vertices.contains(&he.target) {
                return false;
            }
            match he.twin {
                Some(twin_key) => {
                    let Some(twin) = self.halfedge(twin_key) else {
                        return false;
                    };
                    if twin.twin != Some(key)
                        || twin.source != he.target
                        || twin.target != he.source
                        || twin.triangle == he.triangle
                    {
                        return false;
                    }
                }
                None => {
                    if self.edge(he.target, he.source).is_some() {
                        return false;
                    }
                }
            }
        }
        true
    }
}
