//! Connected components.
//!
//! Two vertices are connected when a half-edge joins them. Components are
//! discovered by breadth-first search from every not-yet-visited vertex, in
//! vertex iteration order; a vertex without edges forms a component of its own.
//!
//! # Example
//!
//! ```
//! use halfmesh::algo::components::{connected_component_count, connected_components};
//! use halfmesh::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(5.0, 0.0, 0.0),
//!     Point3::new(6.0, 0.0, 0.0),
//!     Point3::new(5.0, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&vertices, &[[0, 1, 2], [3, 4, 5]]).unwrap();
//!
//! assert_eq!(connected_component_count(&mesh), 2);
//! for part in connected_components(&mesh) {
//!     assert_eq!(part.num_triangles(), 1);
//! }
//! ```

use std::collections::VecDeque;

use rayon::prelude::*;
use slotmap::SecondaryMap;
use tracing::{debug, info};

use crate::mesh::{TriMesh, TriangleKey, VertexKey};

/// Number of connected components of the vertex graph.
pub fn connected_component_count(mesh: &TriMesh) -> usize {
    let mut visited: SecondaryMap<VertexKey, ()> = SecondaryMap::with_capacity(mesh.num_vertices());
    let mut queue = VecDeque::new();
    let mut count = 0;

    for start in mesh.vertex_keys() {
        if visited.contains_key(start) {
            continue;
        }
        count += 1;
        queue.push_back(start);
        while let Some(v) = queue.pop_front() {
            if visited.insert(v, ()).is_some() {
                continue;
            }
            queue.extend(mesh.vertex_neighbors(v).filter(|&o| !visited.contains_key(o)));
        }
    }

    count
}

/// Iterate over the connected components of `mesh` as independent meshes.
///
/// Components are produced lazily, one breadth-first search per call to
/// `next`. See [`ConnectedComponents`].
pub fn connected_components(mesh: &TriMesh) -> ConnectedComponents<'_> {
    ConnectedComponents::new(mesh)
}

/// Split `mesh` into its connected components.
///
/// The traversal runs sequentially; the component meshes are then built in
/// parallel. The result is in the same order as [`connected_components`].
pub fn split_components(mesh: &TriMesh) -> Vec<TriMesh> {
    let parts: Vec<Component> = ConnectedComponents::new(mesh).by_ref_parts().collect();
    info!(
        vertices = mesh.num_vertices(),
        components = parts.len(),
        "Splitting mesh into components"
    );
    parts.par_iter().map(|part| part.build(mesh)).collect()
}

/// Vertices and triangles of one component, as keys into the source mesh.
#[derive(Debug, Default)]
struct Component {
    vertices: Vec<VertexKey>,
    triangles: Vec<TriangleKey>,
}

impl Component {
    /// Copy the component into a new, re-indexed mesh.
    ///
    /// Vertices and triangles keep their relative order from the source mesh.
    fn build(&self, source: &TriMesh) -> TriMesh {
        let mut out = TriMesh::with_capacity(self.vertices.len(), self.triangles.len());
        let mut remap: SecondaryMap<VertexKey, VertexKey> =
            SecondaryMap::with_capacity(self.vertices.len());
        for &v in &self.vertices {
            if let Some(p) = source.position(v) {
                remap.insert(v, out.add_vertex(*p));
            }
        }

        let mut adder = out.adder();
        let mut failed = 0usize;
        for &t in &self.triangles {
            let Some(tri) = source.triangle(t) else {
                continue;
            };
            let [a, b, c] = tri.vertices;
            let added = match (remap.get(a), remap.get(b), remap.get(c)) {
                (Some(&a), Some(&b), Some(&c)) => adder.add(a, b, c),
                _ => Ok(None),
            };
            if !matches!(added, Ok(Some(_))) {
                failed += 1;
            }
        }
        if failed > 0 {
            debug!(failed, "Triangles not copied into component");
        }

        out
    }
}

/// Streaming iterator over connected components, yielding one [`TriMesh`] each.
///
/// Each yielded mesh holds the component's vertices and every triangle
/// incident to them, re-indexed from zero. The source mesh is only borrowed.
#[derive(Debug)]
pub struct ConnectedComponents<'a> {
    mesh: &'a TriMesh,
    starts: Vec<VertexKey>,
    cursor: usize,
    visited: SecondaryMap<VertexKey, ()>,
    taken: SecondaryMap<TriangleKey, ()>,
    queue: VecDeque<VertexKey>,
}

impl<'a> ConnectedComponents<'a> {
    fn new(mesh: &'a TriMesh) -> Self {
        Self {
            mesh,
            starts: mesh.vertex_keys().collect(),
            cursor: 0,
            visited: SecondaryMap::with_capacity(mesh.num_vertices()),
            taken: SecondaryMap::with_capacity(mesh.num_triangles()),
            queue: VecDeque::new(),
        }
    }

    /// Breadth-first search from the next unvisited vertex.
    fn next_part(&mut self) -> Option<Component> {
        while self.cursor < self.starts.len() {
            let start = self.starts[self.cursor];
            self.cursor += 1;
            if self.visited.contains_key(start) {
                continue;
            }

            let mut part = Component::default();
            self.queue.clear();
            self.queue.push_back(start);
            while let Some(v) = self.queue.pop_front() {
                if self.visited.insert(v, ()).is_some() {
                    continue;
                }
                part.vertices.push(v);
                for &he in self.mesh.incident_halfedges(v) {
                    let Some(edge) = self.mesh.halfedge(he) else {
                        continue;
                    };
                    if self.taken.insert(edge.triangle, ()).is_none() {
                        part.triangles.push(edge.triangle);
                    }
                    let other = if edge.source == v { edge.target } else { edge.source };
                    if !self.visited.contains_key(other) {
                        self.queue.push_back(other);
                    }
                }
            }

            // Restore source order
            part.vertices.sort_unstable();
            part.triangles.sort_unstable();
            return Some(part);
        }
        None
    }

    fn by_ref_parts(mut self) -> impl Iterator<Item = Component> + 'a {
        std::iter::from_fn(move || self.next_part())
    }
}

impl Iterator for ConnectedComponents<'_> {
    type Item = TriMesh;

    fn next(&mut self) -> Option<TriMesh> {
        let mesh = self.mesh;
        self.next_part().map(|part| part.build(mesh))
    }
}
