//! # halfmesh
//!
//! Triangle surface meshes stored as a half-edge graph, with the algorithms
//! that produce, reduce and inspect them.
//!
//! ## Features
//!
//! - **Half-edge mesh**: generational arenas, so stale handles are detected
//!   instead of silently aliasing a reused slot
//! - **Marching cubes**: surfaces from boolean masks and scalar fields
//! - **Quadric simplification**: threshold-scheduled edge collapse
//! - **Topology**: connected components and the closed two-manifold check
//! - **PLY I/O**: binary and ASCII
//!
//! ## Quick Start
//!
//! ```
//! use halfmesh::prelude::*;
//! use halfmesh::algo::marching_cubes::{marching_cubes_bool, BoolGrid};
//! use halfmesh::algo::weld::weld_vertices;
//!
//! // A 3 x 3 x 3 block of voxels
//! let grid = BoolGrid::new([3, 3, 3], true);
//! let raw = marching_cubes_bool(&grid).unwrap();
//! let surface = weld_vertices(&raw, 6);
//!
//! assert!(is_two_manifold(&surface));
//! assert_eq!(connected_component_count(&surface), 1);
//!
//! let options = SimplifyOptions::with_target_ratio(0.5);
//! let coarse = simplify(&surface, &options).unwrap();
//! assert!(coarse.num_triangles() <= surface.num_triangles());
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use halfmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_triangles(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geom;
pub mod io;
pub mod mesh;

#[cfg(test)]
mod fixtures;

/// Prelude module for convenient imports.
///
/// ```
/// use halfmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::components::{connected_component_count, connected_components};
    pub use crate::algo::manifold::is_two_manifold;
    pub use crate::algo::simplify::{simplify, SimplifyOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, HalfEdge, HalfEdgeKey, TriMesh, Triangle,
        TriangleKey, Vertex, VertexKey,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());
        assert!(is_two_manifold(&mesh));
        assert_eq!(connected_component_count(&mesh), 1);
    }
}
