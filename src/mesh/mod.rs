//! Core mesh data structures.
//!
//! This module provides the arena-backed half-edge mesh and the triangle
//! insertion protocol every algorithm in the crate builds on.
//!
//! # Overview
//!
//! The primary type is [`TriMesh`], a triangle mesh stored as a half-edge
//! graph. Vertices, half-edges and triangles live in generational [`Arena`]s
//! and link to each other through `Copy` keys, so a mesh never contains
//! dangling references and a key from a released slot is rejected rather than
//! aliased.
//!
//! # Keys
//!
//! Mesh elements are identified by type-safe keys:
//! - [`VertexKey`] - Identifies a vertex
//! - [`HalfEdgeKey`] - Identifies a half-edge
//! - [`TriangleKey`] - Identifies a triangle
//!
//! # Construction
//!
//! Triangles are added one at a time through a [`TriangleAdder`], or in bulk
//! from face-vertex lists:
//!
//! ```
//! use halfmesh::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_triangles(), 1);
//! ```

mod adder;
mod arena;
mod builder;
mod keys;
mod trimesh;

pub use adder::TriangleAdder;
pub use arena::Arena;
pub use builder::{build_from_triangles, to_face_vertex};
pub use keys::{HalfEdgeKey, TriangleKey, VertexKey};
pub use trimesh::{HalfEdge, TriMesh, Triangle, Vertex};
