//! Mesh algorithms.
//!
//! - **Extraction**: marching cubes over boolean and scalar fields
//! - **Simplification**: quadric error metric edge collapse
//! - **Topology**: connected components, closed two-manifold check
//! - **Cleanup**: vertex welding
//!
//! Algorithms never delete from a [`TriMesh`](crate::mesh::TriMesh) in place.
//! Anything that removes elements returns a new mesh.

pub mod components;
pub mod manifold;
pub mod marching_cubes;
pub mod progress;
pub mod simplify;
pub mod weld;

pub use progress::Progress;
