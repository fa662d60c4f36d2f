//! Handle types for arena-based mesh storage.
//!
//! Every mesh entity is addressed by a small `Copy` key made of a slot index
//! and a generation counter. Keys are created by `slotmap::SlotMap`; a key whose
//! slot has been released no longer resolves, so a stale handle is detected
//! instead of silently aliasing a reused slot.
//!
//! Keys carry no mesh identity. A key taken from another mesh fails only when
//! its slot is not live here; otherwise it addresses whatever record occupies
//! that slot.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (a point in 3D space).
    pub struct VertexKey;

    /// Key for a half-edge (one directed side of a triangle edge).
    pub struct HalfEdgeKey;

    /// Key for a triangle.
    pub struct TriangleKey;
}
