//! Marching cubes surface extraction.
//!
//! Converts a boolean mask or a scalar field sampled on an integer grid into a
//! triangle mesh separating the "inside" voxels from the rest. A voxel is
//! inside when its boolean sample is `true`, or when its scalar sample is
//! strictly greater than the iso-level.
//!
//! # Algorithm
//!
//! 1. The field is padded by one outside voxel on every side, so surfaces
//!    touching the extent are closed.
//! 2. Every padded voxel gets an 8-bit corner code: bit `dx + 2dy + 4dz` is
//!    set when the voxel at offset `(dx, dy, dz)` is inside. The codes are
//!    built with three in-place OR-and-shift sweeps along x, y and z rather
//!    than eight lookups per cell.
//! 3. Each cell with a mixed code is triangulated with the classic 256-case
//!    tables. Crossing points sit at edge midpoints for boolean input and are
//!    linearly interpolated against the iso-level for scalar input.
//! 4. Triangles are wound so that normals point away from the inside region.
//!    Exactly collinear triangles, which some configurations produce, are
//!    skipped.
//!
//! Every triangle gets three fresh vertices; coincident vertices of adjacent
//! cells are not merged. Run [`weld_vertices`](crate::algo::weld::weld_vertices)
//! on the result to obtain a connected surface.
//!
//! # Example
//!
//! ```
//! use halfmesh::algo::marching_cubes::{marching_cubes_bool, BoolGrid};
//! use halfmesh::algo::weld::weld_vertices;
//! use halfmesh::algo::manifold::is_two_manifold;
//!
//! let mut grid = BoolGrid::new([3, 3, 3], false);
//! grid.set([1, 1, 1], true);
//!
//! let raw = marching_cubes_bool(&grid).unwrap();
//! assert_eq!(raw.num_triangles(), 8);
//!
//! let surface = weld_vertices(&raw, 6);
//! assert_eq!(surface.num_vertices(), 6);
//! assert!(is_two_manifold(&surface));
//! ```

mod field;
mod tables;

pub use field::{BoolGrid, Field3, FnField, Grid, ScalarGrid};

use nalgebra::{Point3, Vector3};
use tracing::{debug, info};

use self::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::error::Result;
use crate::geom;
use crate::mesh::TriMesh;

/// Extract the boundary of the `true` voxels of a boolean field.
///
/// Crossing points are placed at edge midpoints.
pub fn marching_cubes_bool<F>(field: &F) -> Result<TriMesh>
where
    F: Field3<Value = bool>,
{
    extract(field, |p| field.sample(p), |_, _| 0.5)
}

/// Extract the `iso_level` isosurface of a scalar field.
///
/// Voxels with a value strictly greater than `iso_level` are inside. Crossing
/// points are linearly interpolated between the two corner values; an edge
/// leading into the padding uses its midpoint.
pub fn marching_cubes<F>(field: &F, iso_level: f64) -> Result<TriMesh>
where
    F: Field3<Value = f64>,
{
    let value = |p: [i64; 3]| field.contains(p).then(|| field.sample(p));
    extract(
        field,
        |p| field.sample(p) > iso_level,
        |a, b| match (value(a), value(b)) {
            (Some(va), Some(vb)) => {
                let t = (iso_level - va) / (vb - va);
                if t.is_finite() {
                    t.clamp(0.0, 1.0)
                } else {
                    0.5
                }
            }
            _ => 0.5,
        },
    )
}

/// Padded voxel layout shared by the code sweep and the cell scan.
struct Padding {
    /// Voxel count per axis, including one padding voxel on each side.
    dims: [usize; 3],
    /// Field coordinate of padded voxel `(0, 0, 0)`.
    origin: [i64; 3],
}

impl Padding {
    fn of<F: Field3>(field: &F) -> Self {
        Self {
            dims: [0, 1, 2].map(|axis| field.dimension(axis) + 2),
            origin: [0, 1, 2].map(|axis| field.min(axis) - 1),
        }
    }

    fn len(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    #[inline]
    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    #[inline]
    fn position(&self, i: usize, j: usize, k: usize) -> [i64; 3] {
        [
            self.origin[0] + i as i64,
            self.origin[1] + j as i64,
            self.origin[2] + k as i64,
        ]
    }

    #[inline]
    fn is_padding(&self, i: usize, j: usize, k: usize) -> bool {
        [i, j, k]
            .iter()
            .zip(self.dims)
            .any(|(&c, d)| c == 0 || c == d - 1)
    }
}

/// Per-voxel corner codes of the padded field.
fn corner_codes<I>(padding: &Padding, inside: I) -> Vec<u8>
where
    I: Fn([i64; 3]) -> bool,
{
    let [nx, ny, nz] = padding.dims;
    let mut codes = vec![0u8; padding.len()];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                if !padding.is_padding(i, j, k) && inside(padding.position(i, j, k)) {
                    codes[padding.index(i, j, k)] = 1;
                }
            }
        }
    }

    // Each sweep reads its +1 neighbor before that neighbor is updated, so the
    // shifted bits come from the previous sweep only. Reads that wrap past a
    // row or slab end land on padding, which is zero.
    let len = codes.len();
    for idx in 0..len.saturating_sub(1) {
        codes[idx] |= codes[idx + 1] << 1;
    }
    let row = nx;
    for idx in 0..len.saturating_sub(row) {
        codes[idx] |= codes[idx + row] << 2;
    }
    let slab = nx * ny;
    for idx in 0..len.saturating_sub(slab) {
        codes[idx] |= codes[idx + slab] << 4;
    }

    codes
}

/// Reorder a `dx + 2dy + 4dz` corner code into the table's corner numbering.
///
/// The two numberings differ only by swapping corners 2/3 and 6/7.
#[inline]
fn table_index(code: u8) -> usize {
    let diff = ((code >> 2) ^ (code >> 3)) & 0b0001_0001;
    (code ^ (diff << 2) ^ (diff << 3)) as usize
}

fn extract<F, I, C>(field: &F, inside: I, crossing: C) -> Result<TriMesh>
where
    F: Field3,
    I: Fn([i64; 3]) -> bool,
    C: Fn([i64; 3], [i64; 3]) -> f64,
{
    let padding = Padding::of(field);
    let [nx, ny, nz] = padding.dims;
    let codes = corner_codes(&padding, inside);

    let mut mesh = TriMesh::new();
    let mut skipped = 0usize;

    for k in 0..nz - 1 {
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let code = codes[padding.index(i, j, k)];
                if code == 0 || code == 0xFF {
                    continue;
                }
                let case = table_index(code);
                let edges = EDGE_TABLE[case];
                if edges == 0 {
                    continue;
                }

                let cell = padding.position(i, j, k);
                let mut points = [Point3::origin(); 12];
                for (e, point) in points.iter_mut().enumerate() {
                    if edges & (1 << e) != 0 {
                        *point = crossing_point(cell, e, &crossing);
                    }
                }

                for tri in TRI_TABLE[case].chunks_exact(3).take_while(|t| t[0] >= 0) {
                    // Table winding faces the set corners; reverse it so
                    // normals leave the inside region.
                    let p0 = points[tri[2] as usize];
                    let p1 = points[tri[1] as usize];
                    let p2 = points[tri[0] as usize];
                    if geom::triangle_cross(&p0, &p1, &p2) == Vector3::zeros() {
                        skipped += 1;
                        continue;
                    }
                    let v0 = mesh.add_vertex(p0);
                    let v1 = mesh.add_vertex(p1);
                    let v2 = mesh.add_vertex(p2);
                    mesh.add_triangle(v0, v1, v2)?;
                }
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped collinear marching cubes triangles");
    }
    info!(
        voxels = field.dimension(0) * field.dimension(1) * field.dimension(2),
        triangles = mesh.num_triangles(),
        "Extracted surface"
    );

    Ok(mesh)
}

/// Crossing point on cell edge `e`.
///
/// The edge is always parameterized from its lexicographically smaller corner,
/// so the two cells sharing a grid edge compute bit-identical points.
fn crossing_point<C>(cell: [i64; 3], e: usize, crossing: &C) -> Point3<f64>
where
    C: Fn([i64; 3], [i64; 3]) -> f64,
{
    let corner = |c: usize| {
        let o = CORNER_OFFSETS[c];
        [cell[0] + o[0], cell[1] + o[1], cell[2] + o[2]]
    };
    let [c0, c1] = EDGE_CORNERS[e];
    let (mut a, mut b) = (corner(c0), corner(c1));
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }

    let t = crossing(a, b);
    let pa = Point3::new(a[0] as f64, a[1] as f64, a[2] as f64);
    let pb = Point3::new(b[0] as f64, b[1] as f64, b[2] as f64);
    pa + (pb - pa) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::components::connected_component_count;
    use crate::algo::manifold::is_two_manifold;
    use crate::algo::weld::weld_vertices;
    use approx::assert_relative_eq;

    fn single_voxel() -> BoolGrid {
        let mut grid = BoolGrid::new([3, 3, 3], false);
        grid.set([1, 1, 1], true);
        grid
    }

    #[test]
    fn test_table_index_swaps_corners() {
        // (1,1,0) is bit 3 here and corner 2 in the tables
        assert_eq!(table_index(0b0000_1000), 0b0000_0100);
        assert_eq!(table_index(0b0000_0100), 0b0000_1000);
        assert_eq!(table_index(0b1000_0000), 0b0100_0000);
        assert_eq!(table_index(0b0000_1100), 0b0000_1100);
        assert_eq!(table_index(0b0010_0011), 0b0010_0011);
    }

    #[test]
    fn test_corner_codes_single_voxel() {
        let grid = single_voxel();
        let padding = Padding::of(&grid);
        assert_eq!(padding.dims, [5, 5, 5]);
        let codes = corner_codes(&padding, |p| grid.sample(p));

        // The voxel at field (1,1,1) is padded (2,2,2). It is corner
        // (dx,dy,dz) of the cell whose origin is (2-dx, 2-dy, 2-dz).
        for b in 0..8usize {
            let (dx, dy, dz) = (b & 1, (b >> 1) & 1, (b >> 2) & 1);
            let code = codes[padding.index(2 - dx, 2 - dy, 2 - dz)];
            assert_eq!(code, 1 << b, "corner {}", b);
        }
        let nonzero = codes.iter().filter(|&&c| c != 0).count();
        assert_eq!(nonzero, 8);
    }

    #[test]
    fn test_single_voxel_octahedron() {
        let mesh = marching_cubes_bool(&single_voxel()).unwrap();
        assert_eq!(mesh.num_triangles(), 8);
        assert_eq!(mesh.num_vertices(), 24);

        // Every crossing point is an edge midpoint next to the voxel
        let center = Point3::new(1.0, 1.0, 1.0);
        for (_, v) in mesh.vertices() {
            assert_relative_eq!((v.position - center).norm(), 0.5);
        }

        // Normals point away from the voxel
        for (t, tri) in mesh.triangles() {
            let [p0, p1, p2] = mesh.triangle_positions(t).unwrap();
            let mid = Point3::from((p0.coords + p1.coords + p2.coords) / 3.0);
            assert!(tri.normal.dot(&(mid - center)) > 0.0);
        }
    }

    #[test]
    fn test_single_voxel_welds_to_closed_surface() {
        let raw = marching_cubes_bool(&single_voxel()).unwrap();
        assert!(!is_two_manifold(&raw));

        let mesh = weld_vertices(&raw, 6);
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_triangles(), 8);
        assert_eq!(mesh.num_halfedges() / 2, 12);
        assert!(is_two_manifold(&mesh));
        assert_eq!(connected_component_count(&mesh), 1);
    }

    #[test]
    fn test_voxel_at_extent_border_is_closed() {
        // Padding closes surfaces that touch the field boundary
        let grid = BoolGrid::new([1, 1, 1], true).with_origin([5, -3, 0]);
        let mesh = weld_vertices(&marching_cubes_bool(&grid).unwrap(), 6);
        assert_eq!(mesh.num_triangles(), 8);
        assert!(is_two_manifold(&mesh));

        let (min, max) = mesh.bounding_box().unwrap();
        assert_relative_eq!(min, Point3::new(4.5, -3.5, -0.5));
        assert_relative_eq!(max, Point3::new(5.5, -2.5, 0.5));
    }

    #[test]
    fn test_solid_block_is_closed_sphere_topology() {
        let grid = BoolGrid::new([3, 2, 4], true);
        let mesh = weld_vertices(&marching_cubes_bool(&grid).unwrap(), 6);

        assert!(is_two_manifold(&mesh));
        assert_eq!(connected_component_count(&mesh), 1);
        let v = mesh.num_vertices() as i64;
        let e = (mesh.num_halfedges() / 2) as i64;
        let f = mesh.num_triangles() as i64;
        assert_eq!(v - e + f, 2);
    }

    #[test]
    fn test_two_voxels_two_components() {
        let mut grid = BoolGrid::new([5, 1, 1], false);
        grid.set([0, 0, 0], true);
        grid.set([4, 0, 0], true);
        let mesh = weld_vertices(&marching_cubes_bool(&grid).unwrap(), 6);
        assert_eq!(connected_component_count(&mesh), 2);
        assert_eq!(mesh.num_triangles(), 16);
    }

    #[test]
    fn test_empty_and_full_fields() {
        let empty = marching_cubes_bool(&BoolGrid::new([4, 4, 4], false)).unwrap();
        assert!(empty.is_empty());

        let zero = marching_cubes(&ScalarGrid::new([0, 3, 3], 1.0), 0.5).unwrap();
        assert!(zero.is_empty());
    }

    #[test]
    fn test_scalar_interpolation() {
        // Values 0 and 1 along x: the 0.25 crossing sits a quarter of the way
        let grid = ScalarGrid::from_vec([2, 1, 1], vec![0.0, 1.0]).unwrap();
        let mesh = marching_cubes(&grid, 0.25).unwrap();
        assert_eq!(mesh.num_triangles(), 8);

        let on_axis: Vec<f64> = mesh
            .vertices()
            .filter(|(_, v)| v.position.y == 0.0 && v.position.z == 0.0)
            .map(|(_, v)| v.position.x)
            .collect();
        assert!(!on_axis.is_empty());
        // Interpolated towards the outside voxel, midpoint towards the padding
        assert!(on_axis.iter().all(|&x| x == 0.25 || x == 1.5));
        assert!(on_axis.iter().any(|&x| x == 0.25));
    }

    #[test]
    fn test_scalar_sphere() {
        let radius = 5.0;
        let field = FnField::new([-8, -8, -8], [17, 17, 17], |[x, y, z]: [i64; 3]| {
            radius - ((x * x + y * y + z * z) as f64).sqrt()
        });
        let mesh = marching_cubes(&field, 0.0).unwrap();
        assert!(mesh.num_triangles() > 100);

        for (_, v) in mesh.vertices() {
            let r = v.position.coords.norm();
            assert!((r - radius).abs() < 0.5, "vertex at radius {}", r);
        }

        let (min, max) = mesh.bounding_box().unwrap();
        assert!(min.x > -radius - 0.5 && max.x < radius + 0.5);
    }
}
