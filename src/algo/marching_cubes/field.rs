//! Volumetric inputs for marching cubes.
//!
//! A [`Field3`] is a rectangular, integer-indexed 3D volume. Voxel positions
//! run from `min(axis)` to `max(axis)` inclusive on each axis, and each voxel
//! yields one sample: a `bool` for binary masks or an `f64` for scalar fields.

use crate::error::{MeshError, Result};

/// A rectangular 3D field sampled at integer voxel coordinates.
pub trait Field3 {
    /// Sample type, `bool` or `f64`.
    type Value: Copy;

    /// Number of voxels along `axis` (0 = x, 1 = y, 2 = z).
    fn dimension(&self, axis: usize) -> usize;

    /// Smallest voxel coordinate along `axis`.
    fn min(&self, axis: usize) -> i64;

    /// Largest voxel coordinate along `axis`, inclusive.
    fn max(&self, axis: usize) -> i64 {
        self.min(axis) + self.dimension(axis) as i64 - 1
    }

    /// Value at a voxel inside the extent.
    fn sample(&self, position: [i64; 3]) -> Self::Value;

    /// Whether `position` lies inside the extent.
    fn contains(&self, position: [i64; 3]) -> bool {
        (0..3).all(|axis| position[axis] >= self.min(axis) && position[axis] <= self.max(axis))
    }
}

/// Dense voxel grid stored in x-fastest order.
///
/// # Example
///
/// ```
/// use halfmesh::algo::marching_cubes::{Field3, Grid};
///
/// let mut grid = Grid::new([4, 3, 2], false).with_origin([-2, 0, 0]);
/// grid.set([-1, 1, 1], true);
/// assert!(grid.sample([-1, 1, 1]));
/// assert_eq!(grid.max(0), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    dims: [usize; 3],
    origin: [i64; 3],
    data: Vec<T>,
}

/// Binary voxel mask.
pub type BoolGrid = Grid<bool>;

/// Real-valued voxel field.
pub type ScalarGrid = Grid<f64>;

impl<T: Copy> Grid<T> {
    /// Create a grid of the given dimensions with every voxel set to `fill`.
    pub fn new(dims: [usize; 3], fill: T) -> Self {
        Self {
            dims,
            origin: [0; 3],
            data: vec![fill; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Wrap existing x-fastest data.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Result<Self> {
        let expected = dims[0] * dims[1] * dims[2];
        if data.len() != expected {
            return Err(MeshError::invalid_param(
                "data.len()",
                data.len(),
                "must equal the product of the grid dimensions",
            ));
        }
        Ok(Self {
            dims,
            origin: [0; 3],
            data,
        })
    }

    /// Fill a grid by evaluating `f` at every voxel coordinate.
    pub fn from_fn<F>(dims: [usize; 3], mut f: F) -> Self
    where
        F: FnMut([i64; 3]) -> T,
    {
        let mut data = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for z in 0..dims[2] as i64 {
            for y in 0..dims[1] as i64 {
                for x in 0..dims[0] as i64 {
                    data.push(f([x, y, z]));
                }
            }
        }
        Self {
            dims,
            origin: [0; 3],
            data,
        }
    }

    /// Move the grid so that its first voxel sits at `origin`.
    pub fn with_origin(mut self, origin: [i64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Value at a voxel, or `None` outside the grid.
    pub fn get(&self, position: [i64; 3]) -> Option<T> {
        self.offset(position).map(|i| self.data[i])
    }

    /// Set a voxel. Positions outside the grid are ignored.
    pub fn set(&mut self, position: [i64; 3], value: T) {
        if let Some(i) = self.offset(position) {
            self.data[i] = value;
        }
    }

    fn offset(&self, position: [i64; 3]) -> Option<usize> {
        let mut local = [0usize; 3];
        for axis in 0..3 {
            let d = position[axis] - self.origin[axis];
            if d < 0 || d >= self.dims[axis] as i64 {
                return None;
            }
            local[axis] = d as usize;
        }
        Some(local[0] + self.dims[0] * (local[1] + self.dims[1] * local[2]))
    }
}

impl<T: Copy + Default> Field3 for Grid<T> {
    type Value = T;

    fn dimension(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    fn min(&self, axis: usize) -> i64 {
        self.origin[axis]
    }

    fn sample(&self, position: [i64; 3]) -> T {
        self.get(position).unwrap_or_default()
    }
}

/// A field computed on demand by a closure over a fixed extent.
pub struct FnField<F> {
    min: [i64; 3],
    dims: [usize; 3],
    f: F,
}

impl<F> FnField<F> {
    /// Create a field over the voxels `min .. min + dims`.
    pub fn new(min: [i64; 3], dims: [usize; 3], f: F) -> Self {
        Self { min, dims, f }
    }
}

impl<F> std::fmt::Debug for FnField<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnField")
            .field("min", &self.min)
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

impl<T: Copy, F: Fn([i64; 3]) -> T> Field3 for FnField<F> {
    type Value = T;

    fn dimension(&self, axis: usize) -> usize {
        self.dims[axis]
    }

    fn min(&self, axis: usize) -> i64 {
        self.min[axis]
    }

    fn sample(&self, position: [i64; 3]) -> T {
        (self.f)(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_extent() {
        let grid = ScalarGrid::new([3, 4, 5], 0.0).with_origin([10, -2, 0]);
        assert_eq!(grid.dimension(1), 4);
        assert_eq!(grid.min(0), 10);
        assert_eq!(grid.max(0), 12);
        assert_eq!(grid.max(1), 1);
        assert!(grid.contains([12, 1, 4]));
        assert!(!grid.contains([13, 1, 4]));
        assert_eq!(grid.get([9, 0, 0]), None);
    }

    #[test]
    fn test_from_fn_is_x_fastest() {
        let grid = Grid::from_fn([2, 2, 2], |[x, y, z]| x + 10 * y + 100 * z);
        assert_eq!(grid.get([1, 0, 0]), Some(1));
        assert_eq!(grid.get([0, 1, 1]), Some(110));
        assert_eq!(grid.data, vec![0, 1, 10, 11, 100, 101, 110, 111]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(BoolGrid::from_vec([2, 2, 2], vec![false; 8]).is_ok());
        assert!(matches!(
            BoolGrid::from_vec([2, 2, 2], vec![false; 7]),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_fn_field() {
        let field = FnField::new([-1, -1, -1], [3, 3, 3], |[x, y, z]: [i64; 3]| {
            x == 0 && y == 0 && z == 0
        });
        assert_eq!(field.max(2), 1);
        assert!(field.sample([0, 0, 0]));
        assert!(!field.sample([1, 0, 0]));
    }
}
