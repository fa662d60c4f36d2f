//! Small meshes shared by the unit tests.

use nalgebra::{Point3, Vector3};

use crate::mesh::{build_from_triangles, TriMesh};

/// Corner `i` of the unit cube is `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
pub fn cube_vertices(origin: [f64; 3]) -> Vec<Point3<f64>> {
    let o = Vector3::from(origin);
    (0..8)
        .map(|i| {
            Point3::new(
                (i & 1) as f64,
                ((i >> 1) & 1) as f64,
                ((i >> 2) & 1) as f64,
            ) + o
        })
        .collect()
}

/// The 12 outward-facing triangles of the unit cube.
pub const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

pub fn cube(origin: [f64; 3]) -> TriMesh {
    build_from_triangles(&cube_vertices(origin), &CUBE_FACES).unwrap()
}

pub fn octahedron() -> TriMesh {
    let vertices = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = vec![
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    build_from_triangles(&vertices, &faces).unwrap()
}

/// Flat `n x n` grid in the z = 0 plane, two triangles per cell.
pub fn grid(n: usize) -> TriMesh {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = j * (n + 1) + i + 1;
            let v01 = (j + 1) * (n + 1) + i;
            let v11 = (j + 1) * (n + 1) + i + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

/// UV sphere with `stacks` rings and `slices` segments, closed at the poles.
pub fn uv_sphere(stacks: usize, slices: usize) -> TriMesh {
    use std::f64::consts::PI;

    let mut vertices = vec![Point3::new(0.0, 0.0, 1.0)];
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            vertices.push(Point3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ));
        }
    }
    let south = vertices.len();
    vertices.push(Point3::new(0.0, 0.0, -1.0));

    let ring = |i: usize, j: usize| 1 + (i - 1) * slices + j % slices;
    let mut faces = Vec::new();
    for j in 0..slices {
        faces.push([0, ring(1, j), ring(1, j + 1)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let a = ring(i, j);
            let b = ring(i + 1, j);
            let c = ring(i + 1, j + 1);
            let d = ring(i, j + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    for j in 0..slices {
        faces.push([south, ring(stacks - 1, j + 1), ring(stacks - 1, j)]);
    }

    build_from_triangles(&vertices, &faces).unwrap()
}
