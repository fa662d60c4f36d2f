//! Benchmarks for mesh operations.

use criterion::{criterion_group, criterion_main, Criterion};
use halfmesh::algo::components::split_components;
use halfmesh::algo::marching_cubes::{marching_cubes, marching_cubes_bool, BoolGrid, FnField};
use halfmesh::algo::weld::weld_vertices;
use halfmesh::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> TriMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces).unwrap()
}

/// Welded surface of a sphere of radius `r` sampled on a `(2r + 3)^3` grid.
fn sphere_surface(r: i64) -> TriMesh {
    let n = (2 * r + 3) as usize;
    let field = FnField::new([-r - 1; 3], [n; 3], move |[x, y, z]: [i64; 3]| {
        r as f64 - ((x * x + y * y + z * z) as f64).sqrt()
    });
    weld_vertices(&marching_cubes(&field, 0.0).unwrap(), 6)
}

fn bench_mesh_construction(c: &mut Criterion) {
    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| create_grid_mesh(50));
    });

    let mesh = create_grid_mesh(50);
    c.bench_function("vertex_neighbors_all", |b| {
        b.iter(|| {
            let mut count = 0;
            for v in mesh.vertex_keys() {
                count += mesh.vertex_neighbors(v).count();
            }
            count
        });
    });
}

fn bench_marching_cubes(c: &mut Criterion) {
    let grid = BoolGrid::from_fn([32, 32, 32], |[x, y, z]| {
        let (dx, dy, dz) = (x - 16, y - 16, z - 16);
        dx * dx + dy * dy + dz * dz < 144
    });
    c.bench_function("marching_cubes_bool_32", |b| {
        b.iter(|| marching_cubes_bool(&grid).unwrap());
    });

    c.bench_function("marching_cubes_scalar_sphere_r12", |b| {
        b.iter(|| sphere_surface(12));
    });
}

fn bench_simplify(c: &mut Criterion) {
    let mesh = sphere_surface(12);
    let options = SimplifyOptions::with_target_ratio(0.25);
    c.bench_function("simplify_sphere_quarter", |b| {
        b.iter(|| simplify(&mesh, &options).unwrap());
    });
}

fn bench_topology(c: &mut Criterion) {
    let grid = BoolGrid::from_fn([24, 24, 24], |[x, y, z]| x % 4 == 1 && y % 4 == 1 && z % 4 == 1);
    let mesh = weld_vertices(&marching_cubes_bool(&grid).unwrap(), 6);

    c.bench_function("connected_component_count_216", |b| {
        b.iter(|| connected_component_count(&mesh));
    });
    c.bench_function("split_components_216", |b| {
        b.iter(|| split_components(&mesh));
    });
    c.bench_function("is_two_manifold_216", |b| {
        b.iter(|| is_two_manifold(&mesh));
    });
}

criterion_group!(
    benches,
    bench_mesh_construction,
    bench_marching_cubes,
    bench_simplify,
    bench_topology
);
criterion_main!(benches);
