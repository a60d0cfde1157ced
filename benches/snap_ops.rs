//! Benchmarks for snapping operations.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::Point3;
use vertsnap::algo::snap::{snap_to_reference, SnapOptions};
use vertsnap::prelude::*;
use vertsnap::scene::nearest_face;

/// A jittered copy of an `n` x `n` grid, lifted off the z = 0 plane.
fn create_source_mesh(n: usize) -> HalfEdgeMesh {
    let grid: HalfEdgeMesh = build_quad_grid(n, n).unwrap();
    let (mut vertices, faces) = to_face_vertex(&grid);

    for (i, p) in vertices.iter_mut().enumerate() {
        let t = i as f64;
        *p += nalgebra::Vector3::new(0.3 * (t * 0.7).sin(), 0.3 * (t * 1.3).cos(), 0.25);
    }

    build_from_polygons(&vertices, &faces).unwrap()
}

fn create_scene(n: usize, parallel: bool) -> Scene {
    let mut scene = Scene::new().with_parallel(parallel);
    scene.add_object("reference", build_quad_grid(n, n).unwrap());
    scene.add_object("source", create_source_mesh(n));
    scene
}

fn bench_nearest_face(c: &mut Criterion) {
    let mesh: HalfEdgeMesh = build_quad_grid(100, 100).unwrap();
    let point = Point3::new(73.4, 12.2, 0.5);

    c.bench_function("nearest_face_100x100_parallel", |b| {
        b.iter(|| nearest_face(&mesh, &point, true));
    });

    c.bench_function("nearest_face_100x100_sequential", |b| {
        b.iter(|| nearest_face(&mesh, &point, false));
    });
}

fn bench_snap(c: &mut Criterion) {
    let options = SnapOptions::default().with_tolerance(1.0);

    for (name, parallel) in [("snap_grid_30x30_parallel", true), ("snap_grid_30x30_sequential", false)] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let scene = create_scene(30, parallel);
                    let vertices = scene.vertices_of("source").unwrap();
                    (scene, vertices)
                },
                |(mut scene, vertices)| {
                    snap_to_reference(&mut scene, "reference", &vertices, &options, &Progress::none())
                        .unwrap()
                },
                BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(benches, bench_nearest_face, bench_snap);
criterion_main!(benches);
