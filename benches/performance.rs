// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polyframe_expr::build::primitives::{Cuboid, Cylinder, Sphere};
use polyframe_expr::expr::BooleanOp;
use polyframe_expr::geometry::{boolean::mesh_boolean, primitives};
use nalgebra::{Matrix4, Vector3};
use polyframe_expr::{
    Environment, EvaluationContext, Geometry, GeometryExt, GeometryRef, IntoGeometry, Segmentation,
};

/// A plate with a grid of holes; every hole shares one cylinder node
fn perforated_plate(holes: usize) -> GeometryRef {
    let mut plate = Cuboid::new(holes as f64 * 4.0, 20.0, 2.0).into_geometry();
    for i in 0..holes {
        plate = plate.subtracting(Cylinder::new(1.0, 4.0).translated(i as f64 * 4.0 + 2.0, 10.0, -1.0));
    }
    plate
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let ctx = EvaluationContext::default();
    let env = Environment::new();

    for holes in [4, 16] {
        let model = perforated_plate(holes);
        group.bench_with_input(BenchmarkId::new("perforated_plate", holes), &model, |b, model| {
            b.iter(|| model.build(black_box(&env), &ctx).unwrap())
        });
    }

    group.bench_function("simplify_nested_transforms", |b| {
        let mut model = Sphere::new(1.0).into_geometry();
        for i in 0..32 {
            model = model.translated(f64::from(i), 0.0, 0.0).rotated(0.0, 0.0, 5.0);
        }
        b.iter(|| model.build(black_box(&env), &ctx).unwrap().node.simplified())
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.sample_size(20);
    let env = Environment::new().with_segmentation(Segmentation::fixed(24));
    let model = perforated_plate(8);

    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let ctx = EvaluationContext::default();
            ctx.evaluate(black_box(&model), &env).unwrap()
        })
    });

    let warm = EvaluationContext::default();
    warm.evaluate(&model, &env).unwrap();
    group.bench_function("warm_cache", |b| {
        b.iter(|| warm.evaluate(black_box(&model), &env).unwrap())
    });

    group.finish();
}

fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel");

    group.bench_function("sphere_64", |b| {
        b.iter(|| primitives::sphere(black_box(10.0), black_box(64)))
    });

    let outer = primitives::cuboid(Vector3::new(10.0, 10.0, 10.0));
    let mut inner = primitives::cuboid(Vector3::new(8.0, 8.0, 8.0));
    inner.transform(&Matrix4::new_translation(&Vector3::new(1.0, 1.0, 1.0)));
    let operands = [outer, inner];

    group.bench_function("difference", |b| {
        b.iter(|| mesh_boolean(black_box(&operands), BooleanOp::Difference))
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_evaluate, bench_kernel);
criterion_main!(benches);
