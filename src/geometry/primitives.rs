// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::polygon::signed_area;
use super::{Mesh, PolygonSet, Triangle};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f64::consts::PI;

/// Axis-aligned rectangle with one corner at the origin
pub fn rectangle(size: Vector2<f64>) -> PolygonSet {
    PolygonSet::new(vec![vec![
        Point2::new(0.0, 0.0),
        Point2::new(size.x, 0.0),
        Point2::new(size.x, size.y),
        Point2::new(0.0, size.y),
    ]])
}

/// Regular polygon inscribed in a circle centered at the origin
pub fn circle(radius: f64, segments: u32) -> PolygonSet {
    let n = segments.max(3);
    let points = (0..n)
        .map(|i| {
            let theta = 2.0 * PI * f64::from(i) / f64::from(n);
            Point2::new(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    PolygonSet::new(vec![points])
}

/// Arbitrary simple polygon, normalized to counter-clockwise order
pub fn polygon(points: Vec<Point2<f64>>) -> PolygonSet {
    let mut points = points;
    if signed_area(&points) < 0.0 {
        points.reverse();
    }
    PolygonSet::new(vec![points])
}

/// Box with one corner at the origin, indexed and closed
pub fn cuboid(size: Vector3<f64>) -> Mesh {
    let (x, y, z) = (size.x, size.y, size.z);
    let mut mesh = Mesh::with_capacity(8, 12);

    for position in [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(x, 0.0, 0.0),
        Point3::new(x, y, 0.0),
        Point3::new(0.0, y, 0.0),
        Point3::new(0.0, 0.0, z),
        Point3::new(x, 0.0, z),
        Point3::new(x, y, z),
        Point3::new(0.0, y, z),
    ] {
        mesh.add_vertex(position);
    }

    let faces = [
        // Bottom (z-)
        [0, 2, 1],
        [0, 3, 2],
        // Top (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Front (y-)
        [0, 1, 5],
        [0, 5, 4],
        // Back (y+)
        [3, 7, 6],
        [3, 6, 2],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Right (x+)
        [1, 2, 6],
        [1, 6, 5],
    ];
    for indices in faces {
        mesh.add_triangle(Triangle::new(indices));
    }

    mesh
}

/// UV sphere centered at the origin with single-vertex poles
pub fn sphere(radius: f64, segments: u32) -> Mesh {
    let slices = segments.max(3) as usize;
    let stacks = (segments as usize / 2).max(2);
    let mut mesh = Mesh::new();

    let north = mesh.add_vertex(Point3::new(0.0, 0.0, radius));
    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(stacks - 1);
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let z = radius * phi.cos();
        let r = radius * phi.sin();
        let ring = (0..slices)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / slices as f64;
                mesh.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z))
            })
            .collect();
        rings.push(ring);
    }
    let south = mesh.add_vertex(Point3::new(0.0, 0.0, -radius));

    for j in 0..slices {
        let next = (j + 1) % slices;
        let first = &rings[0];
        mesh.add_triangle(Triangle::new([north, first[j], first[next]]));

        for pair in rings.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            mesh.add_triangle(Triangle::new([upper[j], lower[j], lower[next]]));
            mesh.add_triangle(Triangle::new([upper[j], lower[next], upper[next]]));
        }

        let last = &rings[rings.len() - 1];
        mesh.add_triangle(Triangle::new([south, last[next], last[j]]));
    }

    mesh
}

/// Cylinder or cone standing on the XY plane; a zero radius collapses to an apex
pub fn cylinder(bottom_radius: f64, top_radius: f64, height: f64, segments: u32) -> Mesh {
    let n = segments.max(3) as usize;
    let mut mesh = Mesh::new();

    let ring = |mesh: &mut Mesh, radius: f64, z: f64| -> Vec<usize> {
        if radius <= 0.0 {
            let apex = mesh.add_vertex(Point3::new(0.0, 0.0, z));
            vec![apex; n]
        } else {
            (0..n)
                .map(|i| {
                    let theta = 2.0 * PI * i as f64 / n as f64;
                    mesh.add_vertex(Point3::new(radius * theta.cos(), radius * theta.sin(), z))
                })
                .collect()
        }
    };

    let bottom = ring(&mut mesh, bottom_radius, 0.0);
    let top = ring(&mut mesh, top_radius, height);
    let bottom_center = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    let top_center = mesh.add_vertex(Point3::new(0.0, 0.0, height));

    for j in 0..n {
        let next = (j + 1) % n;
        mesh.add_triangle(Triangle::new([bottom[j], bottom[next], top[next]]));
        mesh.add_triangle(Triangle::new([bottom[j], top[next], top[j]]));
        if bottom_radius > 0.0 {
            mesh.add_triangle(Triangle::new([bottom_center, bottom[next], bottom[j]]));
        }
        if top_radius > 0.0 {
            mesh.add_triangle(Triangle::new([top_center, top[j], top[next]]));
        }
    }

    mesh.remove_degenerate_triangles();
    mesh.remove_orphaned_vertices();
    mesh
}

/// Mesh from explicit vertices and faces; out-of-range faces are dropped
pub fn polyhedron(vertices: Vec<Point3<f64>>, faces: &[[u32; 3]]) -> Mesh {
    let count = vertices.len();
    let mut mesh = Mesh {
        vertices,
        triangles: Vec::with_capacity(faces.len()),
    };
    for face in faces {
        let indices = face.map(|i| i as usize);
        if indices.iter().all(|&i| i < count) {
            mesh.add_triangle(Triangle::new(indices));
        }
    }
    mesh.remove_degenerate_triangles();
    mesh
}
