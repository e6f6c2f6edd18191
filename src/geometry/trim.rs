// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Trimming geometry by a plane
//!
//! Trimming keeps the half space the plane normal points into and caps the
//! cut so closed meshes stay closed.

use super::boolean::clip_half_plane;
use super::section::slice;
use super::triangulate::triangulate_polygons;
use super::{Mesh, PolygonSet, Triangle};
use nalgebra::{Matrix4, Point2, Point3, Rotation3, Vector3};

/// Keep the part of `mesh` where `normal · p >= offset`
pub fn trim_mesh(mesh: &Mesh, normal: Vector3<f64>, offset: f64) -> Mesh {
    let length = normal.norm();
    if mesh.is_empty() || !(length > 0.0) {
        return mesh.clone();
    }
    let normal = normal / length;
    let offset = offset / length;

    // Work in a frame where the plane is z = 0 and the kept side is z > 0
    let rotation = Rotation3::rotation_between(&normal, &Vector3::z())
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI));
    let frame = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -offset)) * rotation.to_homogeneous();
    let Some(back) = frame.try_inverse() else {
        return mesh.clone();
    };

    let mut local = mesh.clone();
    local.transform(&frame);

    let mut result = Mesh::new();
    for triangle in &local.triangles {
        let clipped = clip_triangle(&local.triangle_points(triangle));
        if clipped.len() < 3 {
            continue;
        }
        let indices: Vec<usize> = clipped.into_iter().map(|p| result.add_vertex(p)).collect();
        for k in 1..indices.len() - 1 {
            result.add_triangle(Triangle::new([indices[0], indices[k], indices[k + 1]]));
        }
    }

    // The cap faces away from the kept side
    for [a, b, c] in triangulate_polygons(&slice(&local, 0.0)) {
        let corners = [a, c, b].map(|p| result.add_vertex(Point3::new(p.x, p.y, 0.0)));
        result.add_triangle(Triangle::new(corners));
    }

    result.transform(&back);
    result.weld_vertices(1e-9);
    result.remove_orphaned_vertices();
    result
}

/// Part of a triangle with z > 0, same winding
fn clip_triangle(points: &[Point3<f64>; 3]) -> Vec<Point3<f64>> {
    let mut output = Vec::with_capacity(4);
    for i in 0..3 {
        let (previous, current) = (points[(i + 2) % 3], points[i]);
        let (keep_previous, keep_current) = (previous.z > 0.0, current.z > 0.0);
        if keep_current != keep_previous {
            // Same interpolation the slicer uses so cap and walls meet exactly
            let t = -previous.z / (current.z - previous.z);
            let mut crossing = previous + (current - previous) * t;
            crossing.z = 0.0;
            output.push(crossing);
        }
        if keep_current {
            output.push(current);
        }
    }
    output
}

/// Keep the part of a planar set where `normal · p >= offset`
pub fn trim_polygons(set: &PolygonSet, normal: [f64; 2], offset: f64) -> PolygonSet {
    let length = (normal[0] * normal[0] + normal[1] * normal[1]).sqrt();
    if !(length > 0.0) {
        return set.clone();
    }
    let (nx, ny) = (normal[0] / length, normal[1] / length);
    let offset = offset / length;

    let a = Point2::new(nx * offset, ny * offset);
    let b = Point2::new(a.x - ny, a.y + nx);
    let polygons = set
        .polygons
        .iter()
        .map(|polygon| clip_half_plane(polygon, |p| nx * p.x + ny * p.y - offset, &a, &b))
        .filter(|polygon| polygon.len() >= 3)
        .collect();
    PolygonSet::new(polygons)
}
