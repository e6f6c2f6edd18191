// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Linear and rotational extrusion of polygon sets

use super::triangulate::triangulate_polygons;
use super::{Mesh, PolygonSet, Triangle};
use nalgebra::{Point2, Point3};

/// Extrude along +Z. The profile rotates counter-clockwise by `twist` degrees
/// and scales to `scale_top` over the full height, in `divisions` slices.
pub fn linear_extrude(
    profile: &PolygonSet,
    height: f64,
    twist: f64,
    scale_top: [f64; 2],
    divisions: u32,
) -> Mesh {
    if profile.is_empty() || height <= 0.0 {
        return Mesh::empty();
    }
    let divisions = divisions.max(1);
    let place = |p: &Point2<f64>, layer: u32| -> Point3<f64> {
        let t = f64::from(layer) / f64::from(divisions);
        let sx = 1.0 + (scale_top[0] - 1.0) * t;
        let sy = 1.0 + (scale_top[1] - 1.0) * t;
        let (sin, cos) = (twist * t).to_radians().sin_cos();
        let (x, y) = (p.x * sx, p.y * sy);
        Point3::new(x * cos - y * sin, x * sin + y * cos, height * t)
    };

    let mut mesh = Mesh::new();
    for ring in profile.polygons.iter().filter(|r| r.len() >= 3) {
        let n = ring.len();
        let layers: Vec<Vec<usize>> = (0..=divisions)
            .map(|layer| ring.iter().map(|p| mesh.add_vertex(place(p, layer))).collect())
            .collect();
        for pair in layers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.add_triangle(Triangle::new([lower[i], lower[j], upper[j]]));
                mesh.add_triangle(Triangle::new([lower[i], upper[j], upper[i]]));
            }
        }
    }

    for [a, b, c] in triangulate_polygons(profile) {
        let bottom = [a, c, b].map(|p| mesh.add_vertex(place(&p, 0)));
        mesh.add_triangle(Triangle::new(bottom));
        let top = [a, b, c].map(|p| mesh.add_vertex(place(&p, divisions)));
        mesh.add_triangle(Triangle::new(top));
    }

    seal(mesh)
}

/// Revolve the profile around the Z axis, X as radius and Y as height.
/// Partial revolutions are capped at both ends.
pub fn revolve(profile: &PolygonSet, angle: f64, segments: u32) -> Mesh {
    if profile.is_empty() || angle <= 0.0 {
        return Mesh::empty();
    }
    let full = angle >= 360.0;
    let angle = angle.min(360.0);
    let segments = segments.max(if full { 3 } else { 1 });
    let steps = if full { segments } else { segments + 1 };

    let place = |p: &Point2<f64>, step: u32| -> Point3<f64> {
        let theta = (angle * f64::from(step) / f64::from(segments)).to_radians();
        let r = p.x.max(0.0);
        Point3::new(r * theta.cos(), r * theta.sin(), p.y)
    };

    let mut mesh = Mesh::new();
    for ring in profile.polygons.iter().filter(|r| r.len() >= 3) {
        let n = ring.len();
        let columns: Vec<Vec<usize>> = (0..steps)
            .map(|step| ring.iter().map(|p| mesh.add_vertex(place(p, step))).collect())
            .collect();
        for step in 0..segments as usize {
            let (this, next) = (&columns[step], &columns[(step + 1) % steps as usize]);
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.add_triangle(Triangle::new([this[i], next[j], this[j]]));
                mesh.add_triangle(Triangle::new([this[i], next[i], next[j]]));
            }
        }
    }

    if !full {
        for [a, b, c] in triangulate_polygons(profile) {
            let start = [a, b, c].map(|p| mesh.add_vertex(place(&p, 0)));
            mesh.add_triangle(Triangle::new(start));
            let end = [a, c, b].map(|p| mesh.add_vertex(place(&p, segments)));
            mesh.add_triangle(Triangle::new(end));
        }
    }

    seal(mesh)
}

/// Merge coincident vertices so walls and caps share edges
fn seal(mut mesh: Mesh) -> Mesh {
    mesh.weld_vertices(1e-9);
    mesh.remove_orphaned_vertices();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::analyze;
    use crate::geometry::primitives;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;
    use std::f64::consts::PI;

    #[test]
    fn test_extrude_square() {
        let profile = primitives::rectangle(Vector2::new(2.0, 3.0));
        let stats = analyze(&linear_extrude(&profile, 4.0, 0.0, [1.0, 1.0], 1));
        assert_relative_eq!(stats.volume, 24.0, epsilon = 1e-9);
        assert!(stats.is_watertight);
    }

    #[test]
    fn test_extrude_to_point_is_pyramid() {
        let profile = primitives::rectangle(Vector2::new(2.0, 2.0));
        let stats = analyze(&linear_extrude(&profile, 3.0, 0.0, [0.0, 0.0], 1));
        assert_relative_eq!(stats.volume, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_twisted_extrusion_keeps_volume() {
        let profile = primitives::circle(1.0, 32);
        let straight = analyze(&linear_extrude(&profile, 5.0, 0.0, [1.0, 1.0], 1));
        let twisted = analyze(&linear_extrude(&profile, 5.0, 90.0, [1.0, 1.0], 16));
        assert!((straight.volume - twisted.volume).abs() < straight.volume * 0.01);
        assert_eq!(twisted.bbox.max.z, 5.0);
    }

    #[test]
    fn test_revolve_rectangle_into_tube() {
        let mut profile = primitives::rectangle(Vector2::new(1.0, 2.0));
        profile.transform(&nalgebra::Matrix4::new_translation(&nalgebra::Vector3::new(2.0, 0.0, 0.0)));
        let stats = analyze(&revolve(&profile, 360.0, 64));
        let expected = PI * (9.0 - 4.0) * 2.0;
        assert!((stats.volume - expected).abs() < expected * 0.01);
        assert!(stats.is_watertight);
    }

    #[test]
    fn test_partial_revolution_is_closed() {
        let mut profile = primitives::rectangle(Vector2::new(1.0, 1.0));
        profile.transform(&nalgebra::Matrix4::new_translation(&nalgebra::Vector3::new(1.0, 0.0, 0.0)));
        let stats = analyze(&revolve(&profile, 90.0, 8));
        assert!(stats.is_watertight);
        assert!(stats.volume > 0.0);
    }
}
