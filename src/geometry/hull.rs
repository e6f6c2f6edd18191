// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Convex hulls

use super::{Mesh, Polygon, Triangle};
use ahash::AHashMap;
use nalgebra::{Point2, Point3};

/// Counter-clockwise hull of planar points (Andrew's monotone chain)
pub fn convex_hull_2d<'a>(points: impl IntoIterator<Item = &'a Point2<f64>>) -> Polygon {
    let mut points: Vec<Point2<f64>> = points.into_iter().copied().collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let turn = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(points.len() * 2);
    for p in &points {
        while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }

    // The upper chain must not pop back into the finished lower chain
    let lower_len = hull.len();
    for p in points.iter().rev().skip(1) {
        while hull.len() > lower_len && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Closed hull mesh of 3D points; empty when the points span no volume
pub fn convex_hull_3d(points: &[Point3<f64>]) -> Mesh {
    if !spans_volume(points) {
        return Mesh::empty();
    }

    // parry works in f32; map hull vertices back to the exact input points
    let mut originals: AHashMap<[u32; 3], Point3<f64>> = AHashMap::with_capacity(points.len());
    let narrowed: Vec<parry3d::math::Point<f32>> = points
        .iter()
        .map(|p| {
            let q = parry3d::math::Point::new(p.x as f32, p.y as f32, p.z as f32);
            originals.insert([q.x.to_bits(), q.y.to_bits(), q.z.to_bits()], *p);
            q
        })
        .collect();

    let (vertices, indices) = parry3d::transformation::convex_hull(&narrowed);

    let mut mesh = Mesh::with_capacity(vertices.len(), indices.len());
    for v in &vertices {
        let exact = originals
            .get(&[v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .copied()
            .unwrap_or_else(|| Point3::new(f64::from(v.x), f64::from(v.y), f64::from(v.z)));
        mesh.add_vertex(exact);
    }
    for face in indices {
        mesh.add_triangle(Triangle::new(face.map(|i| i as usize)));
    }
    mesh
}

/// True when the points contain four that are not coplanar
fn spans_volume(points: &[Point3<f64>]) -> bool {
    let Some(first) = points.first() else {
        return false;
    };
    let Some(second) = points.iter().find(|p| (*p - first).norm() > 1e-12) else {
        return false;
    };
    let axis = second - first;
    let Some(normal) = points
        .iter()
        .map(|p| axis.cross(&(p - first)))
        .find(|n| n.norm() > 1e-12)
    else {
        return false;
    };
    points.iter().any(|p| normal.dot(&(p - first)).abs() > 1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::analyze;
    use crate::geometry::polygon::signed_area;
    use approx::assert_relative_eq;

    #[test]
    fn test_hull_2d_drops_interior_points() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let hull = convex_hull_2d(points.iter());
        assert_eq!(hull.len(), 4);
        assert_relative_eq!(signed_area(&hull), 4.0);
    }

    #[test]
    fn test_hull_2d_of_concave_ring() {
        let points = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
            Point2::new(2.0, 3.0),
        ];
        let hull = convex_hull_2d(points.iter());
        assert_eq!(hull.len(), 4);
        assert_relative_eq!(signed_area(&hull), 16.0);
    }

    #[test]
    fn test_hull_3d_of_cube_corners() {
        let mut points = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points.push(Point3::new(0.5, 0.5, 0.5));
        let stats = analyze(&convex_hull_3d(&points));
        assert_relative_eq!(stats.volume, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_flat_points_have_no_hull() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert!(convex_hull_3d(&points).is_empty());
    }
}
