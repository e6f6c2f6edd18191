// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar cross sections and projections of meshes

use super::{Mesh, PolygonSet};
use ahash::AHashMap;
use nalgebra::{Point2, Point3, Vector3};

const WELD_EPSILON: f64 = 1e-9;

/// Cross section of a closed mesh with the plane `z = level`.
///
/// Outlines come out counter-clockwise and holes clockwise, following the
/// outward orientation of the cut triangles.
pub fn slice(mesh: &Mesh, level: f64) -> PolygonSet {
    let mut segments = Vec::new();

    for triangle in &mesh.triangles {
        let points = mesh.triangle_points(triangle);
        let normal = (points[1] - points[0]).cross(&(points[2] - points[0]));
        let crossings: Vec<Point3<f64>> = (0..3)
            .filter_map(|i| {
                let (a, b) = (points[i], points[(i + 1) % 3]);
                let (above_a, above_b) = (a.z > level, b.z > level);
                (above_a != above_b).then(|| {
                    let t = (level - a.z) / (b.z - a.z);
                    a + (b - a) * t
                })
            })
            .collect();

        if let [p, q] = crossings[..] {
            // Material lies to the left of each segment seen from +Z
            let along = Vector3::z().cross(&normal);
            let (p, q) = if (q - p).dot(&along) >= 0.0 { (p, q) } else { (q, p) };
            segments.push((Point2::new(p.x, p.y), Point2::new(q.x, q.y)));
        }
    }

    PolygonSet::new(chain_segments(&segments))
}

/// Shadow of a mesh on the XY plane, traced from its upward-facing triangles
pub fn project(mesh: &Mesh) -> PolygonSet {
    let mut edges: AHashMap<([i64; 2], [i64; 2]), (Point2<f64>, Point2<f64>)> = AHashMap::new();

    for triangle in &mesh.triangles {
        let points = mesh.triangle_points(triangle);
        let normal = (points[1] - points[0]).cross(&(points[2] - points[0]));
        if normal.z <= 0.0 {
            continue;
        }
        for i in 0..3 {
            let a = Point2::new(points[i].x, points[i].y);
            let b = Point2::new(points[(i + 1) % 3].x, points[(i + 1) % 3].y);
            let (ka, kb) = (grid_key(&a), grid_key(&b));
            if ka == kb {
                continue;
            }
            // Interior edges appear once in each direction and cancel
            if edges.remove(&(kb, ka)).is_none() {
                edges.insert((ka, kb), (a, b));
            }
        }
    }

    let segments: Vec<_> = edges.into_values().collect();
    PolygonSet::new(chain_segments(&segments))
}

fn grid_key(p: &Point2<f64>) -> [i64; 2] {
    [
        (p.x / WELD_EPSILON).round() as i64,
        (p.y / WELD_EPSILON).round() as i64,
    ]
}

/// Join directed segments end to start into closed loops
pub fn chain_segments(segments: &[(Point2<f64>, Point2<f64>)]) -> Vec<Vec<Point2<f64>>> {
    let mut by_start: AHashMap<[i64; 2], Vec<usize>> = AHashMap::with_capacity(segments.len());
    for (i, (start, _)) in segments.iter().enumerate() {
        by_start.entry(grid_key(start)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let origin = grid_key(&segments[first].0);
        let mut contour = vec![segments[first].0];
        let mut end = segments[first].1;

        loop {
            let key = grid_key(&end);
            if key == origin {
                break;
            }
            let next = by_start
                .get(&key)
                .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
            let Some(next) = next else {
                break;
            };
            used[next] = true;
            contour.push(segments[next].0);
            end = segments[next].1;
        }

        if contour.len() >= 3 {
            loops.push(contour);
        }
    }
    loops
}
