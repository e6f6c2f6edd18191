// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Refinement and simplification

use super::{Mesh, Polygon, PolygonSet, Triangle};
use ahash::AHashMap;
use nalgebra::Point3;
use rayon::prelude::*;

/// Upper bound on bisection passes; each pass at least halves long edges
const MAX_REFINE_PASSES: usize = 24;

/// Split triangles until no edge is longer than `max_edge_length`.
///
/// Edges are bisected at shared midpoints, so a closed mesh stays closed.
pub fn refine_mesh(mesh: &Mesh, max_edge_length: f64) -> Mesh {
    let mut mesh = mesh.clone();
    if !(max_edge_length > 0.0) {
        return mesh;
    }

    for _ in 0..MAX_REFINE_PASSES {
        let vertices = &mesh.vertices;
        let long = |a: usize, b: usize| (vertices[a] - vertices[b]).norm() > max_edge_length;
        let marks: Vec<[bool; 3]> = mesh
            .triangles
            .par_iter()
            .map(|t| {
                let [a, b, c] = t.indices;
                [long(a, b), long(b, c), long(c, a)]
            })
            .collect();
        if marks.iter().all(|m| !m.iter().any(|&x| x)) {
            break;
        }

        // Any triangle marking an edge forces its neighbour to split it as well
        let mut midpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        for (triangle, mark) in mesh.triangles.iter().zip(&marks) {
            for i in 0..3 {
                if mark[i] {
                    let (a, b) = (triangle.indices[i], triangle.indices[(i + 1) % 3]);
                    midpoints.entry(edge_key(a, b)).or_insert(usize::MAX);
                }
            }
        }
        for (&(a, b), index) in midpoints.iter_mut() {
            let midpoint = nalgebra::center(&mesh.vertices[a], &mesh.vertices[b]);
            *index = mesh.vertices.len();
            mesh.vertices.push(midpoint);
        }

        let mut triangles = Vec::with_capacity(mesh.triangles.len() * 2);
        for triangle in &mesh.triangles {
            split_triangle(triangle, &midpoints, &mut triangles);
        }
        mesh.triangles = triangles;
    }
    mesh
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Split one triangle along whichever of its edges have midpoints
fn split_triangle(
    triangle: &Triangle,
    midpoints: &AHashMap<(usize, usize), usize>,
    out: &mut Vec<Triangle>,
) {
    let v = triangle.indices;
    let m: [Option<usize>; 3] =
        std::array::from_fn(|i| midpoints.get(&edge_key(v[i], v[(i + 1) % 3])).copied());

    match m.iter().filter(|x| x.is_some()).count() {
        0 => out.push(*triangle),
        1 => {
            let i = m.iter().position(Option::is_some).unwrap_or(0);
            let (a, b, c) = (v[i], v[(i + 1) % 3], v[(i + 2) % 3]);
            let mid = m[i].unwrap_or(a);
            out.push(Triangle::new([a, mid, c]));
            out.push(Triangle::new([mid, b, c]));
        }
        2 => {
            // The unsplit edge is c-a; rotate so the split edges are a-b and b-c
            let skip = m.iter().position(Option::is_none).unwrap_or(0);
            let i = (skip + 1) % 3;
            let (a, b, c) = (v[i], v[(i + 1) % 3], v[(i + 2) % 3]);
            let (mab, mbc) = (m[i].unwrap_or(a), m[(i + 1) % 3].unwrap_or(b));
            out.push(Triangle::new([mab, b, mbc]));
            out.push(Triangle::new([a, mab, mbc]));
            out.push(Triangle::new([a, mbc, c]));
        }
        _ => {
            let [m0, m1, m2] = m.map(|x| x.unwrap_or(0));
            out.push(Triangle::new([v[0], m0, m2]));
            out.push(Triangle::new([m0, v[1], m1]));
            out.push(Triangle::new([m2, m1, v[2]]));
            out.push(Triangle::new([m0, m1, m2]));
        }
    }
}

/// Insert points along polygon edges so none is longer than `max_edge_length`
pub fn refine_polygons(set: &PolygonSet, max_edge_length: f64) -> PolygonSet {
    if !(max_edge_length > 0.0) {
        return set.clone();
    }
    let polygons = set
        .polygons
        .iter()
        .map(|polygon| {
            let n = polygon.len();
            let mut refined = Vec::with_capacity(n);
            for i in 0..n {
                let (a, b) = (polygon[i], polygon[(i + 1) % n]);
                let pieces = ((b - a).norm() / max_edge_length).ceil().max(1.0) as usize;
                refined.extend((0..pieces).map(|k| a + (b - a) * (k as f64 / pieces as f64)));
            }
            refined
        })
        .collect();
    PolygonSet::new(polygons)
}

/// Merge vertices closer than `tolerance` and drop the collapsed triangles
pub fn simplify_mesh(mesh: &Mesh, tolerance: f64) -> Mesh {
    let mut mesh = mesh.clone();
    mesh.weld_vertices(tolerance.max(1e-12));
    mesh.remove_orphaned_vertices();
    mesh
}

/// Remove polygon points that deviate less than `tolerance` from the line
/// through their neighbours
pub fn simplify_polygons(set: &PolygonSet, tolerance: f64) -> PolygonSet {
    let polygons = set
        .polygons
        .iter()
        .map(|polygon| simplify_ring(polygon, tolerance))
        .filter(|polygon| polygon.len() >= 3)
        .collect();
    PolygonSet::new(polygons)
}

fn simplify_ring(polygon: &Polygon, tolerance: f64) -> Polygon {
    let mut ring = polygon.clone();
    let mut changed = true;
    while changed && ring.len() > 3 {
        changed = false;
        let mut i = 0;
        while i < ring.len() && ring.len() > 3 {
            let n = ring.len();
            let (a, p, b) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let base = b - a;
            let length = base.norm();
            let deviation = if length > 0.0 {
                (base.x * (p.y - a.y) - base.y * (p.x - a.x)).abs() / length
            } else {
                (p - a).norm()
            };
            if deviation < tolerance {
                ring.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
    ring
}

/// Longest edge of any triangle
pub fn max_edge_length(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .flat_map(|t| {
            let [a, b, c]: [Point3<f64>; 3] = mesh.triangle_points(t);
            [(b - a).norm(), (c - b).norm(), (a - c).norm()]
        })
        .fold(0.0, f64::max)
}
