// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon triangulation by ear clipping, with holes bridged into outlines

use super::polygon::signed_area;
use super::{Polygon, PolygonSet};
use nalgebra::Point2;

/// Counter-clockwise triangles covering the filled area of `set`
pub fn triangulate_polygons(set: &PolygonSet) -> Vec<[Point2<f64>; 3]> {
    let mut triangles = Vec::new();
    for (outline, holes) in group_outlines(set) {
        let ring = bridge_holes(outline, holes);
        triangles.extend(ear_clip(&ring));
    }
    triangles
}

/// Pair every counter-clockwise outline with the clockwise holes it contains
pub fn group_outlines(set: &PolygonSet) -> Vec<(Polygon, Vec<Polygon>)> {
    let (outlines, holes): (Vec<&Polygon>, Vec<&Polygon>) = set
        .polygons
        .iter()
        .filter(|p| p.len() >= 3)
        .partition(|p| signed_area(p) > 0.0);

    let mut groups: Vec<(Polygon, Vec<Polygon>)> =
        outlines.iter().map(|p| ((*p).clone(), Vec::new())).collect();

    for hole in holes {
        // Innermost containing outline wins
        let owner = groups
            .iter_mut()
            .filter(|(outline, _)| point_in_polygon(outline, &hole[0]))
            .min_by(|a, b| signed_area(&a.0).total_cmp(&signed_area(&b.0)));
        if let Some((_, owned)) = owner {
            owned.push(hole.clone());
        }
    }
    groups
}

fn point_in_polygon(polygon: &[Point2<f64>], point: &Point2<f64>) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Splice each hole into the outline through a mutually visible vertex pair
fn bridge_holes(outline: Polygon, mut holes: Vec<Polygon>) -> Polygon {
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    let mut ring = outline;
    for (index, hole) in holes.iter().enumerate() {
        let start = hole
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.x.total_cmp(&b.1.x))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let m = hole[start];

        let blockers: Vec<&Polygon> = holes[index..].iter().collect();
        let target = (0..ring.len())
            .filter(|&i| is_visible(&ring, &blockers, &m, i))
            .min_by(|&a, &b| (ring[a] - m).norm().total_cmp(&(ring[b] - m).norm()))
            .or_else(|| {
                (0..ring.len()).min_by(|&a, &b| (ring[a] - m).norm().total_cmp(&(ring[b] - m).norm()))
            });
        let Some(target) = target else {
            continue;
        };

        let mut spliced = Vec::with_capacity(ring.len() + hole.len() + 2);
        spliced.extend_from_slice(&ring[..=target]);
        spliced.extend(hole[start..].iter().chain(hole[..start].iter()).copied());
        spliced.push(m);
        spliced.push(ring[target]);
        spliced.extend_from_slice(&ring[target + 1..]);
        ring = spliced;
    }
    ring
}

fn max_x(polygon: &Polygon) -> f64 {
    polygon.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
}

/// Segment from `from` to `ring[target]` crosses no ring or hole edge
fn is_visible(ring: &[Point2<f64>], holes: &[&Polygon], from: &Point2<f64>, target: usize) -> bool {
    let to = ring[target];
    let edges = |polygon: &[Point2<f64>]| {
        let n = polygon.len();
        (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n])).collect::<Vec<_>>()
    };
    edges(ring)
        .into_iter()
        .chain(holes.iter().flat_map(|h| edges(h.as_slice())))
        .filter(|(a, b)| *a != to && *b != to && a != from && b != from)
        .all(|(a, b)| !segments_cross(from, &to, &a, &b))
}

fn segments_cross(p1: &Point2<f64>, p2: &Point2<f64>, q1: &Point2<f64>, q2: &Point2<f64>) -> bool {
    let d1 = orient(q1, q2, p1);
    let d2 = orient(q1, q2, p2);
    let d3 = orient(p1, p2, q1);
    let d4 = orient(p1, p2, q2);
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0)
}

fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Ear clipping of a simple counter-clockwise ring
pub fn ear_clip(ring: &[Point2<f64>]) -> Vec<[Point2<f64>; 3]> {
    let mut indices: Vec<usize> = (0..ring.len()).collect();
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    let mut misses = 0;
    let mut i = 0;
    while indices.len() > 3 {
        let n = indices.len();
        let (prev, curr, next) = (indices[(i + n - 1) % n], indices[i % n], indices[(i + 1) % n]);
        let (a, b, c) = (ring[prev], ring[curr], ring[next]);

        if is_ear(ring, &indices, a, b, c) {
            triangles.push([a, b, c]);
            indices.remove(i % n);
            misses = 0;
        } else {
            i += 1;
            misses += 1;
            if misses > n {
                // Degenerate remainder: drop the flattest corner and go on
                let flattest = (0..n)
                    .min_by(|&x, &y| {
                        corner_area(ring, &indices, x).total_cmp(&corner_area(ring, &indices, y))
                    })
                    .unwrap_or(0);
                indices.remove(flattest);
                misses = 0;
            }
        }
        if !indices.is_empty() {
            i %= indices.len();
        }
    }

    if indices.len() == 3 {
        let [a, b, c] = [ring[indices[0]], ring[indices[1]], ring[indices[2]]];
        if orient(&a, &b, &c) > 0.0 {
            triangles.push([a, b, c]);
        }
    }
    triangles
}

fn corner_area(ring: &[Point2<f64>], indices: &[usize], i: usize) -> f64 {
    let n = indices.len();
    orient(
        &ring[indices[(i + n - 1) % n]],
        &ring[indices[i]],
        &ring[indices[(i + 1) % n]],
    )
    .abs()
}

fn is_ear(
    ring: &[Point2<f64>],
    indices: &[usize],
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
) -> bool {
    if orient(&a, &b, &c) <= 0.0 {
        return false;
    }
    indices
        .iter()
        .map(|&k| ring[k])
        .filter(|p| *p != a && *p != b && *p != c)
        .all(|p| !inside_triangle(&p, &a, &b, &c))
}

fn inside_triangle(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0
}
