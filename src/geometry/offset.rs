// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar offsetting

use super::polygon::signed_area;
use super::{Polygon, PolygonSet};
use crate::expr::JoinStyle;
use nalgebra::{Point2, Vector2};

/// Grow (positive `amount`) or shrink every polygon of the set.
///
/// Each edge moves outward along its normal; corners opening a gap are
/// joined by `join`, the others meet at the intersection of neighbouring
/// edges. Rings whose orientation flips collapse and are dropped, as are
/// shrinking rings with a vertex closer than `amount` to the source ring.
pub fn offset_polygons(
    set: &PolygonSet,
    amount: f64,
    join: JoinStyle,
    miter_limit: f64,
    segments: u32,
) -> PolygonSet {
    if amount == 0.0 {
        return set.clone();
    }
    let polygons = set
        .polygons
        .iter()
        .filter(|polygon| polygon.len() >= 3)
        .filter_map(|polygon| {
            let original = signed_area(polygon);
            let offset = offset_ring(polygon, amount, join, miter_limit, segments);
            let area = signed_area(&offset);
            let shrinking = amount * original < 0.0;
            let collapsed = shrinking && !keeps_clearance(&offset, polygon, amount.abs());
            (offset.len() >= 3 && area.signum() == original.signum() && area != 0.0 && !collapsed)
                .then_some(offset)
        })
        .collect();
    PolygonSet::new(polygons)
}

fn offset_ring(
    polygon: &Polygon,
    amount: f64,
    join: JoinStyle,
    miter_limit: f64,
    segments: u32,
) -> Polygon {
    let n = polygon.len();
    let mut output = Vec::with_capacity(n * 2);

    for i in 0..n {
        let previous = polygon[(i + n - 1) % n];
        let current = polygon[i];
        let next = polygon[(i + 1) % n];

        let (Some(d_in), Some(d_out)) = (direction(&previous, &current), direction(&current, &next))
        else {
            continue;
        };
        // Outward normal of a counter-clockwise edge is to its right
        let n_in = Vector2::new(d_in.y, -d_in.x);
        let n_out = Vector2::new(d_out.y, -d_out.x);
        let turn = d_in.x * d_out.y - d_in.y * d_out.x;

        if turn * amount <= 0.0 {
            // Offset edges overlap here; meet at their intersection
            let bisector = n_in + n_out;
            let scale = 1.0 + n_in.dot(&n_out);
            if scale.abs() < 1e-12 {
                output.push(current + n_in * amount);
            } else {
                output.push(current + bisector * (amount / scale));
            }
            continue;
        }

        match join {
            JoinStyle::Miter => {
                let scale = 1.0 + n_in.dot(&n_out);
                let miter_length = if scale > 1e-12 { (2.0 / scale).sqrt() } else { f64::INFINITY };
                if miter_length <= miter_limit {
                    output.push(current + (n_in + n_out) * (amount / scale));
                } else {
                    output.push(current + n_in * amount);
                    output.push(current + n_out * amount);
                }
            }
            JoinStyle::Square => {
                let reach = amount.abs();
                output.push(current + n_in * amount + d_in * reach);
                output.push(current + n_out * amount - d_out * reach);
            }
            JoinStyle::Round => {
                let start = n_in.y.atan2(n_in.x);
                let mut sweep = n_out.y.atan2(n_out.x) - start;
                if amount > 0.0 {
                    while sweep < 0.0 {
                        sweep += std::f64::consts::TAU;
                    }
                } else {
                    while sweep > 0.0 {
                        sweep -= std::f64::consts::TAU;
                    }
                }
                let steps = ((sweep.abs() / std::f64::consts::TAU) * f64::from(segments.max(3)))
                    .ceil()
                    .max(1.0) as usize;
                for k in 0..=steps {
                    let angle = start + sweep * k as f64 / steps as f64;
                    output.push(current + Vector2::new(angle.cos(), angle.sin()) * amount);
                }
            }
        }
    }
    output
}

/// A shrunk ring that passed its inradius is reflected through itself and
/// keeps its orientation; its vertices then come too close to the far edges.
fn keeps_clearance(offset: &Polygon, source: &Polygon, clearance: f64) -> bool {
    let floor = clearance * (1.0 - 1e-9) - 1e-9;
    let n = source.len();
    offset.iter().all(|p| {
        (0..n).all(|i| distance_to_segment(p, &source[i], &source[(i + 1) % n]) >= floor)
    })
}

fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared < 1e-24 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / length_squared).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

fn direction(from: &Point2<f64>, to: &Point2<f64>) -> Option<Vector2<f64>> {
    let d = to - from;
    let length = d.norm();
    (length > 1e-12).then(|| d / length)
}
