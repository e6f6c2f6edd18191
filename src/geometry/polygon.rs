// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar polygon sets

use super::BoundingBox;
use nalgebra::{Matrix4, Point2, Point3};
use serde::{Deserialize, Serialize};

/// Closed polygon; counter-clockwise outlines, clockwise holes
pub type Polygon = Vec<Point2<f64>>;

/// A set of closed polygons in the XY plane
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonSet {
    pub polygons: Vec<Polygon>,
}

impl PolygonSet {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(|p| p.len() < 3)
    }

    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(Vec::len).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.polygons.iter().flatten()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for p in self.points() {
            bbox.expand_to_include(&Point3::new(p.x, p.y, 0.0));
        }
        bbox
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        let flips = matrix.fixed_view::<2, 2>(0, 0).determinant() < 0.0;
        for polygon in &mut self.polygons {
            for p in polygon.iter_mut() {
                let q = matrix.transform_point(&Point3::new(p.x, p.y, 0.0));
                *p = Point2::new(q.x, q.y);
            }
            if flips {
                polygon.reverse();
            }
        }
    }

    pub fn merge(&mut self, other: &PolygonSet) {
        self.polygons.extend(other.polygons.iter().cloned());
    }

    /// Sum of signed areas; holes subtract
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| signed_area(p)).sum::<f64>().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.polygons
            .iter()
            .map(|polygon| {
                (0..polygon.len())
                    .map(|i| (polygon[(i + 1) % polygon.len()] - polygon[i]).norm())
                    .sum::<f64>()
            })
            .sum()
    }
}

/// Shoelace area, positive for counter-clockwise polygons
pub fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

/// Even-odd point containment test against a whole polygon set
pub fn contains_point(set: &PolygonSet, point: &Point2<f64>) -> bool {
    let mut inside = false;
    for polygon in &set.polygons {
        let n = polygon.len();
        let mut j = n.wrapping_sub(1);
        for i in 0..n {
            let (a, b) = (polygon[i], polygon[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_area_and_perimeter() {
        let set = PolygonSet::new(vec![square(2.0)]);
        assert_relative_eq!(set.area(), 4.0);
        assert_relative_eq!(set.perimeter(), 8.0);
    }

    #[test]
    fn test_mirror_keeps_orientation() {
        let mut set = PolygonSet::new(vec![square(1.0)]);
        set.transform(&Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(-1.0, 1.0, 1.0)));
        assert!(signed_area(&set.polygons[0]) > 0.0);
    }

    #[test]
    fn test_contains_point() {
        let set = PolygonSet::new(vec![square(2.0)]);
        assert!(contains_point(&set, &Point2::new(1.0, 1.0)));
        assert!(!contains_point(&set, &Point2::new(3.0, 1.0)));
    }
}
