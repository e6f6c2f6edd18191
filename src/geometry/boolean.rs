// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations on meshes and polygon sets
//!
//! Meshes are combined by classifying whole triangles against the other
//! operands with ray casting. Triangles are never split, so results are exact
//! when operand surfaces do not cross and approximate along crossing seams.
//! Planar sets use Sutherland-Hodgman clipping where the clipper is convex.

use super::polygon::{contains_point, signed_area};
use super::{Mesh, Polygon, PolygonSet, Triangle};
use crate::expr::BooleanOp;
use nalgebra::{Point2, Point3, Vector3};
use tracing::debug;

/// Combine meshes in order; for differences the first mesh is the base
pub fn mesh_boolean(meshes: &[Mesh], op: BooleanOp) -> Mesh {
    match (op, meshes) {
        (_, []) => Mesh::empty(),
        (_, [single]) => single.clone(),
        (BooleanOp::Union, _) => union(meshes),
        (BooleanOp::Intersection, _) => intersection(meshes),
        (BooleanOp::Difference, [base, rest @ ..]) => difference(base, rest),
    }
}

fn union(meshes: &[Mesh]) -> Mesh {
    let mut result = Mesh::new();
    for (i, mesh) in meshes.iter().enumerate() {
        let others: Vec<&Mesh> = meshes
            .iter()
            .enumerate()
            .filter(|&(j, other)| j != i && mesh.bounding_box().intersects(&other.bounding_box()))
            .map(|(_, other)| other)
            .collect();
        if others.is_empty() {
            result.merge(mesh);
            continue;
        }
        result.merge(&filter_triangles(mesh, |centroid| {
            !others.iter().any(|other| is_point_inside(&centroid, other))
        }));
    }
    finish(result)
}

fn intersection(meshes: &[Mesh]) -> Mesh {
    let bounds = meshes
        .iter()
        .skip(1)
        .fold(meshes[0].bounding_box(), |acc, mesh| {
            let other = mesh.bounding_box();
            if acc.intersects(&other) {
                acc
            } else {
                super::BoundingBox::empty()
            }
        });
    if bounds.is_empty() {
        return Mesh::empty();
    }

    let mut result = Mesh::new();
    for (i, mesh) in meshes.iter().enumerate() {
        result.merge(&filter_triangles(mesh, |centroid| {
            meshes
                .iter()
                .enumerate()
                .all(|(j, other)| j == i || is_point_inside(&centroid, other))
        }));
    }
    finish(result)
}

fn difference(base: &Mesh, subtracted: &[Mesh]) -> Mesh {
    let base_bounds = base.bounding_box();
    let cutters: Vec<&Mesh> = subtracted
        .iter()
        .filter(|mesh| mesh.bounding_box().intersects(&base_bounds))
        .collect();
    if cutters.is_empty() {
        return base.clone();
    }

    let mut result = filter_triangles(base, |centroid| {
        !cutters.iter().any(|cutter| is_point_inside(&centroid, cutter))
    });

    for (i, cutter) in cutters.iter().enumerate() {
        let mut inner = filter_triangles(cutter, |centroid| {
            is_point_inside(&centroid, base)
                && !cutters
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && is_point_inside(&centroid, other))
        });
        inner.triangles = inner
            .triangles
            .iter()
            .map(|t| Triangle::new([t.indices[0], t.indices[2], t.indices[1]]))
            .collect();
        result.merge(&inner);
    }
    finish(result)
}

fn finish(mut mesh: Mesh) -> Mesh {
    mesh.weld_vertices(1e-9);
    mesh.remove_orphaned_vertices();
    mesh
}

/// Copy of `mesh` keeping only triangles whose centroid passes `keep`
fn filter_triangles(mesh: &Mesh, keep: impl Fn(Point3<f64>) -> bool) -> Mesh {
    let mut result = Mesh {
        vertices: mesh.vertices.clone(),
        triangles: Vec::with_capacity(mesh.triangles.len()),
    };
    for triangle in &mesh.triangles {
        let [a, b, c] = mesh.triangle_points(triangle);
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        if keep(centroid) {
            result.add_triangle(*triangle);
        }
    }
    result.remove_orphaned_vertices();
    result
}

/// Ray casting parity test against a closed mesh
pub fn is_point_inside(point: &Point3<f64>, mesh: &Mesh) -> bool {
    if !mesh.bounding_box().contains(point, 0.0) {
        return false;
    }
    // Slightly skewed so rays rarely graze axis-aligned edges
    let direction = Vector3::new(1.0, 0.001_414, 0.001_732).normalize();
    let crossings = mesh
        .triangles
        .iter()
        .filter(|triangle| {
            let [a, b, c] = mesh.triangle_points(triangle);
            ray_hits_triangle(point, &direction, &a, &b, &c)
        })
        .count();
    crossings % 2 == 1
}

/// Moller-Trumbore, hits strictly in front of the origin
fn ray_hits_triangle(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> bool {
    const EPS: f64 = 1e-12;

    let edge1 = b - a;
    let edge2 = c - a;
    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < EPS {
        return false;
    }

    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let q = s.cross(&edge1);
    let v = inv * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    inv * edge2.dot(&q) > EPS
}

/// Combine polygon sets in order; for differences the first set is the base
pub fn polygon_boolean(sets: &[PolygonSet], op: BooleanOp) -> PolygonSet {
    match (op, sets) {
        (_, []) => PolygonSet::empty(),
        (_, [single]) => single.clone(),
        (BooleanOp::Union, _) => polygon_union(sets),
        (BooleanOp::Intersection, [first, rest @ ..]) => rest
            .iter()
            .fold(first.clone(), |acc, next| polygon_intersection(&acc, next)),
        (BooleanOp::Difference, [base, rest @ ..]) => rest
            .iter()
            .fold(base.clone(), |acc, next| polygon_difference(&acc, next)),
    }
}

fn polygon_union(sets: &[PolygonSet]) -> PolygonSet {
    let mut result = PolygonSet::empty();
    for (i, set) in sets.iter().enumerate() {
        for polygon in &set.polygons {
            let covered = sets.iter().enumerate().any(|(j, other)| {
                j != i && polygon.iter().all(|p| contains_point(other, p))
            });
            if !covered {
                result.polygons.push(polygon.clone());
            }
        }
    }
    result
}

fn polygon_intersection(a: &PolygonSet, b: &PolygonSet) -> PolygonSet {
    if !a.bounding_box().intersects(&b.bounding_box()) {
        return PolygonSet::empty();
    }
    if covers(b, a) {
        return a.clone();
    }
    if covers(a, b) {
        return b.clone();
    }

    let mut result = PolygonSet::empty();
    for clipper in &b.polygons {
        if !is_convex(clipper) {
            debug!("intersection with non-convex outline approximated by its convex hull");
        }
        let clipper = super::hull::convex_hull_2d(clipper.iter());
        for subject in &a.polygons {
            let clipped = clip_convex(subject, &clipper);
            if clipped.len() >= 3 && signed_area(&clipped).abs() > 0.0 {
                result.polygons.push(clipped);
            }
        }
    }
    result
}

fn polygon_difference(base: &PolygonSet, cutter: &PolygonSet) -> PolygonSet {
    if !base.bounding_box().intersects(&cutter.bounding_box()) {
        return base.clone();
    }
    if covers(cutter, base) {
        return PolygonSet::empty();
    }

    let mut result = base.clone();
    for hole in &cutter.polygons {
        if hole.iter().all(|p| contains_point(base, p)) {
            let mut hole = hole.clone();
            if signed_area(&hole) > 0.0 {
                hole.reverse();
            }
            result.polygons.push(hole);
        } else if !is_convex(hole) {
            debug!("difference with a crossing non-convex outline is approximated");
        } else {
            result.polygons = result
                .polygons
                .iter()
                .flat_map(|subject| subtract_convex(subject, hole))
                .collect();
        }
    }
    result
}

/// True when every point of `inner` lies inside `outer`
fn covers(outer: &PolygonSet, inner: &PolygonSet) -> bool {
    !inner.is_empty() && inner.points().all(|p| contains_point(outer, p))
}

fn is_convex(polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 4 {
        return true;
    }
    let sign = signed_area(polygon).signum();
    (0..n).all(|i| {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let c = polygon[(i + 2) % n];
        cross(&a, &b, &c) * sign >= -1e-12
    })
}

fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Sutherland-Hodgman clip of `subject` to a counter-clockwise convex `clipper`
pub fn clip_convex(subject: &[Point2<f64>], clipper: &[Point2<f64>]) -> Polygon {
    let mut output: Polygon = subject.to_vec();
    let n = clipper.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let (a, b) = (clipper[i], clipper[(i + 1) % n]);
        output = clip_half_plane(&output, |p| cross(&a, &b, p), &a, &b);
    }
    output
}

/// Pieces of `subject` outside a convex `cutter`, one per cutter edge
fn subtract_convex(subject: &Polygon, cutter: &Polygon) -> Vec<Polygon> {
    let mut cutter = cutter.clone();
    if signed_area(&cutter) < 0.0 {
        cutter.reverse();
    }
    let mut remaining = subject.clone();
    let mut pieces = Vec::new();
    let n = cutter.len();
    for i in 0..n {
        if remaining.len() < 3 {
            break;
        }
        let (a, b) = (cutter[i], cutter[(i + 1) % n]);
        let outside = clip_half_plane(&remaining, |p| -cross(&a, &b, p), &b, &a);
        if outside.len() >= 3 && signed_area(&outside).abs() > 1e-12 {
            pieces.push(outside);
        }
        remaining = clip_half_plane(&remaining, |p| cross(&a, &b, p), &a, &b);
    }
    pieces
}

/// Keep the part of `polygon` where `side(p) >= 0`; the boundary is line a-b
pub(crate) fn clip_half_plane(
    polygon: &[Point2<f64>],
    side: impl Fn(&Point2<f64>) -> f64,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Polygon {
    let mut output = Vec::with_capacity(polygon.len() + 1);
    let n = polygon.len();
    for i in 0..n {
        let current = polygon[i];
        let previous = polygon[(i + n - 1) % n];
        let (sc, sp) = (side(&current), side(&previous));
        if sc >= 0.0 {
            if sp < 0.0 {
                output.push(line_intersection(&previous, &current, a, b));
            }
            output.push(current);
        } else if sp >= 0.0 {
            output.push(line_intersection(&previous, &current, a, b));
        }
    }
    output
}

fn line_intersection(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
) -> Point2<f64> {
    let d1 = p2 - p1;
    let d2 = b - a;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < 1e-15 {
        return *p1;
    }
    let t = ((a.x - p1.x) * d2.y - (a.y - p1.y) * d2.x) / denom;
    p1 + d1 * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::analyze;
    use crate::geometry::primitives;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector2};

    fn cube_at(size: f64, offset: Vector3<f64>) -> Mesh {
        let mut mesh = primitives::cuboid(Vector3::new(size, size, size));
        mesh.transform(&Matrix4::new_translation(&offset));
        mesh
    }

    #[test]
    fn test_union_of_disjoint_keeps_both() {
        let a = cube_at(1.0, Vector3::zeros());
        let b = cube_at(1.0, Vector3::new(5.0, 0.0, 0.0));
        let stats = analyze(&mesh_boolean(&[a, b], BooleanOp::Union));
        assert_relative_eq!(stats.volume, 2.0, epsilon = 1e-9);
        assert_eq!(stats.triangle_count, 24);
    }

    #[test]
    fn test_union_drops_enclosed_mesh() {
        let outer = cube_at(10.0, Vector3::zeros());
        let inner = cube_at(1.0, Vector3::new(4.0, 4.0, 4.0));
        let stats = analyze(&mesh_boolean(&[outer, inner], BooleanOp::Union));
        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_with_enclosed_cavity() {
        let outer = cube_at(10.0, Vector3::zeros());
        let inner = cube_at(2.0, Vector3::new(4.0, 4.0, 4.0));
        let stats = analyze(&mesh_boolean(&[outer, inner], BooleanOp::Difference));
        assert_relative_eq!(stats.volume, 992.0, epsilon = 1e-9);
        assert!(stats.is_watertight);
    }

    #[test]
    fn test_intersection_of_disjoint_is_empty() {
        let a = cube_at(1.0, Vector3::zeros());
        let b = cube_at(1.0, Vector3::new(3.0, 0.0, 0.0));
        assert!(mesh_boolean(&[a, b], BooleanOp::Intersection).is_empty());
    }

    #[test]
    fn test_point_inside() {
        let cube = cube_at(2.0, Vector3::zeros());
        assert!(is_point_inside(&Point3::new(1.0, 1.0, 1.0), &cube));
        assert!(!is_point_inside(&Point3::new(3.0, 1.0, 1.0), &cube));
    }

    #[test]
    fn test_planar_intersection_of_squares() {
        let a = primitives::rectangle(Vector2::new(2.0, 2.0));
        let mut b = primitives::rectangle(Vector2::new(2.0, 2.0));
        b.transform(&Matrix4::new_translation(&Vector3::new(1.0, 1.0, 0.0)));
        let result = polygon_boolean(&[a, b], BooleanOp::Intersection);
        assert_relative_eq!(result.area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_planar_difference_of_overlapping_squares() {
        let a = primitives::rectangle(Vector2::new(2.0, 2.0));
        let mut b = primitives::rectangle(Vector2::new(2.0, 2.0));
        b.transform(&Matrix4::new_translation(&Vector3::new(1.0, 1.0, 0.0)));
        let result = polygon_boolean(&[a, b], BooleanOp::Difference);
        assert_relative_eq!(result.area(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_planar_hole() {
        let a = primitives::rectangle(Vector2::new(4.0, 4.0));
        let mut b = primitives::rectangle(Vector2::new(1.0, 1.0));
        b.transform(&Matrix4::new_translation(&Vector3::new(1.0, 1.0, 0.0)));
        let result = polygon_boolean(&[a, b], BooleanOp::Difference);
        assert_eq!(result.polygons.len(), 2);
        assert_relative_eq!(result.area(), 15.0, epsilon = 1e-9);
    }
}
