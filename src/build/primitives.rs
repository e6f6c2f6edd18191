// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Primitive geometries
//!
//! Curved primitives read the environment's segmentation and bake the
//! resulting segment count into their shape.

use super::{BuildResult, Geometry};
use crate::context::EvaluationContext;
use crate::environment::Environment;
use crate::error::EvalResult;
use crate::expr::{reals, Dimension, Node, Real, Shape};
use nalgebra::{Point2, Point3, Vector2, Vector3};

/// Planar geometry with no area or solid geometry with no volume
#[derive(Debug, Clone, Copy)]
pub struct Empty {
    pub dimension: Dimension,
}

impl Empty {
    pub fn new(dimension: Dimension) -> Self {
        Self { dimension }
    }
}

impl Geometry for Empty {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::empty(self.dimension))
    }
}

/// Axis-aligned rectangle with one corner at the origin
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    pub size: Vector2<f64>,
}

impl Rectangle {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            size: Vector2::new(x, y),
        }
    }
}

impl Geometry for Rectangle {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Rectangle {
            size: reals([self.size.x, self.size.y]),
        })))
    }
}

/// Circle centered on the origin
#[derive(Debug, Clone, Copy)]
pub struct Circle {
    pub radius: f64,
}

impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Geometry for Circle {
    fn build(&self, env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Circle {
            radius: Real(self.radius),
            segments: env.segment_count(self.radius),
        })))
    }
}

#[derive(Debug, Clone)]
pub struct Polygon {
    pub points: Vec<Point2<f64>>,
}

impl Polygon {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }
}

impl Geometry for Polygon {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Polygon {
            points: self.points.iter().map(|p| reals([p.x, p.y])).collect(),
        })))
    }
}

/// Box with one corner at the origin
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    pub size: Vector3<f64>,
}

impl Cuboid {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            size: Vector3::new(x, y, z),
        }
    }

    pub fn cube(size: f64) -> Self {
        Self::new(size, size, size)
    }
}

impl Geometry for Cuboid {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Box {
            size: reals([self.size.x, self.size.y, self.size.z]),
        })))
    }
}

/// Sphere centered on the origin
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Geometry for Sphere {
    fn build(&self, env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Sphere {
            radius: Real(self.radius),
            segments: env.segment_count(self.radius),
        })))
    }
}

/// Cylinder or cone standing on the XY plane
#[derive(Debug, Clone, Copy)]
pub struct Cylinder {
    pub bottom_radius: f64,
    pub top_radius: f64,
    pub height: f64,
}

impl Cylinder {
    pub fn new(radius: f64, height: f64) -> Self {
        Self::cone(radius, radius, height)
    }

    pub fn cone(bottom_radius: f64, top_radius: f64, height: f64) -> Self {
        Self {
            bottom_radius,
            top_radius,
            height,
        }
    }
}

impl Geometry for Cylinder {
    fn build(&self, env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Cylinder {
            bottom_radius: Real(self.bottom_radius),
            top_radius: Real(self.top_radius),
            height: Real(self.height),
            segments: env.segment_count(self.bottom_radius.max(self.top_radius)),
        })))
    }
}

/// Mesh given by vertices and counter-clockwise triangle faces
#[derive(Debug, Clone)]
pub struct Polyhedron {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[u32; 3]>,
}

impl Polyhedron {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }
}

impl Geometry for Polyhedron {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        Ok(BuildResult::new(Node::shape(Shape::Polyhedron {
            vertices: self.vertices.iter().map(|v| reals([v.x, v.y, v.z])).collect(),
            faces: self.faces.clone(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Segmentation;
    use crate::expr::NodeKind;

    #[test]
    fn test_sphere_bakes_segment_count() {
        let ctx = EvaluationContext::default();
        let env = Environment::new().with_segmentation(Segmentation::fixed(12));
        let result = Sphere::new(2.0).build(&env, &ctx).unwrap();
        match &result.node.kind {
            NodeKind::Shape(Shape::Sphere { segments, .. }) => assert_eq!(*segments, 12),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_primitives_build_empty() {
        let ctx = EvaluationContext::default();
        let env = Environment::new();
        assert!(Cuboid::new(1.0, 0.0, 1.0).build(&env, &ctx).unwrap().node.is_empty());
        assert!(Circle::new(-1.0).build(&env, &ctx).unwrap().node.is_empty());
        assert_eq!(
            Rectangle::new(0.0, 1.0).build(&env, &ctx).unwrap().dimension(),
            Dimension::Two
        );
    }
}
