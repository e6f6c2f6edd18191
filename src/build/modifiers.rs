// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Single-body geometry modifiers

use super::{require_dimension, BuildResult, Geometry, GeometryRef};
use crate::context::EvaluationContext;
use crate::environment::Environment;
use crate::error::EvalResult;
use crate::expr::{
    reals, AffineTransform, Dimension, Extrusion, JoinStyle, Node, Plane, Projection, Real,
};

/// Body placed by an affine transform
#[derive(Clone)]
pub struct Transformed {
    pub body: GeometryRef,
    pub transform: AffineTransform,
}

impl Transformed {
    pub fn new(body: GeometryRef, transform: AffineTransform) -> Self {
        Self { body, transform }
    }
}

impl Geometry for Transformed {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(&env.transformed(&self.transform), ctx)?;
        Ok(body.placed(&self.transform))
    }
}

/// Planar body extruded along +Z
#[derive(Clone)]
pub struct LinearExtrusion {
    pub body: GeometryRef,
    pub height: f64,
    /// Degrees, counter-clockwise over the full height
    pub twist: f64,
    pub scale_top: [f64; 2],
}

impl LinearExtrusion {
    pub fn new(body: GeometryRef, height: f64) -> Self {
        Self {
            body,
            height,
            twist: 0.0,
            scale_top: [1.0, 1.0],
        }
    }

    pub fn twisted(mut self, twist: f64) -> Self {
        self.twist = twist;
        self
    }

    pub fn scaled_top(mut self, x: f64, y: f64) -> Self {
        self.scale_top = [x, y];
        self
    }
}

impl Geometry for LinearExtrusion {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        require_dimension(&body, Dimension::Two, "extrusion")?;
        let divisions = if self.twist != 0.0 {
            env.twist_divisions(self.twist)
        } else {
            1
        };
        let node = Node::extrusion(
            body.node.clone(),
            Extrusion::Linear {
                height: Real(self.height),
                twist: Real(self.twist),
                scale_top: reals(self.scale_top),
                divisions,
            },
        );
        Ok(body.replacing_node(node))
    }
}

/// Planar body revolved around the Z axis, X as radius
#[derive(Clone)]
pub struct RotationalExtrusion {
    pub body: GeometryRef,
    /// Degrees
    pub angle: f64,
}

impl RotationalExtrusion {
    pub fn new(body: GeometryRef, angle: f64) -> Self {
        Self { body, angle }
    }
}

impl Geometry for RotationalExtrusion {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        require_dimension(&body, Dimension::Two, "extrusion")?;
        if body.node.is_empty() {
            return Ok(body.replacing_node(Node::empty(Dimension::Three)));
        }
        // The outermost profile point sets the arc length to segment
        let radius = ctx.measure(&body.node)?.bounds.max.x.max(0.0);
        let node = Node::extrusion(
            body.node.clone(),
            Extrusion::Rotational {
                angle: Real(self.angle),
                segments: env.segment_count_for_arc(radius, self.angle),
            },
        );
        Ok(body.replacing_node(node))
    }
}

/// Solid body flattened onto the XY plane
#[derive(Clone)]
pub struct Projected {
    pub body: GeometryRef,
    pub projection: Projection,
}

impl Projected {
    pub fn full(body: GeometryRef) -> Self {
        Self {
            body,
            projection: Projection::Full,
        }
    }

    /// Cross section at height `z`
    pub fn slice(body: GeometryRef, z: f64) -> Self {
        Self {
            body,
            projection: Projection::Slice { z: Real(z) },
        }
    }
}

impl Geometry for Projected {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        require_dimension(&body, Dimension::Three, "projection")?;
        let node = Node::projection(body.node.clone(), self.projection.clone());
        Ok(body.replacing_node(node))
    }
}

/// Subdivide until no edge exceeds `max_edge_length`
#[derive(Clone)]
pub struct Refined {
    pub body: GeometryRef,
    pub max_edge_length: f64,
}

impl Geometry for Refined {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let node = Node::refine(body.node.clone(), self.max_edge_length);
        Ok(body.replacing_node(node))
    }
}

/// Drop detail below a tolerance, the environment's unless given
#[derive(Clone)]
pub struct Simplified {
    pub body: GeometryRef,
    pub tolerance: Option<f64>,
}

impl Geometry for Simplified {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let node = Node::simplify(body.node.clone(), self.tolerance.unwrap_or(env.tolerance));
        Ok(body.replacing_node(node))
    }
}

/// Planar offset. Round joins bake a segment count for the offset radius;
/// the miter limit defaults to the environment's.
#[derive(Clone)]
pub struct Offset {
    pub body: GeometryRef,
    pub amount: f64,
    pub join: JoinStyle,
    pub miter_limit: Option<f64>,
}

impl Offset {
    pub fn new(body: GeometryRef, amount: f64, join: JoinStyle) -> Self {
        Self {
            body,
            amount,
            join,
            miter_limit: None,
        }
    }

    pub fn miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = Some(limit);
        self
    }
}

impl Geometry for Offset {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        require_dimension(&body, Dimension::Two, "offset")?;
        let segments = match self.join {
            JoinStyle::Round => env.segment_count(self.amount.abs()),
            JoinStyle::Miter | JoinStyle::Square => 0,
        };
        let node = Node::offset(
            body.node.clone(),
            self.amount,
            self.join,
            self.miter_limit.unwrap_or(env.miter_limit),
            segments,
        );
        Ok(body.replacing_node(node))
    }
}

#[derive(Clone)]
pub struct ConvexHull {
    pub body: GeometryRef,
}

impl Geometry for ConvexHull {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let node = Node::convex_hull(body.node.clone());
        Ok(body.replacing_node(node))
    }
}

/// Keep the side of `plane` its normal points into
#[derive(Clone)]
pub struct Trimmed {
    pub body: GeometryRef,
    pub plane: Plane,
}

impl Geometry for Trimmed {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let node = Node::trim(body.node.clone(), self.plane.clone());
        Ok(body.replacing_node(node))
    }
}

/// One connected component of the body; empty when `index` is out of range
#[derive(Clone)]
pub struct Component {
    pub body: GeometryRef,
    pub index: usize,
}

impl Geometry for Component {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let node = Node::select(body.node.clone(), self.index);
        Ok(body.replacing_node(node))
    }
}
