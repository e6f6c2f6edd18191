// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean combination of geometries

use super::{BuildResult, Geometry, GeometryRef};
use crate::context::EvaluationContext;
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::expr::{BooleanOp, Dimension, Node};
use std::sync::Arc;

/// Union, intersection or ordered difference of child geometries.
///
/// Subtracted children of a difference are built with the environment's
/// operation inverted. The dimension of a composite with no children is
/// `dimension`, three by default.
#[derive(Clone)]
pub struct Boolean {
    pub op: BooleanOp,
    pub children: Vec<GeometryRef>,
    pub dimension: Dimension,
}

impl Boolean {
    pub fn new(op: BooleanOp, children: Vec<GeometryRef>) -> Self {
        Self {
            op,
            children,
            dimension: Dimension::Three,
        }
    }

    pub fn union(children: Vec<GeometryRef>) -> Self {
        Self::new(BooleanOp::Union, children)
    }

    pub fn intersection(children: Vec<GeometryRef>) -> Self {
        Self::new(BooleanOp::Intersection, children)
    }

    /// `base` minus every geometry in `subtracted`
    pub fn difference(base: GeometryRef, subtracted: Vec<GeometryRef>) -> Self {
        let mut children = Vec::with_capacity(subtracted.len() + 1);
        children.push(base);
        children.extend(subtracted);
        Self::new(BooleanOp::Difference, children)
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }
}

impl Geometry for Boolean {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let subtracting = env.with_operation(env.operation.inverted());
        let results = self
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let scope = if self.op == BooleanOp::Difference && i > 0 {
                    &subtracting
                } else {
                    env
                };
                child.build(scope, ctx)
            })
            .collect::<EvalResult<Vec<BuildResult>>>()?;

        let dimension = results.first().map_or(self.dimension, BuildResult::dimension);
        if let Some(mismatch) = results.iter().find(|r| r.dimension() != dimension) {
            return Err(EvalError::DimensionMismatch {
                operation: "boolean",
                expected: dimension,
                actual: mismatch.dimension(),
            });
        }

        let nodes: Vec<Arc<Node>> = results.iter().map(|r| r.node.clone()).collect();
        Ok(BuildResult::combining(
            Node::boolean(dimension, self.op, nodes),
            results,
        ))
    }
}
