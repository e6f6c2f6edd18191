// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point-function deformation
//!
//! A closure cannot be part of a hashable node, so a warp resolves to a raw
//! node keyed by its name, its parameters and the resolved body. The closure
//! is registered with the context under the same key.

use super::{BuildResult, Geometry, GeometryRef};
use crate::context::EvaluationContext;
use crate::environment::Environment;
use crate::error::EvalResult;
use crate::expr::{Node, OperationKey, ParamValue};
use crate::kernel::PointFunction;
use std::sync::Arc;

/// Body with every point moved through `function`.
///
/// `name` and `params` must determine `function` completely: two warps with
/// the same name, parameters and body share one cached result.
#[derive(Clone)]
pub struct Warp {
    pub body: GeometryRef,
    pub name: String,
    pub params: Vec<ParamValue>,
    pub function: Arc<PointFunction>,
}

impl Warp {
    pub fn new(
        body: GeometryRef,
        name: impl Into<String>,
        params: Vec<ParamValue>,
        function: Arc<PointFunction>,
    ) -> Self {
        Self {
            body,
            name: name.into(),
            params,
            function,
        }
    }
}

impl Geometry for Warp {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let body_node = body.node.clone();

        let mut params = self.params.clone();
        params.push(ParamValue::Node(body_node.clone()));
        let key = OperationKey::new(self.name.clone(), params);

        let function = self.function.clone();
        ctx.register_operation(
            key.clone(),
            Arc::new(move |ctx: &EvaluationContext| {
                let input = ctx.realize(&body_node)?;
                ctx.kernel().transform_points(&input, &*function)
            }),
        );
        let raw = Node::raw(body.node.clone(), key);
        Ok(body.replacing_node(raw))
    }
}
