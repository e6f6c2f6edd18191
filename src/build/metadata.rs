// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometries that attach or consume result elements
//!
//! Everything stored in an element is baked into global coordinates with the
//! environment's accumulated transform, so element values never need to
//! follow later transforms of the tree that carries them.

use super::{BuildResult, Geometry, GeometryRef};
use crate::context::EvaluationContext;
use crate::elements::{
    next_token, Anchor, AnchorFrame, AnchorRegistry, IsolationMarker, PartCatalog, PartIdentity,
    ResultElement, Tag, TagRegistry,
};
use crate::environment::Environment;
use crate::error::EvalResult;
use crate::expr::{AffineTransform, Node};
use tracing::warn;

fn globalized(result: &BuildResult, env: &Environment) -> BuildResult {
    BuildResult::new(Node::transform(result.node.clone(), env.transform))
}

/// Moves the body out of the main geometry into a separately exported part
#[derive(Clone)]
pub struct InPart {
    pub body: GeometryRef,
    pub identity: PartIdentity,
}

impl Geometry for InPart {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let part = globalized(&body, env);
        let dimension = body.dimension();
        Ok(body
            .modifying_element::<PartCatalog>(|catalog| catalog.insert(self.identity.clone(), part))
            .replacing_node(Node::empty(dimension)))
    }
}

/// Captures a snapshot of the body under a tag
#[derive(Clone)]
pub struct Tagged {
    pub body: GeometryRef,
    pub tag: Tag,
}

impl Geometry for Tagged {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let capture = globalized(&body, env);
        Ok(body.modifying_element::<TagRegistry>(|tags| tags.insert(self.tag.clone(), capture)))
    }
}

/// Previously captured geometry, placed back into the current coordinate
/// system. Elements of the capture are not repeated.
#[derive(Clone)]
pub struct Captured {
    pub result: BuildResult,
}

impl Captured {
    pub fn new(result: BuildResult) -> Self {
        Self { result }
    }
}

impl Geometry for Captured {
    fn build(&self, env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        match env.transform.inverse() {
            Some(local) => Ok(BuildResult::new(self.result.clone().placed(&local).node)),
            None => {
                warn!("current transform is singular, placing capture unchanged");
                Ok(BuildResult::new(self.result.node.clone()))
            }
        }
    }
}

/// Records the frame `transform` relative to the body under `anchor`
#[derive(Clone)]
pub struct DefiningAnchor {
    pub body: GeometryRef,
    pub anchor: Anchor,
    pub transform: AffineTransform,
}

impl Geometry for DefiningAnchor {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let frame = AnchorFrame {
            transform: env.transformed(&self.transform).transform,
            origin: globalized(&body, env),
        };
        Ok(body.modifying_element::<AnchorRegistry>(|anchors| {
            anchors.insert(self.anchor.clone(), frame)
        }))
    }
}

/// Moves the body so that `anchor`, defined anywhere inside it, lands on the
/// current origin.
///
/// The whole body is built before the anchor is looked up, so the definition
/// may come after any use in construction order.
#[derive(Clone)]
pub struct AnchoredTo {
    pub body: GeometryRef,
    pub anchor: Anchor,
}

impl Geometry for AnchoredTo {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let Some(frame) = body.element::<AnchorRegistry>().get(&self.anchor).cloned() else {
            warn!(anchor = %self.anchor, "anchor is not defined in the anchored geometry");
            return Ok(body);
        };
        let Some(inverse) = frame.transform.inverse() else {
            warn!(anchor = %self.anchor, "anchor frame is singular");
            return Ok(body);
        };
        // Global anchor frame expressed relative to the current frame, undone
        let local = env.transform.concatenated(&inverse);
        Ok(body.placed(&local))
    }
}

/// Isolates the body: exports of the surrounding model contain only it
#[derive(Clone)]
pub struct Only {
    pub body: GeometryRef,
    source: u64,
}

impl Only {
    pub fn new(body: GeometryRef) -> Self {
        Self {
            body,
            source: next_token(),
        }
    }
}

impl Geometry for Only {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let isolated = BuildResult::with_elements(
            Node::transform(body.node.clone(), env.transform),
            body.elements.clone(),
        );
        let marker = IsolationMarker::from_source(self.source, isolated);
        let existing = body.element::<IsolationMarker>();
        Ok(body.with_element(IsolationMarker::combine(vec![existing, marker])))
    }
}
