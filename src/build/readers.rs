// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometries that decide what to build from resolved information
//!
//! Each reader resolves what it inspects first, then builds the geometry its
//! closure returns. The returned geometry usually rebuilds the body, so only
//! its elements survive; the inspected body's elements would sit at stale
//! positions.

use super::{BuildResult, Geometry, GeometryRef};
use crate::context::EvaluationContext;
use crate::environment::{Environment, EnvironmentOverrides};
use crate::error::EvalResult;
use crate::kernel::Measurements;
use std::sync::Arc;

pub type EnvironmentReader = dyn Fn(&Environment) -> GeometryRef + Send + Sync;
pub type ResultReader = dyn Fn(GeometryRef, &BuildResult) -> GeometryRef + Send + Sync;
pub type MeasurementReader = dyn Fn(GeometryRef, &Measurements) -> GeometryRef + Send + Sync;

/// Geometry chosen from the current environment
#[derive(Clone)]
pub struct ReadEnvironment {
    pub reader: Arc<EnvironmentReader>,
}

impl ReadEnvironment {
    pub fn new(reader: impl Fn(&Environment) -> GeometryRef + Send + Sync + 'static) -> Self {
        Self {
            reader: Arc::new(reader),
        }
    }
}

impl Geometry for ReadEnvironment {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        (self.reader)(env).build(env, ctx)
    }
}

/// Geometry chosen from the body's build result, e.g. its tags or anchors
#[derive(Clone)]
pub struct ReadResult {
    pub body: GeometryRef,
    pub reader: Arc<ResultReader>,
}

impl Geometry for ReadResult {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        (self.reader)(self.body.clone(), &body).build(env, ctx)
    }
}

/// Geometry chosen from the measured, fully realized body
#[derive(Clone)]
pub struct Measuring {
    pub body: GeometryRef,
    pub reader: Arc<MeasurementReader>,
}

impl Geometry for Measuring {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let body = self.body.build(env, ctx)?;
        let measurements = ctx.measure(&body.node)?;
        (self.reader)(self.body.clone(), &measurements).build(env, ctx)
    }
}

/// Body built with some environment settings replaced
#[derive(Clone)]
pub struct WithEnvironment {
    pub body: GeometryRef,
    pub overrides: EnvironmentOverrides,
}

impl Geometry for WithEnvironment {
    fn build(&self, env: &Environment, ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        self.body.build(&env.applying(&self.overrides), ctx)
    }
}
