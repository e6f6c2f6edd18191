// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry read from external files

use super::{BuildResult, Geometry};
use crate::context::EvaluationContext;
use crate::environment::Environment;
use crate::error::{EvalError, EvalResult};
use crate::expr::{reals, Node, Shape};
use crate::io::read_stl;
use std::path::PathBuf;
use tracing::debug;

/// An STL file, read when built and resolved into a polyhedron
#[derive(Debug, Clone)]
pub struct StlImport {
    pub path: PathBuf,
}

impl StlImport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Geometry for StlImport {
    fn build(&self, _env: &Environment, _ctx: &EvaluationContext) -> EvalResult<BuildResult> {
        let mesh = read_stl(&self.path)?;
        debug!(path = ?self.path, triangles = mesh.triangle_count(), "imported STL");

        let faces = mesh
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.indices;
                match (u32::try_from(a), u32::try_from(b), u32::try_from(c)) {
                    (Ok(a), Ok(b), Ok(c)) => Ok([a, b, c]),
                    _ => Err(EvalError::Import(format!(
                        "{} has more vertices than a polyhedron can index",
                        self.path.display()
                    ))),
                }
            })
            .collect::<EvalResult<Vec<_>>>()?;

        Ok(BuildResult::new(Node::shape(Shape::Polyhedron {
            vertices: mesh.vertices.iter().map(|v| reals([v.x, v.y, v.z])).collect(),
            faces,
        })))
    }
}
