// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flattening a build result into separately exported geometry

use super::EvaluationContext;
use crate::build::BuildResult;
use crate::elements::{IsolationMarker, PartCatalog, PartIdentity};
use crate::error::EvalResult;
use crate::expr::Node;
use crate::kernel::Concrete;
use std::sync::Arc;
use tracing::debug;

/// One realized piece of an export: the main body or a part
#[derive(Debug, Clone)]
pub struct ExportTarget {
    /// `None` for the main body
    pub identity: Option<PartIdentity>,
    pub node: Arc<Node>,
    pub concrete: Arc<Concrete>,
}

impl ExportTarget {
    pub fn is_main(&self) -> bool {
        self.identity.is_none()
    }
}

impl EvaluationContext {
    /// Main body followed by every part in identity order, realized
    /// concurrently. With an isolated subtree, only it and its parts export.
    pub fn export_parts(&self, result: &BuildResult) -> EvalResult<Vec<ExportTarget>> {
        let source = match result.elements.get_ref::<IsolationMarker>().and_then(IsolationMarker::isolated) {
            Some(isolated) => {
                debug!("exporting isolated subtree only");
                isolated
            }
            None => result,
        };

        let catalog = source.element::<PartCatalog>();
        let mut identities = vec![None];
        let mut nodes = vec![source.node.clone()];
        for (identity, part) in catalog.parts() {
            identities.push(Some(identity.clone()));
            nodes.push(part.node.clone());
        }

        let concretes = self.realize_all(&nodes)?;
        Ok(identities
            .into_iter()
            .zip(nodes)
            .zip(concretes)
            .map(|((identity, node), concrete)| ExportTarget {
                identity,
                node,
                concrete,
            })
            .collect())
    }
}
