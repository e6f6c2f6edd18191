// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON dumps of build results for debugging and cross-process inspection

use crate::build::BuildResult;
use crate::elements::{PartCatalog, PartIdentity};
use crate::error::ExportError;
use crate::expr::Node;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Serializable view of a build result: its node, the node's fingerprint
/// and the identities of its parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDump {
    pub fingerprint: String,
    pub node: Arc<Node>,
    pub parts: Vec<PartIdentity>,
}

impl ResultDump {
    pub fn new(result: &BuildResult) -> Self {
        Self {
            fingerprint: result.node.fingerprint(),
            node: result.node.clone(),
            parts: result.element::<PartCatalog>().identities().cloned().collect(),
        }
    }
}

/// Pretty JSON of a build result
pub fn dump_result(result: &BuildResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&ResultDump::new(result))?)
}
