// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Node encoding for dumps and cross-process keys

use super::Node;
use sha2::{Digest, Sha256};

impl Node {
    /// Compact JSON encoding
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(source: &str) -> serde_json::Result<Node> {
        serde_json::from_str(source)
    }

    /// Stable hex digest of the node's structure.
    ///
    /// Unlike `Hash`, the digest does not depend on the process or hasher
    /// seed. Raw operations contribute only their key, matching node
    /// equality.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        self.feed_digest(&mut hasher);
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect()
    }

    fn feed_digest(&self, hasher: &mut Sha256) {
        use super::NodeKind;

        match &self.kind {
            NodeKind::Raw(raw) => {
                hasher.update(b"raw:");
                hasher.update(format!("{:?}", self.dimension).as_bytes());
                let key = serde_json::to_vec(&raw.key).unwrap_or_default();
                hasher.update(&key);
            }
            NodeKind::Boolean { children, op } => {
                hasher.update(format!("boolean:{:?}:{:?}:{}", self.dimension, op, children.len()));
                for child in children {
                    child.feed_digest(hasher);
                }
            }
            kind => {
                // Single-child and leaf nodes: encode the node without its
                // children, then recurse so raw descendants stay key-only.
                let children = kind.children();
                if children.is_empty() {
                    let encoded = serde_json::to_vec(self).unwrap_or_default();
                    hasher.update(&encoded);
                } else {
                    hasher.update(format!("{}:{:?}:", kind.name(), self.dimension));
                    let params = serde_json::to_value(kind)
                        .map(strip_children)
                        .unwrap_or_default();
                    hasher.update(params.to_string().as_bytes());
                    for child in children {
                        child.feed_digest(hasher);
                    }
                }
            }
        }
    }
}

fn strip_children(mut value: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(outer) = &mut value {
        for inner in outer.values_mut() {
            if let serde_json::Value::Object(fields) = inner {
                fields.remove("child");
            }
        }
    }
    value
}
