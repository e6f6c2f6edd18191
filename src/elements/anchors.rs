// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Anchors: captured coordinate frames that other geometry can align to

use super::{Identity, ResultElement};
use crate::build::BuildResult;
use crate::expr::AffineTransform;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Anchor(Identity);

impl Anchor {
    pub fn named(name: impl Into<String>) -> Self {
        Anchor(Identity::Named(name.into()))
    }

    /// Anchor no other anchor compares equal to
    pub fn new() -> Self {
        Anchor(Identity::unique())
    }

    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor {}", self.0)
    }
}

/// Frame of an anchor in global coordinates
#[derive(Debug, Clone)]
pub struct AnchorFrame {
    pub transform: AffineTransform,
    /// Geometry the anchor was defined on
    pub origin: BuildResult,
}

impl AnchorFrame {
    fn same_as(&self, other: &AnchorFrame) -> bool {
        self.transform == other.transform && self.origin.same_geometry(&other.origin)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    anchors: BTreeMap<Anchor, AnchorFrame>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame. Redefining an anchor elsewhere keeps the later frame.
    pub fn insert(&mut self, anchor: Anchor, frame: AnchorFrame) {
        if let Some(existing) = self.anchors.get(&anchor) {
            if !existing.same_as(&frame) {
                warn!(anchor = %anchor, "anchor defined more than once, keeping the later definition");
            }
        }
        self.anchors.insert(anchor, frame);
    }

    pub fn get(&self, anchor: &Anchor) -> Option<&AnchorFrame> {
        self.anchors.get(anchor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Anchor, &AnchorFrame)> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl ResultElement for AnchorRegistry {
    fn combine(elements: Vec<Self>) -> Self {
        let mut registry = AnchorRegistry::new();
        for element in elements {
            for (anchor, frame) in element.anchors {
                registry.insert(anchor, frame);
            }
        }
        registry
    }
}
