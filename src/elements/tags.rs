// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tags: snapshots of geometry that can be referenced elsewhere in a tree

use super::{Identity, ResultElement};
use crate::build::BuildResult;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Identity);

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Tag(Identity::Named(name.into()))
    }

    pub fn new() -> Self {
        Tag(Identity::unique())
    }

    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag {}", self.0)
    }
}

/// Tagged geometry, stored in global coordinates
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: BTreeMap<Tag, BuildResult>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag, result: BuildResult) {
        if let Some(existing) = self.tags.get(&tag) {
            if !existing.same_geometry(&result) {
                warn!(tag = %tag, "tag captured more than once, keeping the later capture");
            }
        }
        self.tags.insert(tag, result);
    }

    pub fn get(&self, tag: &Tag) -> Option<&BuildResult> {
        self.tags.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, &BuildResult)> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl ResultElement for TagRegistry {
    fn combine(elements: Vec<Self>) -> Self {
        let mut registry = TagRegistry::new();
        for element in elements {
            for (tag, result) in element.tags {
                registry.insert(tag, result);
            }
        }
        registry
    }
}
