// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Separately exported parts

use super::{next_token, ResultElement};
use crate::build::BuildResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role of a part in the exported model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSemantic {
    /// Printable or machinable material
    Solid,
    /// Shown in previews only
    Visual,
    /// Surroundings the model is designed against
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartIdentity {
    Named { name: String, semantic: PartSemantic },
    /// Anonymous part unique to one `in_part` application
    Instance(u64),
}

impl PartIdentity {
    pub fn named(name: impl Into<String>, semantic: PartSemantic) -> Self {
        PartIdentity::Named {
            name: name.into(),
            semantic,
        }
    }

    pub fn solid(name: impl Into<String>) -> Self {
        Self::named(name, PartSemantic::Solid)
    }

    pub fn unique() -> Self {
        PartIdentity::Instance(next_token())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PartIdentity::Named { name, .. } => Some(name),
            PartIdentity::Instance(_) => None,
        }
    }

    pub fn semantic(&self) -> PartSemantic {
        match self {
            PartIdentity::Named { semantic, .. } => *semantic,
            PartIdentity::Instance(_) => PartSemantic::Solid,
        }
    }
}

impl fmt::Display for PartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartIdentity::Named { name, semantic } => write!(f, "{} ({:?})", name, semantic),
            PartIdentity::Instance(token) => write!(f, "part #{}", token),
        }
    }
}

/// Parts keyed by identity; colliding entries merge by union
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: BTreeMap<PartIdentity, BuildResult>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: PartIdentity, result: BuildResult) {
        match self.parts.get_mut(&identity) {
            Some(existing) => *existing = existing.merged(&result),
            None => {
                self.parts.insert(identity, result);
            }
        }
    }

    pub fn get(&self, identity: &PartIdentity) -> Option<&BuildResult> {
        self.parts.get(identity)
    }

    /// Parts in identity order
    pub fn parts(&self) -> impl Iterator<Item = (&PartIdentity, &BuildResult)> {
        self.parts.iter()
    }

    pub fn identities(&self) -> impl Iterator<Item = &PartIdentity> {
        self.parts.keys()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl ResultElement for PartCatalog {
    fn combine(elements: Vec<Self>) -> Self {
        let mut catalog = PartCatalog::new();
        for element in elements {
            for (identity, result) in element.parts {
                catalog.insert(identity, result);
            }
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{reals, AffineTransform, Node, NodeKind, Shape};

    fn cube() -> BuildResult {
        BuildResult::new(Node::shape(Shape::Box {
            size: reals([1.0, 1.0, 1.0]),
        }))
    }

    #[test]
    fn test_same_identity_merges_by_union() {
        let lid = PartIdentity::solid("lid");
        let mut a = PartCatalog::new();
        a.insert(lid.clone(), cube());
        let mut b = PartCatalog::new();
        b.insert(
            lid.clone(),
            cube().placed(&AffineTransform::translation(2.0, 0.0, 0.0)),
        );

        let merged = PartCatalog::combine(vec![a, b]);
        assert_eq!(merged.len(), 1);
        let part = merged.get(&lid).unwrap();
        assert!(matches!(part.node.kind, NodeKind::Boolean { .. }));
    }

    #[test]
    fn test_identical_contributions_do_not_double() {
        let lid = PartIdentity::solid("lid");
        let mut a = PartCatalog::new();
        a.insert(lid.clone(), cube());
        let merged = PartCatalog::combine(vec![a.clone(), a]);
        assert!(matches!(merged.get(&lid).unwrap().node.kind, NodeKind::Shape(_)));
    }

    #[test]
    fn test_semantics_are_distinct_identities() {
        let mut catalog = PartCatalog::new();
        catalog.insert(PartIdentity::named("body", PartSemantic::Solid), cube());
        catalog.insert(PartIdentity::named("body", PartSemantic::Visual), cube());
        catalog.insert(PartIdentity::unique(), cube());
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.identities().filter(|id| id.name() == Some("body")).count(), 2);
    }
}
