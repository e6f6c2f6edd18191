// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Output of building a geometry

use crate::elements::{ResultElement, ResultElements};
use crate::expr::{AffineTransform, Dimension, Node};
use std::sync::Arc;

/// A resolved node together with the metadata collected while building it
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub node: Arc<Node>,
    pub elements: ResultElements,
}

impl BuildResult {
    pub fn new(node: impl Into<Arc<Node>>) -> Self {
        Self {
            node: node.into(),
            elements: ResultElements::new(),
        }
    }

    pub fn empty(dimension: Dimension) -> Self {
        Self::new(Node::empty(dimension))
    }

    pub fn with_elements(node: impl Into<Arc<Node>>, elements: ResultElements) -> Self {
        Self {
            node: node.into(),
            elements,
        }
    }

    /// `node` carrying the merged elements of `results`
    pub fn combining(node: impl Into<Arc<Node>>, results: Vec<BuildResult>) -> Self {
        let elements = ResultElements::combine(results.into_iter().map(|r| r.elements).collect());
        Self::with_elements(node, elements)
    }

    pub fn dimension(&self) -> Dimension {
        self.node.dimension
    }

    /// Same elements, different node
    pub fn replacing_node(self, node: impl Into<Arc<Node>>) -> Self {
        Self {
            node: node.into(),
            elements: self.elements,
        }
    }

    pub fn element<E: ResultElement>(&self) -> E {
        self.elements.get::<E>()
    }

    pub fn with_element<E: ResultElement>(mut self, element: E) -> Self {
        self.elements.set(element);
        self
    }

    pub fn modifying_element<E: ResultElement>(mut self, edit: impl FnOnce(&mut E)) -> Self {
        self.elements.modify(edit);
        self
    }

    /// Node moved by `transform`; elements are already global and stay put
    pub fn placed(self, transform: &AffineTransform) -> Self {
        let node = Node::transform(self.node.clone(), *transform);
        self.replacing_node(node)
    }

    pub fn same_geometry(&self, other: &BuildResult) -> bool {
        Arc::ptr_eq(&self.node, &other.node) || self.node == other.node
    }

    /// Union of both nodes with merged elements
    pub fn merged(&self, other: &BuildResult) -> BuildResult {
        if self.same_geometry(other) {
            return self.clone();
        }
        assert_eq!(
            self.dimension(),
            other.dimension(),
            "cannot merge {} and {} geometry into one part",
            self.dimension(),
            other.dimension()
        );
        BuildResult::combining(
            Node::union(self.dimension(), vec![self.node.clone(), other.node.clone()]),
            vec![self.clone(), other.clone()],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{PartCatalog, PartIdentity};
    use crate::expr::{reals, NodeKind, Shape};

    fn square() -> BuildResult {
        BuildResult::new(Node::shape(Shape::Rectangle {
            size: reals([1.0, 1.0]),
        }))
    }

    #[test]
    fn test_combining_merges_elements() {
        let a = square().modifying_element::<PartCatalog>(|c| c.insert(PartIdentity::solid("a"), square()));
        let b = square().modifying_element::<PartCatalog>(|c| c.insert(PartIdentity::solid("b"), square()));
        let combined = BuildResult::combining(Node::empty(Dimension::Two), vec![a, b]);
        assert_eq!(combined.element::<PartCatalog>().len(), 2);
        assert_eq!(combined.dimension(), Dimension::Two);
    }

    #[test]
    fn test_placed_wraps_node() {
        let placed = square().placed(&AffineTransform::translation(1.0, 0.0, 0.0));
        assert!(matches!(placed.node.kind, NodeKind::Transform { .. }));
        let unchanged = square().placed(&AffineTransform::identity());
        assert!(unchanged.same_geometry(&square()));
    }
}
