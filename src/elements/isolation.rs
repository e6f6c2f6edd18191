// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Isolation ("only"): export a single subtree and ignore everything else

use super::{next_token, ResultElement};
use crate::build::BuildResult;

/// Marks the one subtree of a model that should be exported on its own.
///
/// At most one marker may survive combination. Two distinct markers in the
/// same tree are a construction error and panic.
#[derive(Debug, Clone, Default)]
pub struct IsolationMarker {
    isolated: Option<(u64, BuildResult)>,
}

impl IsolationMarker {
    /// Marker for `result`, which must already be in global coordinates
    pub fn new(result: BuildResult) -> Self {
        Self::from_source(next_token(), result)
    }

    /// Markers from the same source never conflict, so rebuilding one
    /// geometry twice yields one marker
    pub(crate) fn from_source(source: u64, result: BuildResult) -> Self {
        Self {
            isolated: Some((source, result)),
        }
    }

    pub fn isolated(&self) -> Option<&BuildResult> {
        self.isolated.as_ref().map(|(_, result)| result)
    }

    pub fn is_empty(&self) -> bool {
        self.isolated.is_none()
    }
}

impl ResultElement for IsolationMarker {
    fn combine(elements: Vec<Self>) -> Self {
        let mut survivor: Option<(u64, BuildResult)> = None;
        for (token, result) in elements.into_iter().filter_map(|m| m.isolated) {
            match &survivor {
                Some((kept, _)) if *kept != token => {
                    panic!("only one subtree of a model can be isolated, found two `only` markers")
                }
                Some(_) => {}
                None => survivor = Some((token, result)),
            }
        }
        Self { isolated: survivor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Dimension, Node};

    fn marker() -> IsolationMarker {
        IsolationMarker::new(BuildResult::new(Node::empty(Dimension::Two)))
    }

    #[test]
    fn test_single_marker_survives_empty_ones() {
        let combined = IsolationMarker::combine(vec![
            IsolationMarker::default(),
            marker(),
            IsolationMarker::default(),
        ]);
        assert!(!combined.is_empty());
    }

    #[test]
    fn test_same_marker_twice_is_not_a_conflict() {
        let only = marker();
        let combined = IsolationMarker::combine(vec![only.clone(), only]);
        assert!(combined.isolated().is_some());
    }

    #[test]
    #[should_panic(expected = "only one subtree")]
    fn test_two_markers_panic() {
        IsolationMarker::combine(vec![marker(), marker()]);
    }
}
