// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Result elements: typed metadata carried alongside a node
//!
//! A [`BuildResult`](crate::build::BuildResult) holds one value per element
//! type. Whenever results are combined, each type merges its own values
//! through [`ResultElement::combine`].

mod anchors;
mod isolation;
mod parts;
mod tags;

pub use anchors::{Anchor, AnchorFrame, AnchorRegistry};
pub use isolation::IsolationMarker;
pub use parts::{PartCatalog, PartIdentity, PartSemantic};
pub use tags::{Tag, TagRegistry};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metadata that can be merged across combined build results.
///
/// `Default` is the identity: combining a value with a default value must
/// yield the value.
pub trait ResultElement: Clone + Default + Send + Sync + 'static {
    /// Merge values in tree order
    fn combine(elements: Vec<Self>) -> Self;
}

type ErasedValue = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct ErasedElement {
    value: ErasedValue,
    combine: fn(Vec<ErasedValue>) -> ErasedValue,
    type_name: &'static str,
}

impl ErasedElement {
    fn new<E: ResultElement>(element: E) -> Self {
        Self {
            value: Arc::new(element),
            combine: combine_erased::<E>,
            type_name: std::any::type_name::<E>(),
        }
    }
}

fn combine_erased<E: ResultElement>(values: Vec<ErasedValue>) -> ErasedValue {
    let elements = values
        .iter()
        .filter_map(|value| value.downcast_ref::<E>())
        .cloned()
        .collect();
    Arc::new(E::combine(elements))
}

/// Type-indexed map of result elements
#[derive(Clone, Default)]
pub struct ResultElements {
    entries: AHashMap<TypeId, ErasedElement>,
}

impl ResultElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored element, or its default when absent
    pub fn get<E: ResultElement>(&self) -> E {
        self.get_ref::<E>().cloned().unwrap_or_default()
    }

    pub fn get_ref<E: ResultElement>(&self) -> Option<&E> {
        self.entries
            .get(&TypeId::of::<E>())
            .and_then(|entry| entry.value.downcast_ref::<E>())
    }

    pub fn contains<E: ResultElement>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<E>())
    }

    pub fn set<E: ResultElement>(&mut self, element: E) {
        self.entries
            .insert(TypeId::of::<E>(), ErasedElement::new(element));
    }

    pub fn with<E: ResultElement>(mut self, element: E) -> Self {
        self.set(element);
        self
    }

    /// Edit the stored element in place, starting from its default
    pub fn modify<E: ResultElement>(&mut self, edit: impl FnOnce(&mut E)) {
        let mut element = self.get::<E>();
        edit(&mut element);
        self.set(element);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge a list of maps type by type, preserving list order
    pub fn combine(list: Vec<ResultElements>) -> ResultElements {
        let mut grouped: AHashMap<TypeId, (ErasedElement, Vec<ErasedValue>)> = AHashMap::new();
        let mut order: Vec<TypeId> = Vec::new();
        for elements in list {
            for (type_id, entry) in elements.entries {
                grouped
                    .entry(type_id)
                    .or_insert_with(|| {
                        order.push(type_id);
                        (entry.clone(), Vec::new())
                    })
                    .1
                    .push(entry.value);
            }
        }

        let mut entries = AHashMap::with_capacity(grouped.len());
        for type_id in order {
            let Some((mut prototype, values)) = grouped.remove(&type_id) else {
                continue;
            };
            if values.len() > 1 {
                prototype.value = (prototype.combine)(values);
            }
            entries.insert(type_id, prototype);
        }
        ResultElements { entries }
    }
}

impl fmt::Debug for ResultElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

/// Identity shared by anchors, tags and instance parts: a user-chosen name or
/// a token unique within the process
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identity {
    Named(String),
    Token(u64),
}

impl Identity {
    pub fn unique() -> Self {
        Identity::Token(next_token())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Named(name) => write!(f, "{}", name),
            Identity::Token(token) => write!(f, "#{}", token),
        }
    }
}

pub(crate) fn next_token() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Notes(Vec<&'static str>);

    impl ResultElement for Notes {
        fn combine(elements: Vec<Self>) -> Self {
            Notes(elements.into_iter().flat_map(|n| n.0).collect())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Count(u32);

    impl ResultElement for Count {
        fn combine(elements: Vec<Self>) -> Self {
            Count(elements.iter().map(|c| c.0).sum())
        }
    }

    #[test]
    fn test_missing_element_reads_as_default() {
        let elements = ResultElements::new();
        assert_eq!(elements.get::<Count>(), Count(0));
        assert!(!elements.contains::<Count>());
    }

    #[test]
    fn test_combine_per_type_in_order() {
        let a = ResultElements::new().with(Notes(vec!["a"])).with(Count(1));
        let b = ResultElements::new().with(Notes(vec!["b"]));
        let c = ResultElements::new().with(Count(2));

        let combined = ResultElements::combine(vec![a, b, c]);
        assert_eq!(combined.get::<Notes>(), Notes(vec!["a", "b"]));
        assert_eq!(combined.get::<Count>(), Count(3));
        assert_eq!(combined.len(), 2);
    }

    #[test]
    fn test_modify_starts_from_default() {
        let mut elements = ResultElements::new();
        elements.modify::<Count>(|c| c.0 += 5);
        elements.modify::<Count>(|c| c.0 += 1);
        assert_eq!(elements.get_ref::<Count>(), Some(&Count(6)));
    }

    #[test]
    fn test_unique_identities_differ() {
        assert_ne!(Identity::unique(), Identity::unique());
        assert_eq!(Identity::Named("lid".into()).to_string(), "lid");
    }
}
