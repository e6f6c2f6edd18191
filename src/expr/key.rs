// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Operation keys identify opaque, closure-driven operations

use super::{Node, Real};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One parameter of an [`OperationKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Real(Real),
    Text(String),
    List(Vec<ParamValue>),
    Node(Arc<Node>),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Real(Real(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Arc<Node>> for ParamValue {
    fn from(value: Arc<Node>) -> Self {
        ParamValue::Node(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Real(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{:?}", v),
            ParamValue::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            ParamValue::Node(node) => write!(f, "<node {}>", &node.fingerprint()[..12]),
        }
    }
}

/// Cache identity of an opaque operation: a name plus an ordered parameter list.
///
/// Whoever builds a key promises that equal keys always denote equal
/// geometry. Nothing checks this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationKey {
    pub name: String,
    pub params: Vec<ParamValue>,
}

impl OperationKey {
    pub fn new(name: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Append one more parameter
    pub fn with_param(mut self, value: impl Into<ParamValue>) -> Self {
        self.params.push(value.into());
        self
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_compare_by_name_and_params() {
        let a = OperationKey::new("warp", vec![1.5.into(), "x".into()]);
        let b = OperationKey::new("warp", vec![1.5.into(), "x".into()]);
        let c = OperationKey::new("warp", vec!["x".into(), 1.5.into()]);
        let d = OperationKey::new("bend", vec![1.5.into(), "x".into()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_display() {
        let key = OperationKey::new("twist", vec![]).with_param(3_i64).with_param(true);
        assert_eq!(key.to_string(), "twist(3, true)");
    }
}
