// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use crate::expr::{Dimension, OperationKey};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or realizing geometry.
///
/// Clonable so that one failed in-flight computation can hand the same error
/// to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// The evaluation run was cancelled
    #[error("evaluation cancelled")]
    Cancelled,

    /// A raw node reached the context without a registered thunk
    #[error("no operation registered for key {0}")]
    UnregisteredOperation(OperationKey),

    /// An operation received geometry of the wrong dimensionality
    #[error("{operation} expects {expected} input, got {actual}")]
    DimensionMismatch {
        operation: &'static str,
        expected: Dimension,
        actual: Dimension,
    },

    /// The geometry kernel rejected an operation
    #[error("kernel failure in {operation}: {message}")]
    Kernel {
        operation: &'static str,
        message: String,
    },

    /// A registered operation thunk failed
    #[error("operation failed: {0}")]
    Operation(String),

    /// External geometry could not be imported during build
    #[error("import failed: {0}")]
    Import(String),
}

impl EvalError {
    pub fn kernel(operation: &'static str, message: impl Into<String>) -> Self {
        EvalError::Kernel {
            operation,
            message: message.into(),
        }
    }
}

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while exporting evaluated geometry
#[derive(Debug, Error)]
pub enum ExportError {
    /// The target format cannot express the requested feature
    #[error("{format} does not support {feature}")]
    UnsupportedFeature {
        format: &'static str,
        feature: String,
    },

    /// The target format cannot hold geometry of this dimensionality
    #[error("{format} cannot hold {dimension} geometry")]
    UnsupportedDimension {
        format: &'static str,
        dimension: Dimension,
    },

    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Errors raised while reading external geometry files
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {format} file {path}: {message}")]
    Malformed {
        format: &'static str,
        path: PathBuf,
        message: String,
    },
}

impl From<ImportError> for EvalError {
    fn from(error: ImportError) -> Self {
        EvalError::Import(error.to_string())
    }
}
