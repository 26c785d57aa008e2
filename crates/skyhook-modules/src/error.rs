// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module system

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for module system operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Boxed error type produced by loaders and engines
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared, cloneable wrapper around a loader or engine error.
///
/// Failed modules stay in the cache for the rest of the process, and every
/// later request for the same identifier re-raises the stored error. The
/// underlying cause therefore lives behind an `Arc` so the error can be
/// cloned out of the cache without losing the source chain.
#[derive(Debug, Clone)]
pub struct ErrorCause(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl ErrorCause {
    /// Wrap a boxed error in a shared cause
    pub fn new(err: BoxError) -> Self {
        Self(Arc::from(err))
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ErrorCause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Errors that can occur while resolving, loading, or evaluating a module
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// No loader is registered for the identifier's protocol
    #[error("unsupported protocol '{0}'")]
    UnsupportedProtocol(String),

    /// A bare identifier was requested but no fallback loader is configured
    #[error("no loader registered for bare module identifiers")]
    NoBareLoader,

    /// A protocol loader failed to produce source for the identifier
    #[error("failed to load module '{id}': {cause}")]
    Loader {
        /// Canonical identifier of the module
        id: String,
        /// Underlying loader error
        cause: ErrorCause,
    },

    /// The loaded source raised an error while being evaluated
    #[error("error evaluating module '{id}': {cause}")]
    Evaluation {
        /// Canonical identifier of the module
        id: String,
        /// Error raised by the module's own code
        cause: ErrorCause,
    },

    /// A load was abandoned (panicked) before the entry could settle
    #[error("module '{0}' did not finish loading")]
    Incomplete(String),
}

impl ModuleError {
    /// Create a loader failure for a canonical identifier
    pub fn loader(id: impl Into<String>, cause: BoxError) -> Self {
        Self::Loader {
            id: id.into(),
            cause: ErrorCause::new(cause),
        }
    }

    /// Create an evaluation failure for a canonical identifier
    pub fn evaluation(id: impl Into<String>, cause: BoxError) -> Self {
        Self::Evaluation {
            id: id.into(),
            cause: ErrorCause::new(cause),
        }
    }
}
