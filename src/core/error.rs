//! Composition error taxonomy.
//!
//! Every error aborts composition immediately and carries its full context
//! (offending field, offending route, or the underlying build failure).
//! Nothing is locally recovered or retried: a valid graph either exists or
//! it does not, and no partial graph is ever returned.

use crate::core::types::HttpMethod;
use thiserror::Error;

/// Opaque failure from the external build collaborator, surfaced unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuildError {
    pub message: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// All the ways stack composition can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A declared input value is malformed.
    #[error("invalid {field}: {message}")]
    Configuration { field: &'static str, message: String },

    /// A resource reference was used before the resource was constructed.
    #[error("compute resource '{actor}' referenced before construction")]
    DependencyOrder { actor: String },

    /// Two route declarations collide on the same (path, method) pair.
    #[error("route conflict on {path}: method {method} already bound")]
    RouteConflict { path: String, method: HttpMethod },

    /// The build collaborator failed; its error passes through opaque.
    #[error("build failed: {0}")]
    Build(#[from] BuildError),
}

impl ComposeError {
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            message: message.into(),
        }
    }
}

/// Convenience alias for composition results.
pub type Result<T> = std::result::Result<T, ComposeError>;
