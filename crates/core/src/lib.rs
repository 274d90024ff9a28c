//! Shared primitives for all Rust crates in the credential broker.

#![forbid(unsafe_code)]

/// Remote identity provider failure taxonomy.
pub mod provider;

use thiserror::Error;

pub use provider::ProviderError;

/// Result type used across broker crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A remote identity provider call failed.
    #[error("upstream error ({context}): {source}")]
    Upstream {
        /// Diagnostic context, usually the role the call was made for.
        context: String,
        /// The provider failure, unchanged.
        #[source]
        source: ProviderError,
    },

    /// Lease metadata handed back by the host is missing an expected field.
    #[error("internal data error: {0}")]
    InternalData(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a provider failure with diagnostic context.
    #[must_use]
    pub fn upstream(context: impl Into<String>, source: ProviderError) -> Self {
        Self::Upstream {
            context: context.into(),
            source,
        }
    }

    /// Returns the provider failure when this is an upstream error.
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Upstream { source, .. } => Some(source),
            _ => None,
        }
    }
}
