//! Domain-level errors
//!
//! `GatewayError` is what the backend hands back; `CmsError` is what an
//! operation reports after converting it into a user-visible message.

use thiserror::Error;

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type for resource manager operations
pub type CmsResult<T> = Result<T, CmsError>;

/// Failure reported by the remote collection/object store.
///
/// Every variant carries a human-readable message; callers only ever
/// present it, they never branch on backend codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

impl GatewayError {
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Rejected(msg)
            | GatewayError::NotFound(msg)
            | GatewayError::Transport(msg)
            | GatewayError::Decode(msg) => msg,
        }
    }
}

/// Operation failures, each already phrased for the notice banner
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsError {
    /// Required field missing or a field over its limit; never reaches the backend
    #[error("{0}")]
    Validation(String),
    /// File too large, or the object store rejected it
    #[error("{0}")]
    Upload(String),
    /// Insert, update or delete rejected by the backend
    #[error("{0}")]
    Mutation(String),
    /// Collection fetch failed
    #[error("{0}")]
    Load(String),
}
