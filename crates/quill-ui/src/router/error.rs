//! Router errors

use thiserror::Error;

/// Errors from mounting a router
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A router needs at least one route to fall back to
    #[error("Cannot mount a router without routes")]
    NoRoutes,
}

/// Result type for router operations
pub type RouterResult<T> = std::result::Result<T, RouterError>;
