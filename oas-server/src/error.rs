//! Error types for oas-server
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use crate::backend::BackendError;
use thiserror::Error;

/// Main error type for oas-server
#[derive(Error, Debug)]
pub enum Error {
    /// The backend rejected a call made on behalf of a source
    #[error("Backend error for sound source {handle}: {source}")]
    Backend {
        handle: u32,
        #[source]
        source: BackendError,
    },

    /// Operation attempted on a source that was never valid or was deleted
    #[error("Invalid sound source: {0}")]
    InvalidSource(u32),

    /// Parameter rejected before reaching the backend
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No source registered under the handle
    #[error("Sound source not found: {0}")]
    NotFound(u32),

    /// Errors surfaced from oas-common
    #[error(transparent)]
    Common(#[from] oas_common::Error),
}

/// Convenience Result type using oas-server Error
pub type Result<T> = std::result::Result<T, Error>;
