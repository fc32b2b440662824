//! Error types for the asset capability service
//!
//! Each module owns a narrow error enum; `CapsError` folds them together and
//! knows which HTTP status every failure class maps to.

use axum::http::StatusCode;
use thiserror::Error;

use crate::asset::AssetError;
use crate::caps::{LlsdError, RegistryError};
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::transcode::TranscodeError;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, CapsError>;

/// Main error type for the asset capability service
#[derive(Error, Debug)]
pub enum CapsError {
    #[error("Asset not found: {id}")]
    NotFound { id: String },

    #[error("Bad request: {reason}")]
    BadRequest { reason: String },

    #[error("Requested range not satisfiable for {length} bytes")]
    RangeUnsatisfiable { length: usize },

    #[error("Asset service unavailable")]
    UpstreamUnavailable,

    #[error("Asset store error: {0}")]
    Asset(#[from] AssetError),

    #[error("Transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("LLSD encoding error: {0}")]
    Llsd(#[from] LlsdError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Server bind failed: {reason}")]
    BindFailed { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CapsError {
    /// HTTP status a viewer sees for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            CapsError::NotFound { .. } | CapsError::UpstreamUnavailable => StatusCode::NOT_FOUND,
            CapsError::Registry(RegistryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            CapsError::Asset(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            CapsError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            CapsError::RangeUnsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should result in a 404 Not Found response
    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }
}
