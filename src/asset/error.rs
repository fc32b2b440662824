//! Asset store error types

use thiserror::Error;

/// Asset store error type
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {id}")]
    NotFound { id: String },

    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl AssetError {
    /// Check if this error should result in a 404 Not Found response
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound { .. })
    }
}
