//! Error types for episode repositories

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Failed to read episode data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid episode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid episode record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
}

impl RepositoryError {
    pub fn invalid_record(id: &str, reason: impl Into<String>) -> Self {
        RepositoryError::InvalidRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;
