use thiserror::Error;

/// Failures reported by a media backend or handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Cannot load media {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("Media command '{0}' failed: {1}")]
    Command(String, String),
    #[error("Media handle is closed")]
    Closed,
}

impl MediaError {
    pub fn load(url: &str, reason: impl Into<String>) -> Self {
        MediaError::Load {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn command(command: &str, reason: impl Into<String>) -> Self {
        MediaError::Command(command.to_string(), reason.into())
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Media Error: {0}")]
    Media(#[from] MediaError),
}

impl TransportError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        TransportError::InvalidArgument(message.into())
    }
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
