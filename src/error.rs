//! Error types shared by the CLI, the HTTP client and the dashboard pages.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Backend
    // ─────────────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("Unexpected response from {endpoint}: {message}")]
    Shape { endpoint: String, message: String },

    #[error("{0}")]
    Backend(String),

    // ─────────────────────────────────────────────────────────────
    // Local sources
    // ─────────────────────────────────────────────────────────────
    #[error("Unable to get location: {0}")]
    Location(#[from] crate::location::LocationError),

    #[error("Could not load image {path}: {reason}")]
    Image { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Infrastructure
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preferences error: {0}")]
    Preferences(#[from] rusqlite::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl Error {
    pub fn shape(endpoint: &str, message: impl Into<String>) -> Self {
        Error::Shape {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// True for failures where the backend could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_matches_banner_text() {
        let err = Error::Status { status: 503 };
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[test]
    fn only_network_errors_are_connectivity() {
        assert!(Error::Network("refused".into()).is_connectivity());
        assert!(!Error::Status { status: 500 }.is_connectivity());
        assert!(!Error::shape("/api/bots", "bad").is_connectivity());
    }
}
