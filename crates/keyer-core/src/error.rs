//! Error types for keyer.

use thiserror::Error;

/// Result type alias using keyer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for keyer.
#[derive(Error, Debug)]
pub enum Error {
    // Playback errors
    #[error("a playback session is already running")]
    AlreadyRunning,

    #[error("playback rate must be positive and finite, got {0}")]
    InvalidRate(f64),

    #[error("scheduler channel closed")]
    ChannelClosed,

    // Generic errors
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // Audio errors
    #[error("audio output unavailable: {0}")]
    AudioUnavailable(String),

    #[error("audio output error: {0}")]
    AudioOutput(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if the recommended recovery is to try the operation
    /// again (e.g. re-attempt audio acquisition on the next play request).
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::AudioUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(Error::AudioUnavailable("no device".into()).is_retryable());
        assert!(!Error::AlreadyRunning.is_retryable());
        assert!(!Error::InvalidRate(0.0).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidRate(-2.0);
        assert_eq!(
            err.to_string(),
            "playback rate must be positive and finite, got -2"
        );
    }
}
