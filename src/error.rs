//! Error types for subloop
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//!
//! Load-time failures (subtitle file, audio decode, output device) are fatal and
//! abort startup before the control loop runs. Export and clipboard failures are
//! recovered in the command handler and surfaced as a transient notice.

use thiserror::Error;

/// Main error type for subloop
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Subtitle file parsing errors
    #[error("Subtitle error: {0}")]
    Subtitle(String),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Segment export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Clipboard access errors
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Terminal UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Convenience Result type using subloop Error
pub type Result<T> = std::result::Result<T, Error>;
