//! Error types for stockwatch
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for stockwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for stockwatch
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, timeout, or non-success status from the inventory API
    #[error("Network error: {0}")]
    Network(String),

    /// Inventory response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Availability log errors that must reach the caller
    #[error("Availability log error: {0}")]
    Log(String),

    /// Notification sink delivery failure
    #[error("Notification error ({sink}): {message}")]
    Notify {
        /// Sink name
        sink: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create an availability log error
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a notification error for a sink
    pub fn notify(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notify {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error came from fetching inventory (and so only fails one SKU)
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Parse(_))
    }

    /// Stable label for the error condition
    ///
    /// Used to group repeated failures, e.g. when throttling error notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::StateStore(_) => "state_store",
            Self::Log(_) => "log",
            Self::Notify { .. } => "notify",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}
