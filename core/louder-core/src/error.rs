//! Error types for louder-core operations.
//!
//! These errors stay inside the crate's plumbing (config loading, command
//! execution, actuator spawn). Feedback entry points fold them into `bool`
//! results so a failed notification never reaches the agent host.

use std::path::PathBuf;

/// All errors that can occur while preparing or emitting feedback.
#[derive(Debug, thiserror::Error)]
pub enum LouderError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Action Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Command execution failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    #[error("Platform not supported for this operation: {0}")]
    UnsupportedPlatform(String),

    #[error("Haptic engine executable not found (searched {searched} locations)")]
    ActuatorNotFound { searched: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LouderError>;

impl LouderError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LouderError::Io {
            context: context.into(),
            source,
        }
    }
}
