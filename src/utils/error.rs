//! Error handling module
//!
//! Defines the adapter error taxonomy shared by every backend

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Adapter error types
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Bad or missing model name or credentials
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Conversation creation failed
    #[error("Control plane error: {0}")]
    ControlPlane(String),

    /// Connection could not be opened, written, or closed early
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed frame or explicit error status from the remote side
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        /// Raw frame text for diagnostics
        payload: Option<String>,
    },
}

/// Serializable error report handed to the harness
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
    /// Raw payload (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl AdapterError {
    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AdapterError::Configuration(_) => "configuration_error",
            AdapterError::ControlPlane(_) => "control_plane_error",
            AdapterError::Transport(_) => "transport_error",
            AdapterError::Protocol { .. } => "protocol_error",
        }
    }

    /// Whether the error is raised at construction and can never be recovered
    pub fn is_fatal(&self) -> bool {
        matches!(self, AdapterError::Configuration(_))
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        // Configuration messages may echo credential values
        !matches!(self, AdapterError::Configuration(_))
    }

    /// Raw frame attached to a protocol error
    pub fn payload(&self) -> Option<&str> {
        match self {
            AdapterError::Protocol { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            error_type: self.error_type().to_string(),
            message: self.to_string(),
            payload: self.payload().map(str::to_string),
        }
    }
}

/// Result type alias
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create configuration error
    pub fn configuration_error(message: impl Into<String>) -> AdapterError {
        AdapterError::Configuration(message.into())
    }

    /// Create control plane error
    pub fn control_plane_error(message: impl Into<String>) -> AdapterError {
        AdapterError::ControlPlane(message.into())
    }

    /// Create transport error
    pub fn transport_error(message: impl Into<String>) -> AdapterError {
        AdapterError::Transport(message.into())
    }

    /// Create protocol error carrying the offending frame
    pub fn protocol_error(message: impl Into<String>, payload: impl Into<String>) -> AdapterError {
        AdapterError::Protocol {
            message: message.into(),
            payload: Some(payload.into()),
        }
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add configuration error context
    fn configuration_context(self, message: &str) -> AdapterResult<T>;

    /// Add control plane error context
    fn control_plane_context(self, message: &str) -> AdapterResult<T>;

    /// Add transport error context
    fn transport_context(self, message: &str) -> AdapterResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn configuration_context(self, message: &str) -> AdapterResult<T> {
        self.map_err(|e| AdapterError::Configuration(format!("{}: {}", message, e)))
    }

    fn control_plane_context(self, message: &str) -> AdapterResult<T> {
        self.map_err(|e| AdapterError::ControlPlane(format!("{}: {}", message, e)))
    }

    fn transport_context(self, message: &str) -> AdapterResult<T> {
        self.map_err(|e| AdapterError::Transport(format!("{}: {}", message, e)))
    }
}
