//! Error types for chatai
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for chatai operations
///
/// Covers configuration loading, the chat stream lifecycle (request,
/// transport, decode), form validation, and the backend auth calls.
#[derive(Error, Debug)]
pub enum ChataiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered with a non-success status before streaming began
    #[error("Request failed with HTTP {status}: {body}")]
    Request {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Failure while pulling chunks from an open response stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response bytes could not be decoded as text
    #[error("Decode error: {0}")]
    Decode(String),

    /// A login or registration form failed local validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend rejected a login or registration
    #[error("Authentication error: {0}")]
    Auth(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for chatai operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
