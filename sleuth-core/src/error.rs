//! Error types for the Sleuth core library.
//!
//! Uses `thiserror` for public API error types. Every failure propagates to
//! the caller unchanged: there is no retry and no partial-result fallback.

use std::path::PathBuf;

/// Top-level error type for a research run.
#[derive(Debug, thiserror::Error)]
pub enum SleuthError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Research topic must not be blank")]
    EmptyTopic,
}

/// Errors from loading secrets and settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Malformed line {line} in {source_name}: {reason}")]
    MalformedLine {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Missing required key: {key}")]
    MissingKey { key: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Errors raised by an external collaborator (LLM, search, memory, ...).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{service} request failed: {message}")]
    ApiRequest { service: String, message: String },

    #[error("{service} response parse error: {message}")]
    ResponseParse { service: String, message: String },

    #[error("Authentication failed for {service}")]
    AuthFailed { service: String },

    #[error("Rate limited by {service}")]
    RateLimited { service: String },

    #[error("Could not reach {service}: {message}")]
    Connection { service: String, message: String },

    #[error("Memory store error: {message}")]
    Memory { message: String },
}

impl CollaboratorError {
    /// Map a non-success HTTP status to the matching variant.
    pub fn from_status(service: &str, status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => CollaboratorError::AuthFailed {
                service: service.to_string(),
            },
            429 => CollaboratorError::RateLimited {
                service: service.to_string(),
            },
            _ => CollaboratorError::ApiRequest {
                service: service.to_string(),
                message: format!("HTTP {}: {}", status, body),
            },
        }
    }

    /// Wrap a transport-level `reqwest` failure.
    pub fn transport(service: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CollaboratorError::Connection {
                service: service.to_string(),
                message: err.to_string(),
            }
        } else {
            CollaboratorError::ApiRequest {
                service: service.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors from document export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to render PDF: {message}")]
    Render { message: String },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results in the core library.
pub type Result<T> = std::result::Result<T, SleuthError>;
