//! Error types for sqlcred-rs.
//!
//! This module defines domain-specific error types organized by functional area.
//! None of the messages produced here ever carry a password or a connection
//! descriptor.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type encompassing all possible errors.
#[derive(Error, Debug)]
pub enum SqlCredError {
    /// Missing or malformed configuration (files, environment variables, parameters)
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Interactive input was aborted or could not be read
    #[error(transparent)]
    Input(#[from] InputError),

    /// Connection establishment errors
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Query execution errors
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Errors caused by missing or malformed configuration.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// A credential or parameter file does not exist
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file exists but could not be read
    #[error("Failed to read {}: {message}", path.display())]
    FileUnreadable { path: PathBuf, message: String },

    /// A file could not be parsed
    #[error("Malformed configuration in {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    /// A required key is absent from a file
    #[error("Missing field '{field}' in {}", path.display())]
    MissingField { path: PathBuf, field: String },

    /// A required environment variable is not set
    #[error("Environment variable '{name}' is not set")]
    MissingVariable { name: String },

    /// An environment variable holds invalid unicode
    #[error("Environment variable '{name}' is not valid unicode")]
    NotUnicode { name: String },

    /// Invalid connection parameter
    #[error("Invalid connection parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Connection URL parsing error
    #[error("Failed to parse connection parameters: {0}")]
    ParseError(String),
}

impl ConfigurationError {
    /// Map an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ConfigurationError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigurationError::FileUnreadable {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    /// Map a JSON error raised while parsing `path`.
    ///
    /// Only the category and position are kept: serde_json messages quote
    /// the offending value, which may be a password.
    pub(crate) fn from_json(path: &Path, err: serde_json::Error) -> Self {
        let message = if err.line() == 0 {
            format!("{:?} error", err.classify())
        } else {
            format!(
                "{:?} error at line {} column {}",
                err.classify(),
                err.line(),
                err.column()
            )
        };
        ConfigurationError::Malformed {
            path: path.to_path_buf(),
            message,
        }
    }
}

/// Errors raised while reading credentials interactively.
#[derive(Error, Debug)]
pub enum InputError {
    /// Input ended before a value was entered
    #[error("Input ended before {field} was entered")]
    EndOfInput { field: String },

    /// Terminal or stream I/O failure
    #[error("Failed to read interactive input: {0}")]
    Io(String),
}

/// Errors related to database connections.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to establish connection to the database
    #[error("Failed to connect to {host}:{port}: {message}")]
    ConnectionFailed {
        host: String,
        port: u16,
        message: String,
    },

    /// Authentication failure
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The connection descriptor could not be decoded or lacks a field
    #[error("Invalid connection descriptor: {0}")]
    InvalidDescriptor(String),

    /// Connection timeout
    #[error("Connection timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection is closed
    #[error("Connection is closed")]
    ConnectionClosed,
}

/// Errors related to query execution.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Query execution failed
    #[error("Query execution failed: {0}")]
    ExecutionFailed(String),

    /// The handle was used after it was closed
    #[error("Connection is closed")]
    ConnectionClosed,
}

impl From<tiberius::error::Error> for QueryError {
    fn from(err: tiberius::error::Error) -> Self {
        QueryError::ExecutionFailed(err.to_string())
    }
}
