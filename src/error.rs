//! Error types for the timetable service.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Errors from writing or reading the flat-text exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested file has not been written yet.
    #[error("file not found: '{0}'")]
    NotFound(PathBuf),

    /// Teacher names become file names, so they must be plain.
    #[error("invalid teacher name: '{0}'")]
    InvalidName(String),

    #[error("failed to render PDF '{path}': {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("{role} may not {action}")]
    Forbidden { role: &'static str, action: &'static str },
}
