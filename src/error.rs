// src/error.rs

//! Error type shared by every recipe phase
//!
//! Phases never recover from a failure: the first error aborts the cook
//! and reaches the caller as-is.

use thiserror::Error;

/// Errors produced while configuring, fetching, building or packaging
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem failure with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Source download failed
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Downloaded source does not match the pinned digest
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Archive extension not recognised
    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(String),

    /// Unknown setting key or value
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// Unknown or removed option, or a malformed option value
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Malformed reference, override or digest
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Profile file could not be parsed
    #[error("Profile error: {0}")]
    Profile(#[from] toml::de::Error),

    /// Metadata could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Required executable missing from PATH
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// External command exited unsuccessfully
    #[error("Command `{command}` failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Expected file or directory is missing
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
