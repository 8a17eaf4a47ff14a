//! Error types shared across the converter
//!
//! Per-file problems (encode failures, tag failures) never abort a run, so
//! only `ConvertError` is ever surfaced as a reason a run did not happen.

use std::path::PathBuf;
use thiserror::Error;

/// Whole-run failures: the run never starts converting files.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No input path was given
    #[error("Please select an input file or directory")]
    NoInput,

    /// Input root does not exist
    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    /// Single-file input with an extension we don't convert
    #[error("Unsupported audio format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// The encoder binary could not be found or run
    #[error("FFmpeg not found: {reason}")]
    EncoderUnavailable { reason: String },

    /// A conversion is already running
    #[error("A conversion is already in progress")]
    AlreadyRunning,

    /// The encoding profile failed validation
    #[error(transparent)]
    Profile(#[from] crate::profiles::ProfileError),

    /// Directory listing failed
    #[error("Failed to read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single encoder invocation
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to spawn encoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Encoder exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    #[error("Encoder reported success but produced no output")]
    MissingOutput,

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} into place: {source}")]
    Rename {
        from: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the tag read/write stage (always non-fatal)
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to read tags from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("Failed to write tags to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },

    #[error("{path} has no writable tag type")]
    NoTag { path: PathBuf },
}

/// Cut an encoder's error output down to something that fits on a log line.
///
/// Counts characters, not bytes, so multi-byte output never splits.
pub fn truncate_diagnostic(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "Unknown error".to_string();
    }
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
