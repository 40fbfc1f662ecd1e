//! Error types for media-acquire
//!
//! This module provides error handling for the acquisition pipeline, including:
//! - One variant per pipeline failure (metadata, tool, locate, move, poster)
//! - Machine-readable error codes and HTTP status mapping for the request layer
//! - Context information (URL, staging directory, display name, etc.)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-acquire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-acquire
///
/// Every failure is scoped to one request. Component-local fallbacks (next
/// poster candidate, next locator strategy, degraded format) are exhausted
/// before one of these surfaces.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_base")
        key: Option<String>,
    },

    /// The request was rejected before any work started
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The extraction service could not produce metadata for the URL
    #[error("metadata unavailable for {url}: {reason}")]
    MetadataUnavailable {
        /// The URL that was resolved
        url: String,
        /// Why resolution failed (process, timeout, or parse error)
        reason: String,
    },

    /// The video exposes no standard resolutions
    ///
    /// Never terminal: the dispatcher substitutes the default ladder.
    #[error("no standard resolutions available")]
    NoResolutionsAvailable,

    /// The external extraction tool exited unsuccessfully or could not be run
    #[error("external tool {tool} failed: {reason}")]
    ExternalToolFailure {
        /// Tool name (e.g., "yt-dlp")
        tool: String,
        /// Exit status or spawn error, with a stderr excerpt when available
        reason: String,
    },

    /// The transcoder is not installed; signals the degraded video path
    #[error("transcoder not available: {0}")]
    TranscodeToolMissing(String),

    /// The tool exited successfully but no artifact could be located
    #[error("no .{extension} artifact for '{base_name}' in {staging_dir}")]
    ArtifactNotFound {
        /// Staging directory that was searched
        staging_dir: PathBuf,
        /// Expected base name (sanitized title)
        base_name: String,
        /// Expected extension
        extension: String,
    },

    /// Relocation from staging into the final store failed
    #[error("failed to move {source_path:?} to {dest_path:?}: {reason}")]
    MoveFailure {
        /// The staging file, if one was known
        source_path: Option<PathBuf>,
        /// The intended destination, if it was computed
        dest_path: Option<PathBuf>,
        /// Best-known display name so callers can still report context
        display_name: String,
        /// The reason the move failed
        reason: String,
    },

    /// Every poster candidate URL failed
    #[error("all {attempted} poster candidates failed (last error: {last_error})")]
    FetchAllCandidatesFailed {
        /// Number of candidates tried
        attempted: usize,
        /// Description of the final failure
        last_error: String,
    },

    /// The concurrency gate was closed; no new acquisitions are accepted
    #[error("acquisitions are shutting down")]
    ShuttingDown,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Display name carried by a failed finalization, if any
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Error::MoveFailure { display_name, .. } => Some(display_name),
            _ => None,
        }
    }
}

/// Failure payload handed to the request layer
///
/// # Example JSON Response
///
/// ```json
/// {
///   "code": "artifact_not_found",
///   "message": "no .mp3 artifact for 'Song' in /srv/downloads/temp/.tmpA1b2"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "metadata_unavailable")
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl From<&Error> for ErrorDetail {
    fn from(error: &Error) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Convert errors to HTTP status codes for the request layer
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::InvalidRequest(_) => 400,

            // 404 Not Found
            Error::ArtifactNotFound { .. } => 404,
            Error::NoResolutionsAvailable => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Io(_) => 500,
            Error::MoveFailure { .. } => 500,
            Error::Serialization(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::MetadataUnavailable { .. } => 502,
            Error::FetchAllCandidatesFailed { .. } => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable
            Error::ExternalToolFailure { .. } => 503,
            Error::TranscodeToolMissing(_) => 503,
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::MetadataUnavailable { .. } => "metadata_unavailable",
            Error::NoResolutionsAvailable => "no_resolutions_available",
            Error::ExternalToolFailure { .. } => "external_tool_failure",
            Error::TranscodeToolMissing(_) => "transcode_tool_missing",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::MoveFailure { .. } => "move_failure",
            Error::FetchAllCandidatesFailed { .. } => "fetch_all_candidates_failed",
            Error::ShuttingDown => "shutting_down",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}
