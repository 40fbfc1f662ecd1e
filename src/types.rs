//! Core types for media-acquire

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, ErrorDetail, Result};

/// What a request asks the pipeline to produce
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio transcode (MP3)
    Audio,
    /// Muxed video file (MP4)
    Video,
    /// Thumbnail image (JPEG)
    Poster,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
            MediaKind::Poster => write!(f, "poster"),
        }
    }
}

/// A caller's quality selection, validated up front
///
/// Accepted forms: `"mp3"`, `"mp3-<kbps>"`, `"mp4"`, `"<height>p"`, a bare
/// height, and `"poster"`. The numeric hint is recorded but the pipeline
/// always produces its configured bitrate and ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quality {
    /// Requested artifact kind
    pub kind: MediaKind,
    /// Requested bitrate (audio) or height (video), if any
    pub hint: Option<u32>,
}

impl Quality {
    /// Parse a request-layer quality string
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim().to_ascii_lowercase();
        let invalid = || Error::InvalidRequest(format!("unsupported quality '{}'", value));

        let quality = match value.as_str() {
            "mp3" | "audio" => Self {
                kind: MediaKind::Audio,
                hint: None,
            },
            "mp4" | "video" => Self {
                kind: MediaKind::Video,
                hint: None,
            },
            "poster" | "thumbnail" => Self {
                kind: MediaKind::Poster,
                hint: None,
            },
            other => {
                if let Some(kbps) = other.strip_prefix("mp3-") {
                    let kbps = kbps.parse::<u32>().map_err(|_| invalid())?;
                    Self {
                        kind: MediaKind::Audio,
                        hint: Some(kbps),
                    }
                } else {
                    let height = other.strip_suffix('p').unwrap_or(other);
                    let height = height.parse::<u32>().map_err(|_| invalid())?;
                    if height == 0 {
                        return Err(invalid());
                    }
                    Self {
                        kind: MediaKind::Video,
                        hint: Some(height),
                    }
                }
            }
        };
        Ok(quality)
    }
}

/// One pipeline run's input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    /// Remote video reference
    pub url: String,
    /// Artifact to produce
    pub kind: MediaKind,
    /// Caller's quality hint (recorded, not honored)
    #[serde(default)]
    pub quality_hint: Option<u32>,
    /// Root of the `temp/` and `final/` subtrees; the configured base when absent
    #[serde(default)]
    pub output_base: Option<PathBuf>,
}

impl AcquisitionRequest {
    /// Request with no quality hint and the default output base
    pub fn new(url: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            kind,
            quality_hint: None,
            output_base: None,
        }
    }

    /// Build a request from a request-layer quality string
    pub fn from_quality(
        url: impl Into<String>,
        quality: &str,
        output_base: Option<PathBuf>,
    ) -> Result<Self> {
        let quality = Quality::parse(quality)?;
        Ok(Self {
            url: url.into(),
            kind: quality.kind,
            quality_hint: quality.hint,
            output_base,
        })
    }

    /// Root the request's subtrees at `base`
    pub fn with_output_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.output_base = Some(base.into());
        self
    }
}

/// One entry of the extractor's format list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatEntry {
    /// Frame height, when the format reports one
    pub height_pixels: Option<u32>,
    /// False for audio-only formats
    pub has_video_track: bool,
}

/// Snapshot of one video's metadata from a single resolver call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Extractor-specific video id
    pub id: String,
    /// Human title (never empty)
    pub title: String,
    /// Duration in seconds (0 when unknown)
    pub duration_seconds: f64,
    /// Uploader / channel name
    pub uploader: String,
    /// Extractor-provided thumbnail URL
    pub thumbnail_url: Option<String>,
    /// Full description
    pub description: String,
    /// Available formats
    pub formats: Vec<FormatEntry>,
}

/// A standard resolution the caller may request and expect approximately
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionOffer(pub u32);

impl ResolutionOffer {
    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ResolutionOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}p", self.0)
    }
}

/// A file the external tool left in staging
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagingArtifact {
    /// Location under `temp/`
    pub path: PathBuf,
    /// Extension without the dot
    pub extension: String,
    /// Creation time (modification time where birth time is unavailable)
    pub created_at: DateTime<Utc>,
}

/// A durable artifact in `final/`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalArtifact {
    /// Absolute path under `final/`
    pub path: PathBuf,
    /// File name used on disk
    pub storage_name: String,
    /// Name to present to users (never empty)
    pub display_name: String,
}

/// Request-layer view of a video (`getInfo`)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    /// Human title
    pub title: String,
    /// Thumbnail URL (empty when unknown)
    pub thumbnail: String,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Uploader name
    pub author: String,
    /// Standard resolutions, descending
    pub resolutions: Vec<ResolutionOffer>,
    /// Video id
    pub video_id: String,
    /// Description excerpt
    pub description: String,
}

/// Request-layer result of `download` / `fetchPoster`
///
/// No raw error crosses the pipeline boundary: failures become
/// `success: false` with a message and a machine-readable code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResponse {
    /// Whether a final artifact was produced
    pub success: bool,
    /// Final artifact path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Display name (also set on move failures when known)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Human-readable outcome
    pub message: String,
    /// Machine-readable failure code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AcquisitionResponse {
    /// Successful outcome for `kind`
    pub fn completed(kind: MediaKind, artifact: FinalArtifact) -> Self {
        Self {
            success: true,
            file_path: Some(artifact.path),
            display_name: Some(artifact.display_name),
            message: format!("{} acquisition completed", kind),
            code: None,
        }
    }

    /// Failed outcome carrying the error's code and message
    pub fn failed(error: &Error) -> Self {
        let detail = ErrorDetail::from(error);
        Self {
            success: false,
            file_path: None,
            display_name: error.display_name().map(str::to_string),
            message: detail.message,
            code: Some(detail.code),
        }
    }
}
