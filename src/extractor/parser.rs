//! Parser for the extractor's metadata JSON

use serde::Deserialize;

use crate::sanitize::PLACEHOLDER;
use crate::types::{FormatEntry, VideoMetadata};

#[derive(Debug, Deserialize)]
struct RawInfo {
    id: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    uploader: Option<String>,
    channel: Option<String>,
    thumbnail: Option<String>,
    description: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    height: Option<f64>,
    vcodec: Option<String>,
}

/// Map the tool's single-video JSON to a [`VideoMetadata`]
///
/// A missing or blank title becomes `"video"`; other missing scalars become
/// empty or zero. A format counts as video unless its codec is `"none"`.
pub fn parse_metadata_json(stdout: &[u8]) -> crate::Result<VideoMetadata> {
    let raw: RawInfo = serde_json::from_slice(stdout)?;

    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    let formats = raw
        .formats
        .into_iter()
        .map(|f| FormatEntry {
            height_pixels: f
                .height
                .filter(|h| h.is_finite() && *h >= 0.0)
                .map(|h| h.round() as u32),
            has_video_track: f.vcodec.as_deref() != Some("none"),
        })
        .collect();

    Ok(VideoMetadata {
        id: raw.id.unwrap_or_default(),
        title,
        duration_seconds: raw.duration.unwrap_or(0.0),
        uploader: raw.uploader.or(raw.channel).unwrap_or_default(),
        thumbnail_url: raw.thumbnail.filter(|t| !t.is_empty()),
        description: raw.description.unwrap_or_default(),
        formats,
    })
}
