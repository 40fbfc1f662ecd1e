//! Request-layer operations
//!
//! These never return raw errors for acquisitions: failures are folded into
//! an [`AcquisitionResponse`] with a message and a machine-readable code.

use std::path::PathBuf;

use super::MediaAcquirer;
use crate::error::{Error, Result};
use crate::metadata::{clean_url, description_excerpt};
use crate::resolution::{DEFAULT_OFFERS, require_resolutions};
use crate::types::{AcquisitionRequest, AcquisitionResponse, MediaKind, Quality, VideoInfo};

impl MediaAcquirer {
    /// Title, thumbnail, duration, author and obtainable resolutions for `url`
    ///
    /// A video exposing no usable heights is offered the default ladder.
    pub async fn get_info(&self, url: &str) -> Result<VideoInfo> {
        let url = clean_url(url)?;
        let metadata = self.resolver.resolve(&url).await?;

        let resolutions = require_resolutions(&metadata).unwrap_or_else(|e| {
            tracing::debug!(url = %url, reason = %e, "offering default resolutions");
            DEFAULT_OFFERS.to_vec()
        });

        Ok(VideoInfo {
            title: metadata.title,
            thumbnail: metadata.thumbnail_url.unwrap_or_default(),
            duration_seconds: metadata.duration_seconds,
            author: metadata.uploader,
            resolutions,
            video_id: metadata.id,
            description: description_excerpt(&metadata.description),
        })
    }

    /// Acquire `kind` for `url`, optionally validating a quality string
    ///
    /// The quality must describe the same kind. Its numeric hint is recorded
    /// on the request; output always uses the configured bitrate and ceiling.
    pub async fn download(
        &self,
        url: &str,
        kind: MediaKind,
        quality: Option<&str>,
        output_base: Option<PathBuf>,
    ) -> AcquisitionResponse {
        let request = match build_request(url, kind, quality, output_base) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(url = %url, kind = %kind, error = %e, "request rejected");
                return AcquisitionResponse::failed(&e);
            }
        };

        match self.acquire(&request).await {
            Ok(artifact) => AcquisitionResponse::completed(kind, artifact),
            Err(e) => AcquisitionResponse::failed(&e),
        }
    }

    /// Acquire the poster for `url`
    pub async fn fetch_poster(&self, url: &str, output_base: Option<PathBuf>) -> AcquisitionResponse {
        self.download(url, MediaKind::Poster, None, output_base).await
    }
}

fn build_request(
    url: &str,
    kind: MediaKind,
    quality: Option<&str>,
    output_base: Option<PathBuf>,
) -> Result<AcquisitionRequest> {
    let mut request = AcquisitionRequest::new(url, kind);
    request.output_base = output_base;

    if let Some(quality) = quality {
        let quality = Quality::parse(quality)?;
        if quality.kind != kind {
            return Err(Error::InvalidRequest(format!(
                "quality for {} given to a {} request",
                quality.kind, kind
            )));
        }
        request.quality_hint = quality.hint;
    }
    Ok(request)
}
