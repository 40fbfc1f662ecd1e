//! Per-kind acquisition strategies

use std::path::Path;

use super::MediaAcquirer;
use crate::error::{Error, Result};
use crate::extractor::InvocationSpec;
use crate::finalize::StorageLayout;
use crate::locator::ArtifactLocator;
use crate::sanitize::sanitize;
use crate::types::FinalArtifact;

impl MediaAcquirer {
    /// Best audio stream, extracted to the configured codec when a
    /// transcoder is available
    ///
    /// Without a transcoder the raw stream is kept and the locator renames
    /// it to the target extension.
    pub(super) async fn acquire_audio(&self, url: &str, layout: &StorageLayout) -> Result<FinalArtifact> {
        let metadata = self.resolver.resolve(url).await?;
        let base_name = sanitize(&metadata.title);
        let media = &self.config.media;

        let caps = self.extractor.capabilities();
        if !caps.can_transcode {
            tracing::warn!(
                url = %url,
                "no transcoder available, keeping the raw audio stream"
            );
        }

        let staging = layout.request_staging().await?;
        tracing::debug!(staging = ?staging.path(), base_name = %base_name, "audio staging ready");

        let spec = InvocationSpec::audio(url, staging.path(), &base_name, media, caps.can_transcode);
        self.extractor.download(&spec).await?;

        let artifact = ArtifactLocator::audio()
            .locate(staging.path(), &base_name, &media.audio_codec)
            .await?;

        let name = format!("{}.{}", base_name, artifact.extension);
        self.store
            .finalize(Some(artifact.path.as_path()), Some(&name), layout, Some(&media.audio_codec))
            .await
    }

    /// Muxed video capped at the configured height, degrading to a direct
    /// already-muxed query when muxing is impossible or fails
    ///
    /// The final artifact keeps the original title as its display name.
    pub(super) async fn acquire_video(&self, url: &str, layout: &StorageLayout) -> Result<FinalArtifact> {
        let metadata = self.resolver.resolve(url).await?;
        let base_name = sanitize(&metadata.title);
        let media = &self.config.media;

        let staging = layout.request_staging().await?;
        tracing::debug!(staging = ?staging.path(), base_name = %base_name, "video staging ready");

        let direct = InvocationSpec::direct_video(url, staging.path(), &base_name, media);

        if self.extractor.capabilities().can_transcode {
            let muxed = InvocationSpec::muxed_video(url, staging.path(), &base_name, media);
            match self.extractor.download(&muxed).await {
                Ok(()) => {}
                Err(e) if is_merge_failure(&e) => {
                    tracing::warn!(
                        url = %url,
                        error = %e,
                        "muxed video download failed, retrying with direct format"
                    );
                    clear_dir(staging.path()).await?;
                    self.extractor.download(&direct).await?;
                }
                Err(e) => return Err(e),
            }
        } else {
            tracing::warn!(url = %url, "no transcoder available, using direct video format");
            self.extractor.download(&direct).await?;
        }

        let artifact = ArtifactLocator::video()
            .locate(staging.path(), &base_name, &media.video_container)
            .await?;

        let name = format!("{}.{}", base_name, artifact.extension);
        let mut finalized = self
            .store
            .finalize(Some(artifact.path.as_path()), Some(&name), layout, None)
            .await
            .map_err(|e| with_display_name(e, &metadata.title))?;

        finalized.display_name = metadata.title;
        Ok(finalized)
    }

    /// Poster for the video, fetched over HTTP
    pub(super) async fn acquire_poster(&self, url: &str, layout: &StorageLayout) -> Result<FinalArtifact> {
        let metadata = self.resolver.resolve(url).await?;
        self.posters.fetch_poster(&metadata, layout).await
    }
}

// Leftovers of a failed attempt (fragments, partial merges) would otherwise
// compete with the retry's output in the locator's newest-file search.
async fn clear_dir(dir: &Path) -> Result<()> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

/// Failures a direct already-muxed download can work around
///
/// Timeouts and source errors (unavailable, private, geo-blocked) would fail
/// the same way on the direct format and are surfaced as-is.
fn is_merge_failure(error: &Error) -> bool {
    match error {
        Error::TranscodeToolMissing(_) => true,
        Error::ExternalToolFailure { reason, .. } => {
            let reason = reason.to_ascii_lowercase();
            !reason.contains("timed out")
                && MERGE_FAILURE_MARKERS
                    .iter()
                    .any(|marker| reason.contains(marker))
        }
        _ => false,
    }
}

const MERGE_FAILURE_MARKERS: [&str; 5] = ["ffmpeg", "ffprobe", "postprocess", "merg", "conversion failed"];

fn with_display_name(error: Error, display_name: &str) -> Error {
    match error {
        Error::MoveFailure {
            source_path,
            dest_path,
            reason,
            ..
        } => Error::MoveFailure {
            source_path,
            dest_path,
            display_name: display_name.to_string(),
            reason,
        },
        other => other,
    }
}
