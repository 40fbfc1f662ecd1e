//! Traits and types for the external extraction service

use async_trait::async_trait;

use super::invocation::InvocationSpec;
use crate::types::VideoMetadata;

/// Capabilities of an extractor implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorCapabilities {
    /// Can query metadata and download streams
    pub can_extract: bool,
    /// A transcoder is available for audio extraction and stream muxing
    pub can_transcode: bool,
}

/// Trait for the opaque extraction/transcoding service
///
/// Given a URL the service either reports metadata or, given an
/// [`InvocationSpec`], leaves one or more files in the invocation's staging
/// directory and exits. It never reports which file it produced; the
/// [`ArtifactLocator`](crate::locator::ArtifactLocator) infers that.
///
/// # Examples
///
/// ```no_run
/// use media_acquire::extractor::{MediaExtractor, YtDlpExtractor};
/// use media_acquire::config::ToolsConfig;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::from_config(&ToolsConfig::default())
///     .expect("yt-dlp not found");
///
/// let meta = extractor
///     .extract_metadata("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
///     .await?;
/// println!("{} ({} formats)", meta.title, meta.formats.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Query metadata for a single video (playlist expansion disabled)
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot run, exits unsuccessfully, times
    /// out, or prints output that does not parse.
    async fn extract_metadata(&self, url: &str) -> crate::Result<VideoMetadata>;

    /// Run one download invocation to completion
    ///
    /// # Errors
    ///
    /// - [`Error::TranscodeToolMissing`](crate::Error::TranscodeToolMissing)
    ///   when the invocation needs a transcoder and none is available
    /// - [`Error::ExternalToolFailure`](crate::Error::ExternalToolFailure)
    ///   when the tool cannot run, exits unsuccessfully, or times out
    async fn download(&self, spec: &InvocationSpec) -> crate::Result<()>;

    /// Query capabilities of this extractor
    fn capabilities(&self) -> ExtractorCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
