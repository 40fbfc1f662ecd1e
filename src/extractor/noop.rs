//! No-op extractor for graceful degradation

use async_trait::async_trait;

use super::invocation::InvocationSpec;
use super::traits::{ExtractorCapabilities, MediaExtractor};
use crate::types::VideoMetadata;

const MISSING: &str = "yt-dlp binary not available. \
     Configure tools.ytdlp_path or ensure yt-dlp is in PATH.";

/// Extractor used when no yt-dlp binary is available or configured
///
/// Every operation fails with an external-tool error, so requests report a
/// clear message instead of the pipeline refusing to start. Poster fetches
/// still need metadata and fail the same way.
///
/// # Examples
///
/// ```
/// use media_acquire::extractor::{MediaExtractor, NoOpExtractor};
///
/// # #[tokio::main]
/// # async fn main() {
/// let extractor = NoOpExtractor;
/// assert!(extractor.extract_metadata("https://example.com/v").await.is_err());
/// assert!(!extractor.capabilities().can_extract);
/// # }
/// ```
pub struct NoOpExtractor;

fn unavailable() -> crate::Error {
    crate::Error::ExternalToolFailure {
        tool: "yt-dlp".to_string(),
        reason: MISSING.to_string(),
    }
}

#[async_trait]
impl MediaExtractor for NoOpExtractor {
    async fn extract_metadata(&self, _url: &str) -> crate::Result<VideoMetadata> {
        Err(unavailable())
    }

    async fn download(&self, _spec: &InvocationSpec) -> crate::Result<()> {
        Err(unavailable())
    }

    fn capabilities(&self) -> ExtractorCapabilities {
        ExtractorCapabilities {
            can_extract: false,
            can_transcode: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
