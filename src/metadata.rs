//! Metadata resolution
//!
//! One resolver call yields one immutable [`VideoMetadata`] snapshot or a
//! [`MetadataUnavailable`](crate::Error::MetadataUnavailable) error, never a
//! partial object. Transient extractor failures are retried per
//! [`RetryConfig`].

use std::sync::Arc;

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::extractor::MediaExtractor;
use crate::retry::with_retry;
use crate::types::VideoMetadata;

/// Longest description carried in the request-layer info payload
pub const DESCRIPTION_EXCERPT_CHARS: usize = 200;

/// Validate a URL and strip playlist parameters from it
///
/// Only `http` and `https` URLs are accepted. YouTube Shorts links are
/// rewritten to the equivalent `watch?v=` form. Every `list` query parameter
/// (and the `index` that travels with it) is removed so the extractor sees
/// a single video.
///
/// ```
/// use media_acquire::metadata::clean_url;
///
/// let url = clean_url("https://www.youtube.com/watch?v=abc&list=PL1&index=3").unwrap();
/// assert_eq!(url, "https://www.youtube.com/watch?v=abc");
/// ```
pub fn clean_url(raw: &str) -> Result<String> {
    let mut url = url::Url::parse(raw.trim())
        .map_err(|e| Error::InvalidRequest(format!("invalid URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidRequest(format!(
            "unsupported URL scheme '{}'",
            url.scheme()
        )));
    }

    if let Some(id) = shorts_id(&url) {
        url.set_path("/watch");
        url.set_query(None);
        url.query_pairs_mut().append_pair("v", &id);
    }

    let had_playlist = url.query_pairs().any(|(k, _)| k == "list");
    if had_playlist {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "list" && k != "index")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url.to_string())
}

fn shorts_id(url: &url::Url) -> Option<String> {
    let host = url.host_str()?;
    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return None;
    }
    let mut segments = url.path_segments()?;
    if segments.next()? != "shorts" {
        return None;
    }
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Truncate a description to [`DESCRIPTION_EXCERPT_CHARS`] characters
pub fn description_excerpt(description: &str) -> String {
    description.chars().take(DESCRIPTION_EXCERPT_CHARS).collect()
}

/// Resolves URLs to metadata snapshots through the extractor
#[derive(Clone)]
pub struct MetadataResolver {
    extractor: Arc<dyn MediaExtractor>,
    retry: RetryConfig,
}

impl MetadataResolver {
    /// Create a resolver over `extractor`
    pub fn new(extractor: Arc<dyn MediaExtractor>, retry: RetryConfig) -> Self {
        Self { extractor, retry }
    }

    /// Resolve one video's metadata
    ///
    /// The URL is cleaned first; an invalid URL is an
    /// [`InvalidRequest`](Error::InvalidRequest). Every extractor failure,
    /// after retries, becomes [`MetadataUnavailable`](Error::MetadataUnavailable).
    pub async fn resolve(&self, url: &str) -> Result<VideoMetadata> {
        let url = clean_url(url)?;

        let extractor = &self.extractor;
        let result = with_retry(&self.retry, || {
            let url = url.clone();
            async move { extractor.extract_metadata(&url).await }
        })
        .await;

        match result {
            Ok(meta) => {
                tracing::debug!(
                    url = %url,
                    video_id = %meta.id,
                    formats = meta.formats.len(),
                    "metadata resolved"
                );
                Ok(meta)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "metadata unavailable");
                Err(Error::MetadataUnavailable {
                    url,
                    reason: e.to_string(),
                })
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{StubExtractor, sample_metadata};

    fn no_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 0,
            ..Default::default()
        }
    }

    #[test]
    fn clean_url_strips_playlist_parameters() {
        assert_eq!(
            clean_url("https://www.youtube.com/watch?v=abc&list=PLx").unwrap(),
            "https://www.youtube.com/watch?v=abc"
        );
        assert_eq!(
            clean_url("https://www.youtube.com/watch?list=PLx&v=abc&t=30").unwrap(),
            "https://www.youtube.com/watch?v=abc&t=30"
        );
    }

    #[test]
    fn clean_url_rewrites_shorts_links() {
        assert_eq!(
            clean_url("https://www.youtube.com/shorts/xyz789?feature=share").unwrap(),
            "https://www.youtube.com/watch?v=xyz789"
        );
        assert_eq!(
            clean_url("https://m.youtube.com/shorts/xyz789").unwrap(),
            "https://m.youtube.com/watch?v=xyz789"
        );
        // Only the YouTube host has a shorts route
        let other = "https://example.com/shorts/xyz789";
        assert_eq!(clean_url(other).unwrap(), other);
    }

    #[test]
    fn clean_url_leaves_single_video_urls_alone() {
        let url = "https://youtu.be/abc?t=10";
        assert_eq!(clean_url(url).unwrap(), url);
    }

    #[test]
    fn clean_url_drops_query_when_only_playlist_remains() {
        assert_eq!(
            clean_url("https://youtu.be/abc?list=PLx").unwrap(),
            "https://youtu.be/abc"
        );
    }

    #[test]
    fn clean_url_rejects_non_http_schemes_and_garbage() {
        assert!(matches!(
            clean_url("file:///etc/passwd"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            clean_url("not a url"),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn description_excerpt_counts_characters_not_bytes() {
        let long = "é".repeat(250);
        let excerpt = description_excerpt(&long);
        assert_eq!(excerpt.chars().count(), 200);
        assert_eq!(description_excerpt("short"), "short");
    }

    #[tokio::test]
    async fn resolve_passes_cleaned_url_to_extractor() {
        let stub = Arc::new(StubExtractor::new(Some(sample_metadata("Song", &[720])), true));
        let resolver = MetadataResolver::new(stub.clone(), no_retry());

        let meta = resolver
            .resolve("https://www.youtube.com/watch?v=abc&list=PL1")
            .await
            .unwrap();

        assert_eq!(meta.title, "Song");
        assert_eq!(
            stub.metadata_calls.lock().unwrap().as_slice(),
            ["https://www.youtube.com/watch?v=abc"]
        );
    }

    #[tokio::test]
    async fn extractor_failure_becomes_metadata_unavailable() {
        let stub = Arc::new(StubExtractor::new(None, true));
        let resolver = MetadataResolver::new(stub, no_retry());

        match resolver.resolve("https://www.youtube.com/watch?v=gone").await {
            Err(Error::MetadataUnavailable { url, reason }) => {
                assert_eq!(url, "https://www.youtube.com/watch?v=gone");
                assert!(reason.contains("Video unavailable"));
            }
            other => panic!("expected MetadataUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_the_extractor_runs() {
        let stub = Arc::new(StubExtractor::new(Some(sample_metadata("x", &[])), true));
        let resolver = MetadataResolver::new(stub.clone(), no_retry());

        let result = resolver.resolve("ftp://example.com/v").await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert!(stub.metadata_calls.lock().unwrap().is_empty());
    }
}
