//! Thumbnail acquisition
//!
//! Posters bypass the extraction tool: an ordered list of candidate URLs is
//! tried over HTTP and the first acceptable body is staged and finalized.
//! Hosts often answer a missing thumbnail with a tiny placeholder image and
//! a 200, so a size floor is applied on top of the status check.

use std::sync::Arc;

use crate::config::PosterConfig;
use crate::error::{Error, Result};
use crate::finalize::{FinalizationStore, StorageLayout};
use crate::sanitize::poster_name;
use crate::types::{FinalArtifact, VideoMetadata};
use crate::utils::random_token;

/// Per-video thumbnail variants tried after the extractor's own URL, best first
pub const THUMBNAIL_VARIANTS: [&str; 5] = [
    "maxresdefault",
    "sddefault",
    "hqdefault",
    "mqdefault",
    "default",
];

/// Fetches posters and hands them to the [`FinalizationStore`]
#[derive(Debug, Clone)]
pub struct PosterFetcher {
    client: reqwest::Client,
    config: PosterConfig,
    store: Arc<FinalizationStore>,
}

impl PosterFetcher {
    /// Build a fetcher with the configured user agent and per-request timeout
    pub fn new(config: PosterConfig, store: Arc<FinalizationStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            store,
        })
    }

    /// Candidate URLs in the order they are tried
    ///
    /// The extractor's thumbnail comes first when present, then the standard
    /// variants under the thumbnail host for the video id. Duplicates are
    /// dropped.
    pub fn candidates(&self, metadata: &VideoMetadata) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        if let Some(thumb) = &metadata.thumbnail_url {
            urls.push(thumb.clone());
        }

        if !metadata.id.is_empty() {
            let base = self.config.thumbnail_base.trim_end_matches('/');
            for variant in THUMBNAIL_VARIANTS {
                let url = format!("{}/{}/{}.jpg", base, metadata.id, variant);
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        urls
    }

    /// Fetch the first acceptable candidate and finalize it as
    /// `{sanitized title}-poster.jpg`
    ///
    /// The body is staged under a random token in a per-request staging
    /// directory, never under a title-derived name.
    pub async fn fetch_poster(
        &self,
        metadata: &VideoMetadata,
        layout: &StorageLayout,
    ) -> Result<FinalArtifact> {
        let candidates = self.candidates(metadata);
        let mut last_error = String::from("no candidate URLs");

        for (index, url) in candidates.iter().enumerate() {
            match self.try_candidate(url).await {
                Ok(body) => {
                    tracing::debug!(url = %url, bytes = body.len(), index, "poster candidate accepted");

                    let staging = layout.request_staging().await?;
                    let staged = staging.path().join(format!("{}.jpg", random_token()));
                    tokio::fs::write(&staged, &body).await?;

                    let name = poster_name(&metadata.title);
                    return self
                        .store
                        .finalize(Some(staged.as_path()), Some(&name), layout, None)
                        .await;
                }
                Err(reason) => {
                    tracing::debug!(url = %url, reason = %reason, "poster candidate rejected");
                    last_error = format!("{}: {}", url, reason);
                }
            }
        }

        tracing::warn!(
            video_id = %metadata.id,
            attempted = candidates.len(),
            "all poster candidates failed"
        );
        Err(Error::FetchAllCandidatesFailed {
            attempted: candidates.len(),
            last_error,
        })
    }

    async fn try_candidate(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let mut response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(format!("HTTP {}", status));
        }

        let max = self.config.max_bytes;
        if let Some(declared) = response.content_length()
            && declared as usize > max
        {
            return Err(format!("body too large ({} > {} bytes)", declared, max));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
            if body.len() + chunk.len() > max {
                return Err(format!("body too large (over {} bytes)", max));
            }
            body.extend_from_slice(&chunk);
        }

        if body.len() < self.config.min_bytes {
            return Err(format!(
                "body too small ({} < {} bytes)",
                body.len(),
                self.config.min_bytes
            ));
        }
        Ok(body)
    }
}
