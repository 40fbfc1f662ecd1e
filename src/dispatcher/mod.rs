//! Acquisition dispatcher split into focused submodules.
//!
//! The [`MediaAcquirer`] struct and its methods are organized by concern:
//! - [`pipeline`] - per-kind acquisition strategies (audio, video, poster)
//! - [`requests`] - request-layer operations returning caller-facing payloads
//!
//! Every acquisition is one sequential pipeline run: clean the URL, resolve
//! metadata, invoke the extractor into a per-request staging directory,
//! locate the produced file and move it into `final/`. Runs are admitted
//! through the [`ConcurrencyGate`].

mod pipeline;
mod requests;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::extractor::{self, MediaExtractor};
use crate::finalize::{FinalizationStore, StorageLayout};
use crate::gate::ConcurrencyGate;
use crate::metadata::{MetadataResolver, clean_url};
use crate::poster::PosterFetcher;
use crate::types::{AcquisitionRequest, FinalArtifact, MediaKind};

/// Entry point for acquisitions
///
/// Cheap to clone; clones share the extractor, the finalization lock and
/// the concurrency bound.
#[derive(Clone)]
pub struct MediaAcquirer {
    config: Arc<Config>,
    extractor: Arc<dyn MediaExtractor>,
    resolver: MetadataResolver,
    store: Arc<FinalizationStore>,
    posters: PosterFetcher,
    gate: ConcurrencyGate,
}

impl MediaAcquirer {
    /// Build an acquirer, discovering the extraction tools from `config.tools`
    ///
    /// A missing `yt-dlp` is not an error here: the acquirer is built over a
    /// no-op extractor and every request fails with a tool failure.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let extractor = extractor::from_config(&config.tools);
        Self::with_extractor(config, extractor)
    }

    /// Build an acquirer over an explicit extractor implementation
    pub fn with_extractor(config: Config, extractor: Arc<dyn MediaExtractor>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(FinalizationStore::new(config.storage.file_collision));
        let posters = PosterFetcher::new(config.poster.clone(), store.clone())?;
        let resolver = MetadataResolver::new(extractor.clone(), config.retry.clone());
        let gate = ConcurrencyGate::new(config.max_concurrent_acquisitions);

        tracing::info!(
            extractor = extractor.name(),
            output_base = ?config.output_base(),
            max_concurrent = gate.limit(),
            "media acquirer ready"
        );

        Ok(Self {
            config: Arc::new(config),
            extractor,
            resolver,
            store,
            posters,
            gate,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Concurrency bound shared by every clone
    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Storage layout rooted at `output_base`, or at the configured base
    pub fn layout_for(&self, output_base: Option<&Path>) -> Result<StorageLayout> {
        StorageLayout::new(output_base.unwrap_or(self.config.output_base()))
    }

    /// Run one acquisition through the gate
    pub async fn acquire(&self, request: &AcquisitionRequest) -> Result<FinalArtifact> {
        self.gate.run(self.run_pipeline(request)).await?
    }

    /// Run many acquisitions through the gate; results keep input order
    pub async fn acquire_all(&self, requests: &[AcquisitionRequest]) -> Vec<Result<FinalArtifact>> {
        self.gate
            .run_all(requests.iter().map(|r| self.run_pipeline(r)))
            .await
            .into_iter()
            .map(|admitted| admitted.and_then(|outcome| outcome))
            .collect()
    }

    /// Stop admitting acquisitions; runs already admitted finish normally
    pub fn shutdown(&self) {
        tracing::info!("media acquirer no longer accepting requests");
        self.gate.close();
    }

    async fn run_pipeline(&self, request: &AcquisitionRequest) -> Result<FinalArtifact> {
        let url = clean_url(&request.url)?;
        let layout = self.layout_for(request.output_base.as_deref())?;
        layout.ensure().await?;

        tracing::info!(
            url = %url,
            kind = %request.kind,
            quality_hint = ?request.quality_hint,
            output_base = ?layout.base(),
            "acquisition started"
        );

        let outcome = match request.kind {
            MediaKind::Audio => self.acquire_audio(&url, &layout).await,
            MediaKind::Video => self.acquire_video(&url, &layout).await,
            MediaKind::Poster => self.acquire_poster(&url, &layout).await,
        };

        match &outcome {
            Ok(artifact) => tracing::info!(
                url = %url,
                kind = %request.kind,
                path = ?artifact.path,
                display_name = %artifact.display_name,
                "acquisition completed"
            ),
            Err(e) => tracing::error!(
                url = %url,
                kind = %request.kind,
                error = %e,
                "acquisition failed"
            ),
        }
        outcome
    }
}
