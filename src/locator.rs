//! Artifact discovery in a staging directory
//!
//! The extraction tool exits without saying which file it wrote: the
//! extension may differ from the one asked for (no transcoder, container
//! fallback), and post-steps may or may not have run. The locator tries an
//! ordered list of strategies, most specific first.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{MediaKind, StagingArtifact};
use crate::utils::file_timestamp;

/// Ordered discovery strategies for one artifact kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocator {
    /// Extensions renamed to the expected one when found under the expected base name
    alternates: Vec<String>,
    /// Extensions searched by newest file when nothing else matched
    secondaries: Vec<String>,
}

impl ArtifactLocator {
    /// Create a locator with explicit alternate and secondary extensions
    pub fn new(alternates: &[&str], secondaries: &[&str]) -> Self {
        Self {
            alternates: alternates.iter().map(|s| s.to_string()).collect(),
            secondaries: secondaries.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Strategies for audio: raw `webm`/`m4a`/`opus` streams stand in for mp3
    pub fn audio() -> Self {
        Self::new(&["webm", "m4a", "opus"], &["webm"])
    }

    /// Strategies for video: `mkv` or `webm` when the mp4 merge did not happen
    pub fn video() -> Self {
        Self::new(&[], &["mkv", "webm"])
    }

    /// Strategies for `kind` (posters are written directly and need none)
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => Self::audio(),
            MediaKind::Video => Self::video(),
            MediaKind::Poster => Self::new(&[], &[]),
        }
    }

    /// Find the artifact the tool produced
    ///
    /// 1. `{base}.{ext}` exists: return it.
    /// 2. `{base}.{alt}` exists for the first alternate: rename it to
    ///    `{base}.{ext}` and return it.
    /// 3. Newest `*.{ext}` in the directory.
    /// 4. Newest file of each secondary extension, in order.
    ///
    /// Newest means latest creation time (modification time where the
    /// platform has no birth time); ties keep the first entry in directory
    /// order.
    pub async fn locate(
        &self,
        staging_dir: &Path,
        base_name: &str,
        extension: &str,
    ) -> Result<StagingArtifact> {
        let expected = staging_dir.join(format!("{}.{}", base_name, extension));
        if let Some(artifact) = artifact_at(&expected, extension).await? {
            tracing::debug!(path = ?artifact.path, "artifact found under expected name");
            return Ok(artifact);
        }

        for alt in &self.alternates {
            let candidate = staging_dir.join(format!("{}.{}", base_name, alt));
            if is_file(&candidate).await {
                tokio::fs::rename(&candidate, &expected).await?;
                tracing::debug!(
                    from = ?candidate,
                    to = ?expected,
                    "renamed alternate extension to expected"
                );
                if let Some(artifact) = artifact_at(&expected, extension).await? {
                    return Ok(artifact);
                }
            }
        }

        if let Some(artifact) = newest_with_extension(staging_dir, extension).await? {
            tracing::warn!(
                path = ?artifact.path,
                expected = %base_name,
                "artifact found by newest-file search"
            );
            return Ok(artifact);
        }

        for secondary in &self.secondaries {
            if let Some(artifact) = newest_with_extension(staging_dir, secondary).await? {
                tracing::warn!(
                    path = ?artifact.path,
                    extension = %secondary,
                    "artifact found with secondary extension"
                );
                return Ok(artifact);
            }
        }

        Err(Error::ArtifactNotFound {
            staging_dir: staging_dir.to_path_buf(),
            base_name: base_name.to_string(),
            extension: extension.to_string(),
        })
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn artifact_at(path: &Path, extension: &str) -> Result<Option<StagingArtifact>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(StagingArtifact {
            path: path.to_path_buf(),
            extension: extension.to_string(),
            created_at: file_timestamp(&meta)?,
        })),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Newest regular file in `dir` whose extension matches (ASCII case-insensitive)
pub async fn newest_with_extension(dir: &Path, extension: &str) -> Result<Option<StagingArtifact>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<StagingArtifact> = None;
    while let Some(entry) = entries.next_entry().await? {
        let path: PathBuf = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }

        let meta = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta,
            _ => continue,
        };
        let created_at = file_timestamp(&meta)?;

        let newer = newest
            .as_ref()
            .is_none_or(|current| created_at > current.created_at);
        if newer {
            newest = Some(StagingArtifact {
                path,
                extension: extension.to_string(),
                created_at,
            });
        }
    }

    Ok(newest)
}
