//! Storage layout and atomic relocation into `final/`
//!
//! Every output base has exactly two subtrees: `temp/` for staging and
//! `final/` for durable artifacts. A [`StorageLayout`] is resolved per
//! request and threaded through every call; nothing in the crate keeps a
//! process-wide notion of "the" download directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::config::FileCollisionAction;
use crate::error::{Error, Result};
use crate::sanitize::{PLACEHOLDER, sanitize};
use crate::types::FinalArtifact;
use crate::utils::get_unique_path;

/// Staging subtree name
pub const TEMP_DIR: &str = "temp";

/// Durable subtree name
pub const FINAL_DIR: &str = "final";

/// Absolute `temp/` and `final/` locations under one output base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    base: PathBuf,
    temp: PathBuf,
    final_dir: PathBuf,
}

impl StorageLayout {
    /// Resolve `base` to an absolute layout (nothing is created yet)
    pub fn new(base: &Path) -> Result<Self> {
        let base = std::path::absolute(base).map_err(|e| Error::Config {
            message: format!("cannot resolve output base {}: {}", base.display(), e),
            key: Some("storage.output_base".to_string()),
        })?;
        Ok(Self {
            temp: base.join(TEMP_DIR),
            final_dir: base.join(FINAL_DIR),
            base,
        })
    }

    /// Output base
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Shared staging root
    pub fn temp_dir(&self) -> &Path {
        &self.temp
    }

    /// Durable artifact directory
    pub fn final_dir(&self) -> &Path {
        &self.final_dir
    }

    /// Create both subtrees if missing
    pub async fn ensure(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.temp).await?;
        tokio::fs::create_dir_all(&self.final_dir).await?;
        Ok(())
    }

    /// A uniquely named staging directory under `temp/`, removed on drop
    pub async fn request_staging(&self) -> Result<TempDir> {
        self.ensure().await?;
        let temp = self.temp.clone();
        let staging = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("acq-").tempdir_in(temp)
        })
        .await
        .map_err(|e| std::io::Error::other(format!("staging task panicked: {}", e)))??;
        Ok(staging)
    }
}

/// Moves located artifacts from staging into `final/`
///
/// Name selection and the move run under one lock, so concurrent finalizers
/// in the same store never pick the same free name.
#[derive(Debug, Default)]
pub struct FinalizationStore {
    collision: FileCollisionAction,
    lock: Mutex<()>,
}

impl FinalizationStore {
    /// Create a store with the given collision policy
    pub fn new(collision: FileCollisionAction) -> Self {
        Self {
            collision,
            lock: Mutex::new(()),
        }
    }

    /// Relocate `artifact` into `layout`'s `final/` directory
    ///
    /// The storage name is, with `force_extension`, the sanitized stem of
    /// `name` (or of the artifact's file name) plus that extension;
    /// otherwise `name` as given, or the artifact's own file name. The
    /// display name is that requested storage name, before any collision
    /// suffix.
    ///
    /// The move is a same-filesystem rename; a staging area on another
    /// device fails instead of falling back to copy-and-delete. Every
    /// failure, including a missing source, is a
    /// [`MoveFailure`](Error::MoveFailure) carrying the best-known display
    /// name.
    pub async fn finalize(
        &self,
        artifact: Option<&Path>,
        name: Option<&str>,
        layout: &StorageLayout,
        force_extension: Option<&str>,
    ) -> Result<FinalArtifact> {
        let requested = requested_name(artifact, name, force_extension);
        let fail = |source: Option<PathBuf>, dest: Option<PathBuf>, reason: String| {
            Error::MoveFailure {
                source_path: source,
                dest_path: dest,
                display_name: requested.clone(),
                reason,
            }
        };

        let Some(artifact) = artifact else {
            return Err(fail(None, None, "no artifact to finalize".to_string()));
        };

        if Path::new(&requested).file_name().and_then(|n| n.to_str()) != Some(requested.as_str())
        {
            return Err(fail(
                Some(artifact.to_path_buf()),
                None,
                format!("storage name '{}' is not a plain file name", requested),
            ));
        }

        let source = std::path::absolute(artifact)
            .map_err(|e| fail(Some(artifact.to_path_buf()), None, e.to_string()))?;

        layout
            .ensure()
            .await
            .map_err(|e| fail(Some(source.clone()), None, e.to_string()))?;

        match tokio::fs::metadata(&source).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(fail(Some(source), None, "source is not a file".to_string()));
            }
            Err(e) => {
                return Err(fail(Some(source), None, format!("source missing: {}", e)));
            }
        }

        let desired = layout.final_dir().join(&requested);

        let _guard = self.lock.lock().await;
        let dest = get_unique_path(&desired, self.collision)
            .map_err(|e| fail(Some(source.clone()), Some(desired.clone()), e.to_string()))?;

        tokio::fs::rename(&source, &dest)
            .await
            .map_err(|e| fail(Some(source.clone()), Some(dest.clone()), e.to_string()))?;

        let storage_name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| requested.clone());

        tracing::info!(
            from = ?source,
            to = ?dest,
            display_name = %requested,
            "artifact finalized"
        );

        Ok(FinalArtifact {
            path: dest,
            storage_name,
            display_name: requested,
        })
    }
}

fn requested_name(artifact: Option<&Path>, name: Option<&str>, force_extension: Option<&str>) -> String {
    let own_name = artifact
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());
    let base = name.filter(|n| !n.is_empty()).or(own_name);

    match force_extension {
        Some(ext) => {
            let stem = base.map(strip_extension).unwrap_or_default();
            format!("{}.{}", sanitize(stem), ext)
        }
        None => base
            .map(str::to_string)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

// Titles may contain separators, so the extension is split off textually
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i > 0 && !name[i + 1..].contains(['/', '\\', ' ']) => &name[..i],
        _ => name,
    }
}
