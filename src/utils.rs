//! Utility functions for file operations and path manipulation

use crate::config::FileCollisionAction;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Get a unique path for a file, handling collisions according to the specified action
///
/// For `Rename`, returns `path` itself when free, otherwise the first free
/// `stem (n).ext`. For `Skip`, an existing file is an
/// [`io::ErrorKind::AlreadyExists`] error. `Overwrite` returns `path` unchanged.
///
/// The check is not atomic; callers racing on the same directory must
/// serialize around it.
///
/// # Examples
///
/// ```
/// use media_acquire::utils::get_unique_path;
/// use media_acquire::config::FileCollisionAction;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/Song.mp3");
/// let unique = get_unique_path(path, FileCollisionAction::Rename).unwrap();
/// // If /tmp/Song.mp3 exists, returns /tmp/Song (1).mp3
/// ```
pub fn get_unique_path(path: &Path, action: FileCollisionAction) -> io::Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip => {
            if path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", path.display()),
                ));
            }
            Ok(path.to_path_buf())
        }
        FileCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path.to_path_buf());
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| invalid_path(path, "cannot extract file stem"))?;
            let extension = path.extension().and_then(|e| e.to_str());
            let parent = path
                .parent()
                .ok_or_else(|| invalid_path(path, "cannot extract parent directory"))?;

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let candidate = match extension {
                    Some(ext) => format!("{} ({}).{}", stem, i, ext),
                    None => format!("{} ({})", stem, i),
                };
                let candidate = parent.join(candidate);
                if !candidate.exists() {
                    return Ok(candidate);
                }
            }

            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "no free name for {} after {} attempts",
                    path.display(),
                    MAX_RENAME_ATTEMPTS
                ),
            ))
        }
    }
}

fn invalid_path(path: &Path, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{}: {}", path.display(), reason),
    )
}

/// Random 32-character hex token for staging names that must not derive from titles
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| format!("{:02x}", rng.r#gen::<u8>())).collect()
}

/// Creation time of a file, falling back to modification time
///
/// Some filesystems do not record birth time; the modification time is the
/// closest ordering key there.
pub fn file_timestamp(metadata: &std::fs::Metadata) -> io::Result<DateTime<Utc>> {
    let time = metadata.created().or_else(|_| metadata.modified())?;
    Ok(DateTime::<Utc>::from(time))
}
