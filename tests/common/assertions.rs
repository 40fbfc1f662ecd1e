//! Filesystem assertions over the output tree

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file below `root`, sorted
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// File names directly inside `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    files_under(dir)
        .into_iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect()
}

/// Assert that no request left anything behind in `temp/`
pub fn assert_staging_clean(temp_dir: &Path) {
    let leftovers = files_under(temp_dir);
    assert!(
        leftovers.is_empty(),
        "staging should be empty after requests end, found {:?}",
        leftovers
    );
    if temp_dir.exists() {
        let dirs = std::fs::read_dir(temp_dir).unwrap().count();
        assert_eq!(dirs, 0, "per-request staging directories should be removed");
    }
}
