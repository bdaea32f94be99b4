//! Script/component companion file navigation.
//!
//! A Python element file may have a Vue or JavaScript component next to it
//! with the same stem; the command jumps between them.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Open a Python/Vue/JS file first: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("Related file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Companion files to try for `path`, in preference order
pub fn companion_candidates(path: &Path) -> Result<Vec<PathBuf>, NavigationError> {
    let extensions: &[&str] = match path.extension().and_then(|e| e.to_str()) {
        Some("py") => &["vue", "js"],
        Some("vue") | Some("js") => &["py"],
        _ => return Err(NavigationError::Unsupported(path.to_path_buf())),
    };
    Ok(extensions.iter().map(|ext| path.with_extension(ext)).collect())
}

/// First existing companion of `path`
pub fn find_companion(path: &Path) -> Result<PathBuf, NavigationError> {
    let candidates = companion_candidates(path)?;
    if let Some(found) = candidates.iter().find(|candidate| candidate.is_file()) {
        return Ok(found.clone());
    }
    let first = candidates.into_iter().next().unwrap_or_else(|| path.to_path_buf());
    Err(NavigationError::NotFound(first))
}
