//! Knowledge base loading from the assets directory.
//!
//! Every table is loaded independently. A missing or malformed file is
//! logged and replaced by an empty table so the server keeps running with
//! whatever data is available.

use super::types::{Component, GenericLists};
use super::KnowledgeBase;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const COMPONENTS_FILE: &str = "quasar_components.json";
pub const LISTS_FILE: &str = "quasar_lists.json";
pub const CLASSES_FILE: &str = "tailwind_classes.json";
pub const ICONS_FILE: &str = "material_icons.json";
pub const FUNCTIONS_FILE: &str = "nicegui_functions.json";
pub const CLASS_MAP_FILE: &str = "nicegui_to_quasar_map.json";

/// Errors that can occur when loading a knowledge base table.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to read a file.
    #[error("Failed to read {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse a JSON file.
    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: PathBuf,
        source: serde_json::Error,
    },
}

/// Read and parse one JSON table.
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        file: path.to_path_buf(),
        source,
    })
}

/// Load a table, degrading to its default value on failure.
fn load_or_default<T: DeserializeOwned + Default>(dir: &Path, file: &str) -> T {
    match load_table(&dir.join(file)) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("{}; using an empty table", e);
            T::default()
        }
    }
}

/// Load every table from an assets directory.
pub fn load_dir(dir: &Path) -> KnowledgeBase {
    let components: HashMap<String, Component> = load_or_default(dir, COMPONENTS_FILE);
    let generic: GenericLists = load_or_default(dir, LISTS_FILE);
    let utility_classes: Vec<String> = load_or_default(dir, CLASSES_FILE);
    let icons: Vec<String> = load_or_default(dir, ICONS_FILE);
    let ui_functions: Vec<String> = load_or_default(dir, FUNCTIONS_FILE);
    let class_map: HashMap<String, String> = load_or_default(dir, CLASS_MAP_FILE);

    tracing::info!(
        "Knowledge base loaded from {}: {} components, {} icons, {} utility classes",
        dir.display(),
        components.len(),
        icons.len(),
        utility_classes.len()
    );

    KnowledgeBase {
        components,
        generic,
        utility_classes,
        icons,
        ui_functions,
        class_map,
    }
}

/// Find the assets directory.
///
/// Candidates are tried relative to the workspace root (if any), then the
/// running executable and its ancestors (covers `target/debug` layouts), then
/// the crate's own `assets/` directory.
pub fn find_assets_dir(search_paths: &[String], workspace_root: Option<&Path>) -> Option<PathBuf> {
    let mut bases: Vec<PathBuf> = Vec::new();
    if let Some(root) = workspace_root {
        bases.push(root.to_path_buf());
    }
    if let Ok(exe) = std::env::current_exe() {
        bases.extend(exe.ancestors().skip(1).take(4).map(Path::to_path_buf));
    }

    for base in &bases {
        for search_path in search_paths {
            let candidate = base.join(search_path);
            if candidate.join(COMPONENTS_FILE).exists() {
                return Some(candidate);
            }
        }
    }

    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
    bundled.join(COMPONENTS_FILE).exists().then_some(bundled)
}
