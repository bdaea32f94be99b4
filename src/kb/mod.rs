//! Knowledge base
//!
//! Static tables loaded once at startup and shared read-only afterwards:
//! component metadata, generic attribute lists, utility classes, icon names,
//! the exported `ui` names and the framework class-name map. The CSS catalog
//! is compiled in.

pub mod css;
pub mod loader;
pub mod types;

pub use loader::{find_assets_dir, load_dir, LoadError};
pub use types::{strip_quotes, Attribute, AttributeKind, Component, GenericLists, ValueType};

use std::collections::HashMap;

/// All knowledge base tables
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    /// Component metadata keyed by library class name (e.g. `qbtn`)
    pub components: HashMap<String, Component>,
    /// Fallback lists used when no component is resolved
    pub generic: GenericLists,
    /// CSS utility classes
    pub utility_classes: Vec<String>,
    /// Icon names
    pub icons: Vec<String>,
    /// Names exported from the `ui` module
    pub ui_functions: Vec<String>,
    /// Framework class name -> component table key
    pub class_map: HashMap<String, String>,
}

impl KnowledgeBase {
    /// Look up a component; a miss is normal and means "use generic lists"
    pub fn component(&self, class_name: &str) -> Option<&Component> {
        self.components.get(class_name)
    }

    /// Look up a public attribute of a component
    pub fn attribute(
        &self,
        class_name: &str,
        kind: AttributeKind,
        name: &str,
    ) -> Option<&Attribute> {
        self.component(class_name)?.attributes(kind).get(name)
    }

    pub fn is_icon(&self, name: &str) -> bool {
        self.icons.iter().any(|icon| icon == name)
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        KnowledgeBaseStats {
            components: self.components.len(),
            icons: self.icons.len(),
            utility_classes: self.utility_classes.len(),
            ui_functions: self.ui_functions.len(),
            mapped_classes: self.class_map.len(),
        }
    }
}

/// Table sizes, reported by the CLI
#[derive(Debug, Clone, serde::Serialize)]
pub struct KnowledgeBaseStats {
    pub components: usize,
    pub icons: usize,
    pub utility_classes: usize,
    pub ui_functions: usize,
    pub mapped_classes: usize,
}
