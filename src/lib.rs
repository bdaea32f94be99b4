//! NiceGUI Language Server Protocol implementation
//!
//! Context-aware completion for the fluent element API of NiceGUI, backed by
//! Quasar component metadata, Tailwind utility classes and Material icons:
//!
//! - `.props(...)`, `.add_slot(...)`, `.on(...)`, `.run_method(...)`:
//!   component-specific attributes when the receiver's class is known
//! - `.classes(...)`: utility classes
//! - `.style(...)`: CSS properties and values
//! - `icon=` / `icon-right=`: icon names
//! - `ui.`: exported element functions
//!
//! # Architecture
//!
//! - **Context**: classifies the cursor with a bounded lookback scan
//! - **Resolver**: asks an external Python language server for the
//!   receiver's type and maps it to a component, with bounded caches
//! - **Completions**: assembles candidates from the knowledge base
//! - **Engine**: LSP server, YAML configuration and document tracking
//!
//! # Usage
//!
//! Run the language server via stdio:
//!
//! ```bash
//! nicegui-lsp
//! ```
//!
//! # Configuration
//!
//! Create a `.nicegui-lsp.yaml` in your workspace root:
//!
//! ```yaml
//! completion:
//!   enable_string_suggestions: true
//! analyzer:
//!   command: [pyright-langserver, --stdio]
//! preview:
//!   url: http://localhost:8080
//! ```

pub mod completions;
pub mod context;
pub mod engine;
pub mod hover;
pub mod kb;
pub mod navigation;
pub mod preview;
pub mod resolver;
pub mod style;
pub mod text;
pub mod types;

pub use context::{capture_ui_function, classify};
pub use engine::{Engine, EngineConfig, LspServer};
pub use kb::KnowledgeBase;
pub use resolver::{ClassResolver, TypeOracle};
pub use types::{CandidateItem, ContextKind, DocumentContext};
