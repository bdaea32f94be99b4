//! LSP engine core
//!
//! Server, configuration, document tracking and LSP type conversion.

pub mod config;
pub mod convert;
pub mod document;
pub mod server;
pub mod standalone;

pub use config::{ConfigError, EngineConfig};
pub use document::DocumentManager;
pub use server::LspServer;
pub use standalone::Engine;
