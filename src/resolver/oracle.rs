//! Interface to the external type-analysis service.

use super::transport::TransportError;
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("analysis service is not running")]
    Unavailable,
    #[error("analysis service closed the connection")]
    Closed,
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("analysis service error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("analysis service did not answer {0} in time")]
    Timeout(&'static str),
    #[error("failed to start analysis service: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A service that answers type questions about Python sources.
///
/// Implementations keep their own view of open documents in sync through
/// the notification methods; the defaults ignore them.
#[tower_lsp::async_trait]
pub trait TypeOracle: Send + Sync {
    /// Whether the service can currently answer queries
    fn is_available(&self) -> bool;

    /// Hover body at a position, flattened to text
    async fn hover(&self, uri: &Url, position: Position) -> Result<Option<String>, OracleError>;

    /// Whether a type definition exists at a position
    async fn type_definition(&self, uri: &Url, position: Position) -> Result<bool, OracleError>;

    async fn did_open(&self, _uri: &Url, _version: i32, _text: &str) -> Result<(), OracleError> {
        Ok(())
    }

    async fn did_change(&self, _uri: &Url, _version: i32, _text: &str) -> Result<(), OracleError> {
        Ok(())
    }

    async fn did_close(&self, _uri: &Url) -> Result<(), OracleError> {
        Ok(())
    }

    async fn shutdown(&self) {}
}
