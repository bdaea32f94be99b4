//! Open document tracking
//!
//! Content is stored behind an `Arc` so requests take cheap snapshots and
//! never hold a map guard across an await point.

use crate::resolver::DocumentSnapshot;
use dashmap::DashMap;
use std::sync::Arc;
use tower_lsp::lsp_types::Url;

/// Manages open documents in the LSP session
#[derive(Debug, Default)]
pub struct DocumentManager {
    documents: DashMap<Url, DocumentState>,
}

/// State of an open document
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub content: Arc<str>,
    pub version: i32,
}

impl DocumentManager {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    pub fn open(&self, uri: Url, content: String, version: i32) {
        self.documents.insert(
            uri,
            DocumentState {
                content: content.into(),
                version,
            },
        );
    }

    /// Full content replacement; ignored for documents that are not open
    pub fn update(&self, uri: &Url, content: String, version: i32) {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            doc.content = content.into();
            doc.version = version;
        }
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Current version of a document as a resolver snapshot
    pub fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        self.documents
            .get(uri)
            .map(|doc| DocumentSnapshot::new(uri.clone(), doc.version, doc.content.clone()))
    }

    /// Snapshots of every open document
    pub fn snapshots(&self) -> Vec<DocumentSnapshot> {
        self.documents
            .iter()
            .map(|entry| {
                DocumentSnapshot::new(entry.key().clone(), entry.version, entry.content.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_uri(path: &str) -> Url {
        Url::parse(&format!("file://{}", path)).unwrap()
    }

    #[test]
    fn test_open_and_snapshot() {
        let manager = DocumentManager::new();
        let uri = test_uri("/app/main.py");
        manager.open(uri.clone(), "ui.button()".to_string(), 1);

        let snap = manager.snapshot(&uri).unwrap();
        assert_eq!(&*snap.text, "ui.button()");
        assert_eq!(snap.version, 1);
        assert_eq!(snap.uri, uri);
    }

    #[test]
    fn test_update_bumps_version() {
        let manager = DocumentManager::new();
        let uri = test_uri("/app/main.py");
        manager.open(uri.clone(), "old".to_string(), 1);
        let before = manager.snapshot(&uri).unwrap();
        manager.update(&uri, "new".to_string(), 2);

        let after = manager.snapshot(&uri).unwrap();
        assert_eq!(&*after.text, "new");
        assert_eq!(after.version, 2);
        // Earlier snapshots are unaffected
        assert_eq!(&*before.text, "old");
    }

    #[test]
    fn test_update_nonexistent_document() {
        let manager = DocumentManager::new();
        let uri = test_uri("/nonexistent.py");
        manager.update(&uri, "content".to_string(), 1);
        assert!(manager.snapshot(&uri).is_none());
    }

    #[test]
    fn test_close_document() {
        let manager = DocumentManager::new();
        let a = test_uri("/a.py");
        let b = test_uri("/b.py");
        manager.open(a.clone(), String::new(), 1);
        manager.open(b.clone(), String::new(), 1);
        manager.close(&a);

        assert!(manager.snapshot(&a).is_none());
        let open = manager.snapshots();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].uri, b);
    }
}
