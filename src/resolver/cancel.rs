//! Per-document request supersession.
//!
//! Every new request for a document bumps that document's generation; any
//! in-flight request holding an older generation is cancelled.

use dashmap::DashMap;
use std::future::pending;
use tokio::sync::watch;
use tower_lsp::lsp_types::Url;

/// Cancellation handle held by one request
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: Option<watch::Receiver<u64>>,
    generation: u64,
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self {
            receiver: None,
            generation: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.receiver {
            Some(receiver) => {
                *receiver.borrow() != self.generation || receiver.has_changed().is_err()
            }
            None => false,
        }
    }

    /// Resolves once a newer request has started or the document was closed
    pub async fn cancelled(&self) {
        let Some(receiver) = &self.receiver else {
            return pending().await;
        };
        let mut receiver = receiver.clone();
        loop {
            if *receiver.borrow_and_update() != self.generation {
                return;
            }
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Generation counters for open documents
#[derive(Debug, Default)]
pub struct Supersession {
    generations: DashMap<Url, watch::Sender<u64>>,
}

impl Supersession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `uri`, cancelling the previous one
    pub fn begin(&self, uri: &Url) -> CancelSignal {
        let sender = self
            .generations
            .entry(uri.clone())
            .or_insert_with(|| watch::channel(0).0);

        let mut generation = 0;
        sender.send_modify(|current| {
            *current += 1;
            generation = *current;
        });

        CancelSignal {
            receiver: Some(sender.subscribe()),
            generation,
        }
    }

    /// Drop the counter for a closed document, cancelling its requests
    pub fn forget(&self, uri: &Url) {
        self.generations.remove(uri);
    }
}
