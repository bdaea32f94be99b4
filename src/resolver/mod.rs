//! Class resolver
//!
//! Maps the receiver of a builder call to a component table key by asking an
//! external type-analysis service for hover information around the call and
//! reading a class name out of the reply. Every failure collapses to `None`;
//! callers then fall back to the generic lists.

pub mod cache;
pub mod cancel;
pub mod client;
pub mod names;
pub mod oracle;
pub mod patterns;
pub mod transport;

pub use cache::{BoundedCache, DEFAULT_CAPACITY};
pub use cancel::{CancelSignal, Supersession};
pub use client::ExternalAnalyzer;
pub use oracle::{OracleError, TypeOracle};

use crate::kb::KnowledgeBase;
use crate::text::{shift_chars, LineIndex};
use crate::types::ContextKind;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_lsp::lsp_types::Url;
use tracing::{debug, trace};

/// Immutable view of one document version
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub uri: Url,
    pub version: i32,
    pub text: Arc<str>,
}

impl DocumentSnapshot {
    pub fn new(uri: Url, version: i32, text: impl Into<Arc<str>>) -> Self {
        Self {
            uri,
            version,
            text: text.into(),
        }
    }
}

type HoverKey = (Url, i32, u32, u32);
type ClassKey = (Url, i32, ContextKind, usize);

/// The request was superseded while waiting on the service
struct Superseded;

/// Why a single hover query produced no body
enum Interrupted {
    Superseded,
    Failed,
}

/// Outcome of the hover stages
struct Lookup {
    name: Option<String>,
    /// Some query errored, so a missing name is not a real answer
    failed: bool,
}

/// One hover query: character shift from the attribute start and the
/// extractor applied to the body
struct Stage {
    shift: isize,
    extract: fn(&str) -> Option<String>,
}

/// Attribute accessor query, tried first for kinds that have one
fn accessor_stage(kind: ContextKind) -> Option<Stage> {
    let extract: fn(&str) -> Option<String> = match kind {
        ContextKind::Classes | ContextKind::Props | ContextKind::Style => patterns::accessor_owner,
        ContextKind::Events => patterns::event_owner,
        _ => return None,
    };
    Some(Stage { shift: 1, extract })
}

/// Receiver and declaration queries used when the accessor says nothing
const FALLBACK_STAGES: [Stage; 2] = [
    Stage {
        shift: -1,
        extract: patterns::variable_type,
    },
    Stage {
        shift: -3,
        extract: patterns::declared_class,
    },
];

/// Resolves component class names with bounded caching
pub struct ClassResolver {
    kb: Arc<KnowledgeBase>,
    oracle: Option<Arc<dyn TypeOracle>>,
    hovers: Mutex<BoundedCache<HoverKey, Option<String>>>,
    classes: Mutex<BoundedCache<ClassKey, Option<String>>>,
}

impl ClassResolver {
    pub fn new(kb: Arc<KnowledgeBase>, oracle: Option<Arc<dyn TypeOracle>>, capacity: usize) -> Self {
        Self {
            kb,
            oracle,
            hovers: Mutex::new(BoundedCache::new(capacity)),
            classes: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    /// A resolver with no service; every lookup yields `None`
    pub fn offline(kb: Arc<KnowledgeBase>) -> Self {
        Self::new(kb, None, DEFAULT_CAPACITY)
    }

    pub fn oracle(&self) -> Option<&Arc<dyn TypeOracle>> {
        self.oracle.as_ref()
    }

    /// Resolve the component class for the call whose attribute accessor
    /// starts at `offset`.
    ///
    /// Results, including `None`, are cached per document version. A request
    /// cancelled by `cancel` returns `None` and caches nothing, and so does a
    /// lookup in which the service failed to answer a query.
    pub async fn resolve_class(
        &self,
        doc: &DocumentSnapshot,
        kind: ContextKind,
        offset: usize,
        cancel: &CancelSignal,
    ) -> Option<String> {
        let key = (doc.uri.clone(), doc.version, kind, offset);
        if let Some(cached) = lock(&self.classes).get(&key) {
            trace!("class cache hit at {}: {:?}", offset, cached);
            return cached.clone();
        }

        let oracle = self.oracle.as_ref().filter(|o| o.is_available())?;
        let Ok(lookup) = self.determine_type_name(oracle.as_ref(), doc, kind, offset, cancel).await
        else {
            debug!("class resolution at {} superseded", offset);
            return None;
        };

        let class = lookup
            .name
            .map(|name| names::map_class_name(&self.kb.class_map, &name));
        debug!("resolved {} call at {} to {:?}", kind, offset, class);
        if lookup.failed {
            debug!("not caching class at {}: service errors during lookup", offset);
        } else {
            lock(&self.classes).insert(key, class.clone());
        }
        class
    }

    async fn determine_type_name(
        &self,
        oracle: &dyn TypeOracle,
        doc: &DocumentSnapshot,
        kind: ContextKind,
        offset: usize,
        cancel: &CancelSignal,
    ) -> Result<Lookup, Superseded> {
        let mut failed = false;
        for stage in accessor_stage(kind).into_iter().chain(FALLBACK_STAGES) {
            let at = shift_chars(&doc.text, offset, stage.shift);
            match self.hover_at(oracle, doc, at, cancel).await {
                Ok(Some(body)) => {
                    if let Some(name) = (stage.extract)(&body) {
                        return Ok(Lookup {
                            name: Some(name),
                            failed,
                        });
                    }
                }
                Ok(None) => {}
                Err(Interrupted::Failed) => failed = true,
                Err(Interrupted::Superseded) => return Err(Superseded),
            }
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            let at = shift_chars(&doc.text, offset, -1);
            let position = LineIndex::new(&doc.text).position_at(at);
            let found = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Superseded),
                found = oracle.type_definition(&doc.uri, position) => found,
            };
            if let Ok(found) = found {
                trace!("no class at {}; type definition present: {}", offset, found);
            }
        }
        Ok(Lookup { name: None, failed })
    }

    async fn hover_at(
        &self,
        oracle: &dyn TypeOracle,
        doc: &DocumentSnapshot,
        offset: usize,
        cancel: &CancelSignal,
    ) -> Result<Option<String>, Interrupted> {
        let position = LineIndex::new(&doc.text).position_at(offset);
        let key = (doc.uri.clone(), doc.version, position.line, position.character);
        if let Some(cached) = lock(&self.hovers).get(&key) {
            return Ok(cached.clone());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Interrupted::Superseded),
            response = oracle.hover(&doc.uri, position) => response,
        };
        if cancel.is_cancelled() {
            return Err(Interrupted::Superseded);
        }

        match response {
            Ok(body) => {
                trace!("hover {}:{} -> {:?}", position.line, position.character, body);
                lock(&self.hovers).insert(key, body.clone());
                Ok(body)
            }
            Err(e) => {
                debug!("hover {}:{} failed: {}", position.line, position.character, e);
                Err(Interrupted::Failed)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tower_lsp::lsp_types::Position;

    /// Serves canned hover bodies keyed by position and counts calls
    #[derive(Default)]
    struct ScriptedOracle {
        hovers: HashMap<(u32, u32), String>,
        calls: AtomicUsize,
        failing: AtomicBool,
        offline: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedOracle {
        fn with(mut self, line: u32, character: u32, body: &str) -> Self {
            self.hovers.insert((line, character), body.to_string());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[tower_lsp::async_trait]
    impl TypeOracle for ScriptedOracle {
        fn is_available(&self) -> bool {
            !self.offline.load(Ordering::SeqCst)
        }

        async fn hover(&self, _uri: &Url, position: Position) -> Result<Option<String>, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(OracleError::Closed);
            }
            Ok(self.hovers.get(&(position.line, position.character)).cloned())
        }

        async fn type_definition(&self, _uri: &Url, _position: Position) -> Result<bool, OracleError> {
            Ok(false)
        }
    }

    // `b.props('` with the accessor dot at offset 1
    const SOURCE: &str = "b.props('fl')";

    fn doc(version: i32) -> DocumentSnapshot {
        DocumentSnapshot::new(Url::parse("file:///app/main.py").unwrap(), version, SOURCE)
    }

    fn resolver(oracle: ScriptedOracle) -> (ClassResolver, Arc<ScriptedOracle>) {
        let oracle = Arc::new(oracle);
        let mut kb = KnowledgeBase::default();
        kb.class_map.insert("Upload".to_string(), "quploader".to_string());
        let resolver = ClassResolver::new(Arc::new(kb), Some(oracle.clone()), 8);
        (resolver, oracle)
    }

    #[tokio::test]
    async fn test_accessor_hover_resolves() {
        let (resolver, oracle) =
            resolver(ScriptedOracle::default().with(0, 2, "(property) props: Props[Self@Button]"));
        let class = resolver
            .resolve_class(&doc(1), ContextKind::Props, 1, &CancelSignal::never())
            .await;
        assert_eq!(class.as_deref(), Some("qbtn"));
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_to_receiver_hover() {
        let (resolver, _) = resolver(ScriptedOracle::default().with(0, 0, "(variable) b: Upload"));
        let class = resolver
            .resolve_class(&doc(1), ContextKind::Props, 1, &CancelSignal::never())
            .await;
        assert_eq!(class.as_deref(), Some("quploader"));
    }

    #[tokio::test]
    async fn test_methods_skip_accessor_stage() {
        let (resolver, oracle) =
            resolver(ScriptedOracle::default().with(0, 2, "(property) props: Props[Self@Button]"));
        let class = resolver
            .resolve_class(&doc(1), ContextKind::Methods, 1, &CancelSignal::never())
            .await;
        assert!(class.is_none());
        // offset - 1 and offset - 3 (clamped to the same start position)
        assert_eq!(oracle.calls(), 1);
    }

    #[tokio::test]
    async fn test_cached_per_version() {
        let (resolver, oracle) =
            resolver(ScriptedOracle::default().with(0, 2, "props: Props[Card]"));
        let never = CancelSignal::never();

        let first = resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await;
        let second = resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await;
        assert_eq!(first, second);
        assert_eq!(oracle.calls(), 1);

        let bumped = resolver.resolve_class(&doc(2), ContextKind::Props, 1, &never).await;
        assert_eq!(bumped.as_deref(), Some("qcard"));
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_negative_result_is_cached() {
        let (resolver, oracle) = resolver(ScriptedOracle::default());
        let never = CancelSignal::never();

        assert!(resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await.is_none());
        let calls = oracle.calls();
        assert!(calls > 0);
        assert!(resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await.is_none());
        assert_eq!(oracle.calls(), calls);
    }

    #[tokio::test]
    async fn test_service_errors_become_none() {
        let (resolver, _) = resolver(ScriptedOracle {
            failing: AtomicBool::new(true),
            ..Default::default()
        });
        let class = resolver
            .resolve_class(&doc(1), ContextKind::Events, 1, &CancelSignal::never())
            .await;
        assert!(class.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_retried_after_recovery() {
        let (resolver, oracle) = resolver(ScriptedOracle {
            failing: AtomicBool::new(true),
            ..ScriptedOracle::default().with(0, 2, "props: Props[Card]")
        });
        let never = CancelSignal::never();

        assert!(resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await.is_none());
        let calls = oracle.calls();
        assert!(calls > 0);

        oracle.failing.store(false, Ordering::SeqCst);
        let recovered = resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await;
        assert_eq!(recovered.as_deref(), Some("qcard"));
        assert!(oracle.calls() > calls);

        // Now answered, so the same version is served from the cache
        let calls = oracle.calls();
        let cached = resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await;
        assert_eq!(cached.as_deref(), Some("qcard"));
        assert_eq!(oracle.calls(), calls);
    }

    #[tokio::test]
    async fn test_unavailable_or_missing_service() {
        let (resolver, oracle) = resolver(ScriptedOracle::default().with(0, 2, "props: Props[Card]"));
        oracle.offline.store(true, Ordering::SeqCst);
        let never = CancelSignal::never();
        assert!(resolver.resolve_class(&doc(1), ContextKind::Props, 1, &never).await.is_none());
        assert_eq!(oracle.calls(), 0);

        let offline = ClassResolver::offline(Arc::new(KnowledgeBase::default()));
        assert!(offline.resolve_class(&doc(1), ContextKind::Props, 1, &never).await.is_none());
    }

    #[tokio::test]
    async fn test_superseded_request_skips_cache() {
        let gate = Arc::new(Notify::new());
        let (resolver, oracle) = resolver(ScriptedOracle {
            gate: Some(gate.clone()),
            ..ScriptedOracle::default().with(0, 2, "props: Props[Card]")
        });
        let resolver = Arc::new(resolver);
        let supersession = Supersession::new();
        let uri = doc(1).uri;

        let signal = supersession.begin(&uri);
        let pending = {
            let resolver = resolver.clone();
            tokio::spawn(async move {
                resolver
                    .resolve_class(&doc(1), ContextKind::Props, 1, &signal)
                    .await
            })
        };
        while oracle.calls() == 0 {
            tokio::task::yield_now().await;
        }

        supersession.begin(&uri);
        assert!(pending.await.unwrap().is_none());

        // Nothing was cached, so a fresh request queries again and succeeds
        gate.notify_one();
        let fresh = resolver
            .resolve_class(&doc(1), ContextKind::Props, 1, &CancelSignal::never())
            .await;
        assert_eq!(fresh.as_deref(), Some("qcard"));
        assert_eq!(oracle.calls(), 2);
    }
}
