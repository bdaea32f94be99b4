//! Language server implementation
//!
//! Completion and hover are served for Python documents; the navigation and
//! preview features are exposed as workspace commands.

use super::config::EngineConfig;
use super::convert;
use super::document::DocumentManager;
use crate::completions::{assemble, complete_ui_functions};
use crate::context::{capture_ui_function, classify_with_lookback};
use crate::hover;
use crate::kb::{self, KnowledgeBase};
use crate::navigation::{find_companion, NavigationError};
use crate::preview::PreviewHost;
use crate::resolver::{ClassResolver, ExternalAnalyzer, Supersession, TypeOracle};
use crate::text::LineIndex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

pub const SWITCH_COMMAND: &str = "nicegui.switchScriptComponent";
pub const OPEN_PREVIEW_COMMAND: &str = "nicegui.openPreview";
pub const DISPOSE_PREVIEW_COMMAND: &str = "nicegui.disposePreview";

/// NiceGUI language server
pub struct LspServer {
    client: Client,
    documents: DocumentManager,
    config: RwLock<EngineConfig>,
    kb: RwLock<Arc<KnowledgeBase>>,
    resolver: RwLock<Arc<ClassResolver>>,
    workspace_root: RwLock<Option<PathBuf>>,
    completion_requests: Supersession,
    hover_requests: Supersession,
    preview: PreviewHost,
}

impl LspServer {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, EngineConfig::default())
    }

    /// Create with configuration; a workspace config file found during
    /// `initialize` replaces it
    pub fn with_config(client: Client, config: EngineConfig) -> Self {
        let kb = Arc::new(KnowledgeBase::default());
        Self {
            client,
            documents: DocumentManager::new(),
            config: RwLock::new(config),
            resolver: RwLock::new(Arc::new(ClassResolver::offline(kb.clone()))),
            kb: RwLock::new(kb),
            workspace_root: RwLock::new(None),
            completion_requests: Supersession::new(),
            hover_requests: Supersession::new(),
            preview: PreviewHost::new(),
        }
    }

    /// Server capabilities for the current configuration
    pub fn capabilities(config: &EngineConfig) -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(config.trigger_characters()),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![
                    SWITCH_COMMAND.to_string(),
                    OPEN_PREVIEW_COMMAND.to_string(),
                    DISPOSE_PREVIEW_COMMAND.to_string(),
                ],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn config(&self) -> RwLockReadGuard<'_, EngineConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn config_mut(&self) -> RwLockWriteGuard<'_, EngineConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }

    fn knowledge_base(&self) -> Arc<KnowledgeBase> {
        self.kb.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn class_resolver(&self) -> Arc<ClassResolver> {
        self.resolver.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_resolver(&self, resolver: ClassResolver) {
        *self.resolver.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(resolver);
    }

    fn oracle(&self) -> Option<Arc<dyn TypeOracle>> {
        self.class_resolver().oracle().cloned()
    }

    /// Load the knowledge base for the discovered workspace
    fn load_knowledge_base(&self, root: Option<&PathBuf>) {
        let search_paths = self.config().assets.search_paths.clone();
        let kb = match kb::find_assets_dir(&search_paths, root.map(PathBuf::as_path)) {
            Some(dir) => kb::load_dir(&dir),
            None => {
                tracing::warn!("No knowledge base assets found; completions will be empty");
                KnowledgeBase::default()
            }
        };
        let kb = Arc::new(kb);
        let capacity = self.config().completion.cache_capacity;
        self.set_resolver(ClassResolver::new(kb.clone(), None, capacity));
        *self.kb.write().unwrap_or_else(|e| e.into_inner()) = kb;
    }

    /// Start the external analysis service and replay open documents to it
    async fn start_analyzer(&self) {
        let (enabled, command, capacity) = {
            let config = self.config();
            (
                config.analyzer.enabled,
                config.analyzer.command.clone(),
                config.completion.cache_capacity,
            )
        };
        if !enabled {
            tracing::info!("Analysis service disabled; using generic lists");
            return;
        }

        let root = self
            .workspace_root
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .and_then(|path| Url::from_directory_path(path).ok());

        match ExternalAnalyzer::spawn(&command, root.as_ref()).await {
            Ok(analyzer) => {
                let oracle: Arc<dyn TypeOracle> = Arc::new(analyzer);
                for doc in self.documents.snapshots() {
                    if is_python(&doc.uri) {
                        if let Err(e) = oracle.did_open(&doc.uri, doc.version, &doc.text).await {
                            tracing::debug!("Failed to forward {}: {}", doc.uri, e);
                        }
                    }
                }
                self.set_resolver(ClassResolver::new(self.knowledge_base(), Some(oracle), capacity));
            }
            Err(e) => {
                tracing::warn!("Analysis service unavailable: {}", e);
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Type analysis unavailable ({}); completions use generic lists", e),
                    )
                    .await;
            }
        }
    }

    async fn switch_script_component(&self, arguments: &[Value]) -> Result<Option<Value>> {
        let Some(uri) = arguments
            .first()
            .and_then(Value::as_str)
            .and_then(|s| Url::parse(s).ok())
        else {
            self.client
                .show_message(MessageType::INFO, "Open a Python/Vue/JS file first.")
                .await;
            return Ok(None);
        };
        let Ok(path) = uri.to_file_path() else {
            return Err(Error::invalid_params(format!("Not a file URI: {}", uri)));
        };

        match find_companion(&path) {
            Ok(target) => {
                let Ok(target_uri) = Url::from_file_path(&target) else {
                    return Ok(None);
                };
                let params = ShowDocumentParams {
                    uri: target_uri.clone(),
                    external: None,
                    take_focus: Some(true),
                    selection: None,
                };
                if let Err(e) = self.client.show_document(params).await {
                    tracing::warn!("Client could not show {}: {}", target_uri, e);
                }
                Ok(Some(Value::String(target_uri.to_string())))
            }
            Err(e @ NavigationError::NotFound(_)) => {
                self.client.show_message(MessageType::WARNING, &e).await;
                Ok(None)
            }
            Err(e @ NavigationError::Unsupported(_)) => {
                self.client.show_message(MessageType::INFO, &e).await;
                Ok(None)
            }
        }
    }

    async fn open_preview(&self) -> Result<Option<Value>> {
        let url = self.config().preview.url.clone();
        match self.preview.open(&url) {
            Ok(action) => Ok(serde_json::to_value(action).ok()),
            Err(e) => {
                tracing::error!("{}", e);
                self.client.show_message(MessageType::ERROR, &e).await;
                Ok(None)
            }
        }
    }
}

/// Completion and hover only understand Python sources
fn is_python(uri: &Url) -> bool {
    uri.path().ends_with(".py")
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("{} initializing", self.config().engine.name);

        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri.clone())
            .and_then(|uri| uri.to_file_path().ok());

        if let Some(root) = &root {
            if self.config().engine.workspace_discovery {
                *self.config_mut() = EngineConfig::load_default(root);
            }
        }
        if let Some(options) = &params.initialization_options {
            self.config_mut().apply_client_settings(options);
        }

        self.load_knowledge_base(root.as_ref());
        *self.workspace_root.write().unwrap_or_else(|e| e.into_inner()) = root;

        let config = self.config().clone();
        Ok(InitializeResult {
            capabilities: Self::capabilities(&config),
            server_info: Some(ServerInfo {
                name: config.engine.name.clone(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.start_analyzer().await;

        let name = self.config().engine.name.clone();
        tracing::info!("{} initialized", name);
        self.client
            .log_message(MessageType::INFO, format!("{} ready", name))
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("{} shutting down", self.config().engine.name);
        if let Some(oracle) = self.oracle() {
            oracle.shutdown().await;
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        tracing::debug!("Document opened: {}", doc.uri);

        if is_python(&doc.uri) {
            if let Some(oracle) = self.oracle() {
                if let Err(e) = oracle.did_open(&doc.uri, doc.version, &doc.text).await {
                    tracing::debug!("Failed to forward open of {}: {}", doc.uri, e);
                }
            }
        }
        self.documents.open(doc.uri, doc.text, doc.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        if let Some(change) = params.content_changes.into_iter().last() {
            if is_python(&uri) {
                if let Some(oracle) = self.oracle() {
                    if let Err(e) = oracle.did_change(&uri, version, &change.text).await {
                        tracing::debug!("Failed to forward change of {}: {}", uri, e);
                    }
                }
            }
            self.documents.update(&uri, change.text, version);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!("Document closed: {}", uri);
        self.documents.close(&uri);
        self.completion_requests.forget(&uri);
        self.hover_requests.forget(&uri);

        if is_python(&uri) {
            if let Some(oracle) = self.oracle() {
                if let Err(e) = oracle.did_close(&uri).await {
                    tracing::debug!("Failed to forward close of {}: {}", uri, e);
                }
            }
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let settings = params.settings.get("nicegui").unwrap_or(&params.settings);
        let mut config = self.config_mut();
        let before = config.completion.enable_string_suggestions;
        config.apply_client_settings(settings);
        if config.completion.enable_string_suggestions != before {
            tracing::info!(
                "String suggestions {}; advertised quote triggers update on restart",
                if before { "disabled" } else { "enabled" }
            );
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        if !is_python(uri) {
            return Ok(None);
        }
        let trigger = params
            .context
            .as_ref()
            .and_then(|c| c.trigger_character.as_deref());
        if !self.config().accepts_trigger(trigger) {
            return Ok(None);
        }
        let Some(doc) = self.documents.snapshot(uri) else {
            return Ok(None);
        };
        let cancel = self.completion_requests.begin(uri);
        let kb = self.knowledge_base();
        let lookback = self.config().completion.lookback_chars;

        let index = LineIndex::new(&doc.text);
        let offset = index.offset_at(position);

        let candidates = if let Some(ui) = capture_ui_function(&doc.text, offset) {
            complete_ui_functions(&kb, &ui)
        } else {
            let Some(ctx) = classify_with_lookback(&doc.text, offset, lookback) else {
                return Ok(None);
            };
            tracing::debug!("completion context {} ({:?})", ctx.kind, ctx.word);

            let class_name = match ctx.kind.attribute_kind() {
                Some(_) => {
                    let resolver = self.class_resolver();
                    resolver.resolve_class(&doc, ctx.kind, ctx.match_start, &cancel).await
                }
                None => None,
            };
            if cancel.is_cancelled() {
                return Ok(None);
            }
            assemble(&kb, &ctx, class_name.as_deref())
        };

        let items = candidates
            .iter()
            .map(|item| convert::to_lsp_completion(item, &index))
            .collect();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        if !is_python(uri) {
            return Ok(None);
        }
        let Some(doc) = self.documents.snapshot(uri) else {
            return Ok(None);
        };
        let lookback = self.config().completion.lookback_chars;
        let index = LineIndex::new(&doc.text);
        let offset = index.offset_at(position);

        let Some(ctx) = classify_with_lookback(&doc.text, offset, lookback) else {
            return Ok(None);
        };
        if ctx.word.is_empty() {
            return Ok(None);
        }

        let class_name = match ctx.kind.attribute_kind() {
            Some(_) => {
                let cancel = self.hover_requests.begin(uri);
                let resolver = self.class_resolver();
                resolver.resolve_class(&doc, ctx.kind, ctx.match_start, &cancel).await
            }
            None => None,
        };

        let kb = self.knowledge_base();
        Ok(hover::hover(&kb, &ctx, class_name.as_deref()).map(|info| convert::to_lsp_hover(&info, &index)))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        tracing::debug!("executeCommand {}", params.command);
        match params.command.as_str() {
            SWITCH_COMMAND => self.switch_script_component(&params.arguments).await,
            OPEN_PREVIEW_COMMAND => self.open_preview().await,
            DISPOSE_PREVIEW_COMMAND => Ok(Some(Value::Bool(self.preview.dispose()))),
            other => Err(Error::invalid_params(format!("Unknown command: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_follow_config() {
        let mut config = EngineConfig::default();
        let caps = LspServer::capabilities(&config);
        let triggers = caps.completion_provider.unwrap().trigger_characters.unwrap();
        assert!(triggers.contains(&"\"".to_string()));

        let commands = caps.execute_command_provider.unwrap().commands;
        assert_eq!(commands.len(), 3);
        assert!(commands.contains(&SWITCH_COMMAND.to_string()));

        config.completion.enable_string_suggestions = false;
        let caps = LspServer::capabilities(&config);
        let triggers = caps.completion_provider.unwrap().trigger_characters.unwrap();
        assert!(!triggers.contains(&"\"".to_string()));
    }

    #[test]
    fn test_is_python() {
        assert!(is_python(&Url::parse("file:///app/main.py").unwrap()));
        assert!(!is_python(&Url::parse("file:///app/chart.vue").unwrap()));
        assert!(!is_python(&Url::parse("file:///app/setup.pyc").unwrap()));
    }
}
