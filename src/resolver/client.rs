//! Child-process language server used as the type oracle.
//!
//! Requests are correlated with responses by id through a pending map that a
//! reader task drains. Requests the server sends to us are answered with
//! empty results so it never blocks waiting on the client.

use super::oracle::{OracleError, TypeOracle};
use super::patterns::hover_text;
use super::transport::{read_message, write_message, TransportError};
use dashmap::DashMap;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tower_lsp::lsp_types::{Hover, Position, Url};
use tracing::{debug, info, trace, warn};

/// Handshake and shutdown budget
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

type SharedWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;
type PendingMap = Arc<DashMap<i64, oneshot::Sender<Result<Value, OracleError>>>>;

/// Connection to an external language server
pub struct ExternalAnalyzer {
    writer: SharedWriter,
    pending: PendingMap,
    next_id: AtomicI64,
    alive: Arc<AtomicBool>,
    child: Option<Mutex<Child>>,
}

/// Removes a request from the pending map when its caller goes away
struct PendingGuard<'a> {
    pending: &'a DashMap<i64, oneshot::Sender<Result<Value, OracleError>>>,
    id: i64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

impl ExternalAnalyzer {
    /// Start `command` and perform the initialize handshake
    pub async fn spawn(command: &[String], root: Option<&Url>) -> Result<Self, OracleError> {
        let (program, args) = command.split_first().ok_or(OracleError::Unavailable)?;
        info!("Starting analysis service: {}", command.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(OracleError::Spawn)?;

        let stdin = child.stdin.take().ok_or(OracleError::Unavailable)?;
        let stdout = child.stdout.take().ok_or(OracleError::Unavailable)?;

        let mut analyzer = Self::connect(stdout, stdin);
        analyzer.child = Some(Mutex::new(child));
        analyzer.initialize(root).await?;
        Ok(analyzer)
    }

    /// Attach to an already running server over a byte stream pair
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
        let writer: SharedWriter = Arc::new(Mutex::new(writer));
        let pending: PendingMap = Arc::new(DashMap::new());
        let alive = Arc::new(AtomicBool::new(true));

        tokio::spawn(read_loop(
            BufReader::new(reader),
            pending.clone(),
            writer.clone(),
            alive.clone(),
        ));

        Self {
            writer,
            pending,
            next_id: AtomicI64::new(1),
            alive,
            child: None,
        }
    }

    pub async fn initialize(&self, root: Option<&Url>) -> Result<(), OracleError> {
        let folders = root.map(|uri| vec![json!({"uri": uri, "name": "workspace"})]);
        let params = json!({
            "processId": std::process::id(),
            "rootUri": root,
            "workspaceFolders": folders,
            "capabilities": {
                "textDocument": {
                    "hover": {"contentFormat": ["markdown", "plaintext"]},
                    "typeDefinition": {},
                    "synchronization": {"didSave": false},
                },
                "workspace": {"configuration": true},
            },
        });

        tokio::time::timeout(HANDSHAKE_TIMEOUT, self.request("initialize", params))
            .await
            .map_err(|_| OracleError::Timeout("initialize"))??;
        self.notify("initialized", json!({})).await?;
        info!("Analysis service initialized");
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, OracleError> {
        if !self.is_available() {
            return Err(OracleError::Unavailable);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(id, sender);
        let _guard = PendingGuard {
            pending: &self.pending,
            id,
        };
        // The reader may have drained the map between the check and the insert
        if !self.is_available() {
            return Err(OracleError::Closed);
        }

        let message = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        self.send(&message).await?;
        debug!("-> {} #{}", method, id);

        match receiver.await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Closed),
        }
    }

    async fn notify(&self, method: &str, params: Value) -> Result<(), OracleError> {
        if !self.is_available() {
            return Err(OracleError::Unavailable);
        }
        let message = json!({"jsonrpc": "2.0", "method": method, "params": params});
        self.send(&message).await
    }

    async fn send(&self, message: &Value) -> Result<(), OracleError> {
        let mut writer = self.writer.lock().await;
        write_message(&mut *writer, message).await?;
        Ok(())
    }
}

#[tower_lsp::async_trait]
impl TypeOracle for ExternalAnalyzer {
    fn is_available(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    async fn hover(&self, uri: &Url, position: Position) -> Result<Option<String>, OracleError> {
        let params = json!({"textDocument": {"uri": uri}, "position": position});
        let value = self.request("textDocument/hover", params).await?;
        let hover: Option<Hover> = serde_json::from_value(value)?;
        Ok(hover.and_then(|h| hover_text(&h.contents)))
    }

    async fn type_definition(&self, uri: &Url, position: Position) -> Result<bool, OracleError> {
        let params = json!({"textDocument": {"uri": uri}, "position": position});
        let value = self.request("textDocument/typeDefinition", params).await?;
        Ok(match value {
            Value::Null => false,
            Value::Array(locations) => !locations.is_empty(),
            _ => true,
        })
    }

    async fn did_open(&self, uri: &Url, version: i32, text: &str) -> Result<(), OracleError> {
        let params = json!({
            "textDocument": {"uri": uri, "languageId": "python", "version": version, "text": text}
        });
        self.notify("textDocument/didOpen", params).await
    }

    async fn did_change(&self, uri: &Url, version: i32, text: &str) -> Result<(), OracleError> {
        let params = json!({
            "textDocument": {"uri": uri, "version": version},
            "contentChanges": [{"text": text}],
        });
        self.notify("textDocument/didChange", params).await
    }

    async fn did_close(&self, uri: &Url) -> Result<(), OracleError> {
        self.notify("textDocument/didClose", json!({"textDocument": {"uri": uri}}))
            .await
    }

    async fn shutdown(&self) {
        if self.is_available() {
            let request = self.request("shutdown", Value::Null);
            if let Err(e) = tokio::time::timeout(HANDSHAKE_TIMEOUT, request)
                .await
                .unwrap_or(Err(OracleError::Timeout("shutdown")))
            {
                debug!("Analysis service shutdown: {}", e);
            }
            let _ = self.notify("exit", Value::Null).await;
        }
        if let Some(child) = &self.child {
            let _ = child.lock().await.start_kill();
        }
    }
}

async fn read_loop<R>(mut reader: R, pending: PendingMap, writer: SharedWriter, alive: Arc<AtomicBool>)
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match read_message(&mut reader).await {
            Ok(Some(message)) => dispatch(message, &pending, &writer).await,
            Ok(None) => {
                info!("Analysis service closed its output");
                break;
            }
            Err(TransportError::InvalidJson(e)) => {
                warn!("Skipping malformed message from analysis service: {}", e);
            }
            Err(e) => {
                warn!("Analysis service stream error: {}", e);
                break;
            }
        }
    }
    alive.store(false, Ordering::Release);
    // Dropping the senders fails every outstanding request with `Closed`
    pending.clear();
}

async fn dispatch(message: Value, pending: &PendingMap, writer: &SharedWriter) {
    let id = message.get("id").cloned();
    let method = message.get("method").and_then(Value::as_str);

    match (id, method) {
        (Some(id), Some(method)) => {
            trace!("<- request {}", method);
            let result = empty_result(method, message.get("params"));
            let reply = json!({"jsonrpc": "2.0", "id": id, "result": result});
            let mut writer = writer.lock().await;
            if let Err(e) = write_message(&mut *writer, &reply).await {
                warn!("Failed to answer {}: {}", method, e);
            }
        }
        (None, Some(method)) => trace!("<- notification {}", method),
        (Some(id), None) => {
            let Some(id) = id.as_i64() else {
                debug!("Response with unexpected id {}", id);
                return;
            };
            let Some((_, sender)) = pending.remove(&id) else {
                trace!("Dropping response for abandoned request #{}", id);
                return;
            };
            let _ = sender.send(response_result(&message));
        }
        (None, None) => debug!("Ignoring malformed message"),
    }
}

/// Result sent back for a request the server made to us
fn empty_result(method: &str, params: Option<&Value>) -> Value {
    match method {
        "workspace/configuration" => {
            let items = params
                .and_then(|p| p.get("items"))
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            Value::Array(vec![Value::Null; items])
        }
        _ => Value::Null,
    }
}

fn response_result(message: &Value) -> Result<Value, OracleError> {
    if let Some(error) = message.get("error") {
        return Err(OracleError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }
    Ok(message.get("result").cloned().unwrap_or(Value::Null))
}
