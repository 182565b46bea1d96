//! Tool server runner
//!
//! Speaks newline-delimited JSON-RPC 2.0 over stdio so an LLM host can list
//! and call tools. stdout carries protocol messages only; logs go to stderr.
//!
//! Each `tools/call` runs on its own task, so a slow broadcast never blocks
//! other calls. Responses funnel through one channel to a single writer and
//! go out in completion order; hosts match them by `id`.

use crate::tools::ToolRegistry;
use crate::tx::pretty_json;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Protocol revision announced in `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "osmosis-exec-tools";

pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    /// Absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Serves a [`ToolRegistry`] to one host
#[derive(Clone)]
pub struct ToolServer {
    registry: Arc<ToolRegistry>,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Read one request per line, write one response per line.
    ///
    /// Returns once the reader is exhausted and every in-flight call has
    /// been answered.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(tools = self.registry.names().len(), "Tool server listening on stdio");
        let (sender, mut receiver) = mpsc::unbounded_channel::<Response>();

        let read = async move {
            let mut lines = reader.lines();
            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                self.dispatch(&line, &sender).await;
            }
            info!("Host closed stdin, finishing in-flight calls");
            Ok::<(), Error>(())
        };

        let write = async {
            while let Some(response) = receiver.recv().await {
                let mut encoded = serde_json::to_string(&response)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<(), Error>(())
        };

        tokio::try_join!(read, write)?;
        info!("Tool server stopped");
        Ok(())
    }

    /// Answer protocol methods inline; hand tool calls to their own task
    async fn dispatch(&self, line: &str, responses: &mpsc::UnboundedSender<Response>) {
        let request = match parse_line(line) {
            Ok(request) => request,
            Err(response) => {
                let _ = responses.send(response);
                return;
            }
        };

        if request.method != "tools/call" || request.is_notification() {
            if let Some(response) = self.handle_request(request).await {
                let _ = responses.send(response);
            }
            return;
        }

        let server = self.clone();
        let responses = responses.clone();
        tokio::spawn(async move {
            let id = request.id.clone().unwrap_or(Value::Null);
            let call = tokio::spawn(async move { server.handle_request(request).await });
            let response = match call.await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "Tool call task failed");
                    Some(Response::error(
                        id,
                        error_codes::INTERNAL_ERROR,
                        format!("Internal error: {}", e),
                    ))
                }
            };
            if let Some(response) = response {
                let _ = responses.send(response);
            }
        });
    }

    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        debug!(method = %request.method, "Handling request");

        if request.is_notification() {
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => Response::result(id, initialize_result()),
            "ping" => Response::result(id, json!({})),
            "tools/list" => Response::result(id, json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.handle_tool_call(id, request.params).await,
            other => Response::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        };
        Some(response)
    }

    async fn handle_tool_call(&self, id: Value, params: Option<Value>) -> Response {
        let params = params.unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return Response::error(id, error_codes::INVALID_PARAMS, "Missing tool name");
        };
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        info!(tool = %name, "Tool call");
        let output = self.registry.call(name, args).await;
        let is_error = output.get("success").and_then(Value::as_bool) == Some(false);
        let text = pretty_json(&output);

        Response::result(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": is_error,
            }),
        )
    }
}

/// Decode one line, or the error response it earns
fn parse_line(line: &str) -> std::result::Result<Request, Response> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        warn!(error = %e, "Unparseable message");
        Response::error(
            Value::Null,
            error_codes::PARSE_ERROR,
            format!("Parse error: {}", e),
        )
    })?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value::<Request>(value).map_err(|e| {
        Response::error(
            id,
            error_codes::INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}
