//! Audit log interceptor
//!
//! Appends one JSON line per tool call start and completion. Mnemonics are
//! redacted from both arguments and responses before anything is written.

use super::{ToolCallContext, ToolInterceptor};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const REDACTED: &str = "[REDACTED]";

/// Keys whose values never reach the log
const SECRET_KEYS: [&str; 2] = ["mnemonic", "privateKey"];

/// Entry in the audit log
#[derive(Debug, Serialize)]
struct AuditEntry {
    timestamp: DateTime<Utc>,
    entry_type: &'static str,
    tool_name: String,
    args: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<String>,
    duration_ms: u64,
    status: &'static str,
}

/// Writer for audit log entries
struct AuditLogWriter {
    path: PathBuf,
}

impl AuditLogWriter {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// Interceptor that logs all tool calls to a JSONL file
pub struct AuditLogInterceptor {
    writer: Arc<Mutex<AuditLogWriter>>,
}

impl AuditLogInterceptor {
    /// Create a new audit log interceptor
    ///
    /// # Arguments
    /// * `log_path` - Path to the audit log file (JSONL format)
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(AuditLogWriter::new(log_path.into()))),
        }
    }

    async fn record(&self, entry: AuditEntry) {
        let writer = self.writer.lock().await;
        if let Err(e) = writer.write(&entry) {
            tracing::warn!(error = %e, "Failed to write audit log entry");
        }
    }
}

#[async_trait]
impl ToolInterceptor for AuditLogInterceptor {
    async fn intercept_tool_call(&self, context: &ToolCallContext) {
        self.record(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "tool_call_start",
            tool_name: context.tool_name.clone(),
            args: redact(&context.args),
            result: None,
            tx_hash: None,
            duration_ms: 0,
            status: "pending",
        })
        .await;
    }

    async fn on_tool_call_complete(&self, context: &ToolCallContext, response: &Value, duration_ms: u64) {
        // execution envelopes carry `success`; everything else counts as success
        let status = match response.get("success").and_then(Value::as_bool) {
            Some(false) => "error",
            _ => "success",
        };

        self.record(AuditEntry {
            timestamp: Utc::now(),
            entry_type: "tool_call_complete",
            tool_name: context.tool_name.clone(),
            args: redact(&context.args),
            result: Some(truncate_result(&redact(response))),
            tx_hash: response
                .get("txHash")
                .and_then(Value::as_str)
                .map(str::to_string),
            duration_ms,
            status,
        })
        .await;
    }
}

/// Copy of `value` with every secret key's value replaced, at any depth
fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    if SECRET_KEYS.contains(&key.as_str()) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Truncate result for logging
fn truncate_result(result: &Value) -> Value {
    let s = serde_json::to_string(result).unwrap_or_default();
    if s.len() > 1000 {
        let cut = (0..=1000).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
        serde_json::json!(format!("{}... [truncated]", &s[..cut]))
    } else {
        result.clone()
    }
}
