//! Tool call interceptors
//!
//! Every call routed through [`crate::tools::ToolRegistry`] is reported to the
//! registered interceptors before it runs and again once its response is known.

mod audit_log;

use async_trait::async_trait;
use serde_json::Value;

pub use audit_log::AuditLogInterceptor;

/// What an interceptor sees about a call
#[derive(Debug, Clone)]
pub struct ToolCallContext {
    pub tool_name: String,
    pub args: Value,
}

#[async_trait]
pub trait ToolInterceptor: Send + Sync {
    async fn intercept_tool_call(&self, context: &ToolCallContext);

    async fn on_tool_call_complete(&self, context: &ToolCallContext, response: &Value, duration_ms: u64);
}
