//! Execution outcomes and the tool response envelope

use serde::Serialize;

/// What the chain reported for a broadcast transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub code: u32,
    pub raw_log: String,
    pub tx_hash: String,
    pub gas_used: u64,
    pub gas_wanted: u64,
    pub height: u64,
}

/// Outcome of one execution call.
///
/// Only constructed through [`ExecutionResult::from_broadcast`] and
/// [`ExecutionResult::failure`], which keep `success` and `error` consistent:
/// `success == error.is_none()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_wanted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u64>,
}

impl ExecutionResult {
    /// Interpret a chain response. A non-zero code is a logical failure that
    /// still carries hash, gas and height: the transaction reached a block.
    pub fn from_broadcast(outcome: BroadcastOutcome) -> Self {
        let error = (outcome.code != 0).then(|| {
            format!(
                "Transaction failed with code {}: {}",
                outcome.code, outcome.raw_log
            )
        });

        Self {
            success: error.is_none(),
            tx_hash: Some(outcome.tx_hash),
            error,
            gas_used: Some(outcome.gas_used.to_string()),
            gas_wanted: Some(outcome.gas_wanted.to_string()),
            height: Some(outcome.height),
        }
    }

    /// The transaction never reached the chain
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: None,
            error: Some(error.into()),
            gas_used: None,
            gas_wanted: None,
            height: None,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn tx_hash(&self) -> Option<&str> {
        self.tx_hash.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn gas_used(&self) -> Option<&str> {
        self.gas_used.as_deref()
    }

    pub fn gas_wanted(&self) -> Option<&str> {
        self.gas_wanted.as_deref()
    }

    pub fn height(&self) -> Option<u64> {
        self.height
    }
}

/// Uniform response returned by every execution tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub tool: String,
    #[serde(flatten)]
    pub result: ExecutionResult,
}

impl ToolResponse {
    pub fn new(tool: impl Into<String>, result: ExecutionResult) -> Self {
        Self {
            tool: tool.into(),
            result,
        }
    }

    /// `{tool, success:false, error}` for failures raised before broadcast
    pub fn error(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(tool, ExecutionResult::failure(error))
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "tool": self.tool, "success": false, "error": "Failed to encode response" })
        })
    }
}

/// Pretty-printed JSON, as handed back to the host. Falls back to the
/// compact form rather than an empty string.
pub fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(code: u32) -> BroadcastOutcome {
        BroadcastOutcome {
            code,
            raw_log: "insufficient funds".to_string(),
            tx_hash: "ABCDEF".to_string(),
            gas_used: 61_000,
            gas_wanted: 200_000,
            height: 1234,
        }
    }

    #[test]
    fn test_success_envelope() {
        let response = ToolResponse::new("send", ExecutionResult::from_broadcast(outcome(0)));
        assert_eq!(
            response.to_value(),
            json!({
                "tool": "send",
                "success": true,
                "txHash": "ABCDEF",
                "gasUsed": "61000",
                "gasWanted": "200000",
                "height": 1234
            })
        );
    }

    #[test]
    fn test_logical_failure_keeps_telemetry() {
        let result = ExecutionResult::from_broadcast(outcome(5));
        assert!(!result.success());
        assert_eq!(
            result.error(),
            Some("Transaction failed with code 5: insufficient funds")
        );
        assert_eq!(result.tx_hash(), Some("ABCDEF"));
        assert_eq!(result.height(), Some(1234));
    }

    #[test]
    fn test_transport_failure_has_only_error() {
        let response = ToolResponse::error("delegate", "connection refused");
        assert_eq!(
            response.to_value(),
            json!({ "tool": "delegate", "success": false, "error": "connection refused" })
        );
    }

    #[test]
    fn test_success_iff_no_error() {
        for result in [
            ExecutionResult::from_broadcast(outcome(0)),
            ExecutionResult::from_broadcast(outcome(11)),
            ExecutionResult::failure("x"),
        ] {
            assert_eq!(result.success(), result.error().is_none());
        }
    }

    #[test]
    fn test_pretty_json_is_never_empty() {
        let response = ToolResponse::new("send", ExecutionResult::from_broadcast(outcome(5)));
        let text = pretty_json(&response.to_value());

        assert!(text.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, response.to_value());
    }
}
