//! Shared tool input helpers.

use crate::tx::{Coin, ExecutionOptions};
use crate::wallet::validate_mnemonic;
use crate::{Error, Result};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn schema_any(_: &mut SchemaGenerator) -> Schema {
    true.into()
}

/// Wrapper for arbitrary JSON payloads when a tool argument is dynamic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[schemars(schema_with = "schema_any")]
pub struct AnyJson(pub Value);

impl AnyJson {
    pub fn new(value: Value) -> Self {
        Self(value)
    }
}

impl From<Value> for AnyJson {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<AnyJson> for Value {
    fn from(value: AnyJson) -> Self {
        value.0
    }
}

/// Absent, `null` and `""` all count as missing
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Fail with `Missing required parameter: <name>` for the first missing field
pub fn check_required(args: &Value, required: &[&str]) -> Result<()> {
    for name in required {
        if is_missing(args.get(*name)) {
            return Err(Error::MissingParameter((*name).to_string()));
        }
    }
    Ok(())
}

/// Decode tool arguments, reporting shape problems as `InvalidArgument`
pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidArgument(e.to_string()))
}

pub(crate) fn deserialize_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn u64_from_value<E: de::Error>(value: Value) -> std::result::Result<u64, E> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| E::custom(format!("expected a non-negative integer, got {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("expected a non-negative integer, got '{}'", s))),
        other => Err(E::custom(format!("expected a non-negative integer, got {}", other))),
    }
}

/// Hosts send ids and gas either as JSON numbers or numeric strings
pub(crate) fn u64_from_any<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u64, D::Error> {
    u64_from_value(Value::deserialize(deserializer)?)
}

pub(crate) fn opt_u64_from_any<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => u64_from_value(v).map(Some),
    }
}

/// Arguments shared by every execution tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommonArgs {
    /// BIP-39 mnemonic of the signing wallet (12-24 words). Used for this call only.
    #[serde(deserialize_with = "deserialize_secret")]
    #[schemars(with = "String")]
    pub mnemonic: SecretString,
    /// Gas limit (default 200000)
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    #[schemars(with = "Option<u64>")]
    pub gas: Option<u64>,
    /// Gas price, e.g. `0.025uosmo`
    #[serde(default)]
    pub gas_price: Option<String>,
    /// Transaction memo
    #[serde(default)]
    pub memo: Option<String>,
    /// Explicit fee; overrides gas price
    #[serde(default)]
    pub fee: Option<Vec<Coin>>,
}

impl CommonArgs {
    /// Pre-flight check so a malformed phrase never reaches the signer
    pub fn check_mnemonic(&self) -> Result<()> {
        if validate_mnemonic(self.mnemonic.expose_secret()) {
            Ok(())
        } else {
            Err(Error::InvalidMnemonic)
        }
    }

    pub fn options(&self) -> ExecutionOptions {
        ExecutionOptions {
            gas: self.gas,
            gas_price: self.gas_price.clone().filter(|p| !p.trim().is_empty()),
            memo: self.memo.clone(),
            fee: self.fee.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_covers_null_and_empty() {
        let args = json!({ "a": null, "b": "", "c": "  ", "d": 0, "e": "x" });
        assert!(is_missing(args.get("a")));
        assert!(is_missing(args.get("b")));
        assert!(is_missing(args.get("c")));
        assert!(!is_missing(args.get("d")));
        assert!(!is_missing(args.get("e")));
        assert!(is_missing(args.get("zzz")));
    }

    #[test]
    fn test_check_required_names_first_missing() {
        let err = check_required(&json!({ "mnemonic": "x" }), &["mnemonic", "toAddress", "amount"])
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameter: toAddress");
    }

    #[test]
    fn test_common_args_accept_string_gas() {
        let args: CommonArgs = parse_args(json!({
            "mnemonic": "word ".repeat(12).trim(),
            "gas": "250000",
            "gasPrice": "0.03uosmo"
        }))
        .unwrap();
        let options = args.options();
        assert_eq!(options.gas, Some(250_000));
        assert_eq!(options.gas_price.as_deref(), Some("0.03uosmo"));
        assert!(matches!(args.check_mnemonic(), Err(Error::InvalidMnemonic)));
    }

    #[test]
    fn test_common_args_debug_hides_mnemonic() {
        let args: CommonArgs = parse_args(json!({ "mnemonic": "secret words here" })).unwrap();
        assert!(!format!("{:?}", args).contains("secret words"));
    }
}
