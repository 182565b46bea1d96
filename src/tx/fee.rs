//! Fee computation and gas estimation results
//!
//! Fees are exact: `ceil(gas × price)` is computed with `rust_decimal`, never
//! with floats.

use super::messages::{validate_coins, Coin};
use crate::config::DEFAULT_GAS_PRICE;
use crate::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Gas limit used when the caller provides none
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Multiplier applied to simulated gas (+30%)
pub fn gas_adjustment() -> Decimal {
    Decimal::new(13, 1)
}

/// Optional per-call execution settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
    pub gas: Option<u64>,
    pub gas_price: Option<String>,
    pub memo: Option<String>,
    pub fee: Option<Vec<Coin>>,
}

impl ExecutionOptions {
    pub fn gas_limit(&self) -> u64 {
        self.gas.unwrap_or(DEFAULT_GAS_LIMIT)
    }

    pub fn memo(&self) -> &str {
        self.memo.as_deref().unwrap_or("")
    }
}

/// Price per unit of gas, e.g. `0.025uosmo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub amount: Decimal,
    pub denom: String,
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid gas price '{}': missing denom", s)))?;
        let (amount, denom) = s.split_at(split);

        let amount = Decimal::from_str(amount)
            .map_err(|e| Error::InvalidArgument(format!("Invalid gas price '{}': {}", s, e)))?;
        if amount.is_sign_negative() {
            return Err(Error::InvalidArgument(format!(
                "Invalid gas price '{}': must not be negative",
                s
            )));
        }

        Ok(Self {
            amount,
            denom: denom.to_string(),
        })
    }
}

/// Fee attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
}

/// Work out the fee for a transaction.
///
/// An explicit `fee` is used verbatim. Otherwise the fee is derived from the
/// gas limit and gas price (`0.025uosmo` unless overridden).
pub fn compute_fee(options: &ExecutionOptions) -> Result<Fee> {
    let gas_limit = options.gas_limit();

    if let Some(fee) = &options.fee {
        validate_coins(fee)?;
        return Ok(Fee {
            amount: fee.clone(),
            gas_limit,
        });
    }

    let price: GasPrice = options
        .gas_price
        .as_deref()
        .unwrap_or(DEFAULT_GAS_PRICE)
        .parse()?;

    let total = (Decimal::from(gas_limit) * price.amount).ceil();
    Ok(Fee {
        amount: vec![Coin::new(total.normalize().to_string(), price.denom)],
        gas_limit,
    })
}

/// Apply the +30% simulation buffer, rounding up
pub fn buffered_gas(gas_used: u64) -> u64 {
    (Decimal::from(gas_used) * gas_adjustment())
        .ceil()
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Result of a dry run against the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    pub gas_used: u64,
    /// Suggested gas limit: `ceil(gas_used × 1.3)`
    pub gas_wanted: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimulationResult {
    /// Create a successful simulation result
    pub fn success(gas_used: u64) -> Self {
        Self {
            success: true,
            gas_used,
            gas_wanted: buffered_gas(gas_used),
            error: None,
        }
    }

    /// Create a failed simulation result
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            gas_used: 0,
            gas_wanted: 0,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_from_gas_and_default_price() {
        let options = ExecutionOptions {
            gas: Some(100_000),
            ..Default::default()
        };
        let fee = compute_fee(&options).unwrap();
        assert_eq!(fee.gas_limit, 100_000);
        assert_eq!(fee.amount, vec![Coin::new("2500", "uosmo")]);
    }

    #[test]
    fn test_fee_defaults() {
        let fee = compute_fee(&ExecutionOptions::default()).unwrap();
        assert_eq!(fee.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(fee.amount, vec![Coin::new("5000", "uosmo")]);
    }

    #[test]
    fn test_fee_rounds_up() {
        let options = ExecutionOptions {
            gas: Some(100_001),
            gas_price: Some("0.025uosmo".to_string()),
            ..Default::default()
        };
        // 2500.025 -> 2501
        assert_eq!(compute_fee(&options).unwrap().amount[0].amount, "2501");
    }

    #[test]
    fn test_explicit_fee_verbatim() {
        let options = ExecutionOptions {
            gas: Some(150_000),
            fee: Some(vec![Coin::new("7777", "uion")]),
            gas_price: Some("1uosmo".to_string()),
            ..Default::default()
        };
        let fee = compute_fee(&options).unwrap();
        assert_eq!(fee.amount, vec![Coin::new("7777", "uion")]);
        assert_eq!(fee.gas_limit, 150_000);
    }

    #[test]
    fn test_gas_price_parsing() {
        let price: GasPrice = "0.0025ibc/ABC".parse().unwrap();
        assert_eq!(price.denom, "ibc/ABC");
        assert_eq!(price.amount, Decimal::new(25, 4));

        assert!("uosmo".parse::<GasPrice>().is_err());
        assert!("0.025".parse::<GasPrice>().is_err());
        assert!("-1uosmo".parse::<GasPrice>().is_err());
    }

    #[test]
    fn test_simulation_buffer() {
        let result = SimulationResult::success(100_000);
        assert_eq!(result.gas_wanted, 130_000);
        assert_eq!(buffered_gas(1), 2);
        assert_eq!(buffered_gas(0), 0);
    }

    #[test]
    fn test_failed_simulation_shape() {
        let result = SimulationResult::failed("out of gas");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "gasUsed": 0,
                "gasWanted": 0,
                "error": "out of gas"
            })
        );
    }
}
