//! Transaction execution: messages, fees, signing, broadcast and results

mod client;
mod encode;
pub mod fee;
pub mod messages;
mod result;
pub mod transport;

pub use client::SigningClient;
pub use fee::{compute_fee, ExecutionOptions, SimulationResult, DEFAULT_GAS_LIMIT};
pub use messages::{resolve_signers, validate_coins, vote_option_number, Coin, Message, VoteOption};
pub use result::{pretty_json, BroadcastOutcome, ExecutionResult, ToolResponse};
pub use transport::{AccountInfo, ChainTransport, HttpTransport};
