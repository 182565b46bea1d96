//! Typed operation messages for Osmosis transactions
//!
//! One variant per supported operation. Builders leave the signer slot blank;
//! [`resolve_signers`] fills it with the address derived from the caller's
//! mnemonic right before signing.

use crate::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Token amount. `amount` is an integer in base units, kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Coin {
    /// Token denomination (e.g. `uosmo` or an `ibc/...` hash)
    pub denom: String,
    /// Amount in base units (e.g. `1000000` for 1 OSMO)
    pub amount: String,
}

impl Coin {
    pub fn new(amount: impl Into<String>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.denom.trim().is_empty() {
            return Err(Error::InvalidArgument("Coin denom must not be empty".to_string()));
        }
        if self.amount.is_empty() || !self.amount.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "Invalid amount '{}' for {}: must be a non-negative integer",
                self.amount, self.denom
            )));
        }
        Ok(())
    }
}

/// Validate a multi-asset amount: every coin well-formed, no repeated denom
pub fn validate_coins(coins: &[Coin]) -> Result<()> {
    let mut seen = HashSet::new();
    for coin in coins {
        coin.validate()?;
        if !seen.insert(coin.denom.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "Duplicate denom in coin list: {}",
                coin.denom
            )));
        }
    }
    Ok(())
}

/// One side of a multi-send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BankIo {
    /// Account address; leave empty on an input to use the signer
    #[serde(default)]
    pub address: String,
    pub coins: Vec<Coin>,
}

/// Chain-level governance vote option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteOption {
    Yes,
    Abstain,
    No,
    NoWithVeto,
}

impl VoteOption {
    /// Enumerated code used on the wire
    pub fn code(&self) -> i32 {
        match self {
            VoteOption::Yes => 1,
            VoteOption::Abstain => 2,
            VoteOption::No => 3,
            VoteOption::NoWithVeto => 4,
        }
    }

    /// Map a human-readable option; unknown strings are an error, never a default
    pub fn parse(option: &str) -> Result<Self> {
        match option.trim().to_lowercase().as_str() {
            "yes" => Ok(VoteOption::Yes),
            "no" => Ok(VoteOption::No),
            "abstain" => Ok(VoteOption::Abstain),
            "no_with_veto" => Ok(VoteOption::NoWithVeto),
            _ => Err(Error::InvalidVoteOption(option.to_string())),
        }
    }
}

/// Shorthand for `VoteOption::parse(option)?.code()`
pub fn vote_option_number(option: &str) -> Result<i32> {
    VoteOption::parse(option).map(|o| o.code())
}

/// Governance proposal content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalContent {
    Text { title: String, description: String },
}

/// IBC packet timeout. Zero fields mean "no timeout of this kind".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IbcTimeout {
    pub revision_number: u64,
    pub revision_height: u64,
    pub timestamp_nanos: u64,
}

/// Hop of a swap route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRoute {
    pub pool_id: u64,
    pub token_out_denom: String,
}

/// A transaction message.
///
/// The first `String` field named in each variant's doc is its signer slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Signer: `from_address`
    Send {
        from_address: String,
        to_address: String,
        amount: Vec<Coin>,
    },
    /// Signer: every input with a blank address
    MultiSend {
        inputs: Vec<BankIo>,
        outputs: Vec<BankIo>,
    },
    /// Signer: `delegator_address`
    Delegate {
        delegator_address: String,
        validator_address: String,
        amount: Coin,
    },
    /// Signer: `delegator_address`
    Undelegate {
        delegator_address: String,
        validator_address: String,
        amount: Coin,
    },
    /// Signer: `delegator_address`
    Redelegate {
        delegator_address: String,
        validator_src_address: String,
        validator_dst_address: String,
        amount: Coin,
    },
    /// Signer: `delegator_address`
    WithdrawReward {
        delegator_address: String,
        validator_address: String,
    },
    /// Signer: `proposer`
    SubmitProposal {
        proposer: String,
        initial_deposit: Vec<Coin>,
        content: ProposalContent,
    },
    /// Signer: `voter`
    Vote {
        proposal_id: u64,
        voter: String,
        option: VoteOption,
    },
    /// Signer: `depositor`
    Deposit {
        proposal_id: u64,
        depositor: String,
        amount: Vec<Coin>,
    },
    /// Signer: `sender`
    IbcTransfer {
        source_port: String,
        source_channel: String,
        token: Coin,
        sender: String,
        receiver: String,
        timeout: IbcTimeout,
        memo: String,
    },
    /// Signer: `owner`
    LockTokens {
        owner: String,
        duration_secs: u64,
        coins: Vec<Coin>,
    },
    /// Signer: `owner`. Empty `coins` unlocks the whole lock.
    BeginUnlocking {
        owner: String,
        lock_id: u64,
        coins: Vec<Coin>,
    },
    /// Signer: `owner`
    BeginUnlockingAll { owner: String },
    /// Signer: `sender`
    SwapExactAmountIn {
        sender: String,
        routes: Vec<SwapRoute>,
        token_in: Coin,
        token_out_min_amount: String,
    },
    /// Signer: `sender`
    JoinPool {
        sender: String,
        pool_id: u64,
        share_out_amount: String,
        token_in_maxs: Vec<Coin>,
    },
    /// Signer: `sender`
    ExitPool {
        sender: String,
        pool_id: u64,
        share_in_amount: String,
        token_out_mins: Vec<Coin>,
    },
    /// Signer: `sender`
    SuperfluidDelegate {
        sender: String,
        lock_id: u64,
        val_addr: String,
    },
    /// Signer: `sender`
    SuperfluidUndelegate { sender: String, lock_id: u64 },
    /// Signer: `sender`
    CreateDenom { sender: String, subdenom: String },
    /// Signer: `sender`
    Mint {
        sender: String,
        amount: Coin,
        mint_to_address: String,
    },
    /// Signer: `sender`
    Burn {
        sender: String,
        amount: Coin,
        burn_from_address: String,
    },
}

impl Message {
    /// Return a copy whose blank signer slot holds `address`.
    ///
    /// Populated slots are kept, so callers can name a different signer
    /// explicitly (e.g. a multi-send input).
    pub fn with_signer(&self, address: &str) -> Message {
        fn fill(slot: &mut String, address: &str) {
            if slot.trim().is_empty() {
                *slot = address.to_string();
            }
        }

        let mut msg = self.clone();
        match &mut msg {
            Message::Send { from_address, .. } => fill(from_address, address),
            Message::MultiSend { inputs, .. } => {
                for input in inputs.iter_mut() {
                    fill(&mut input.address, address);
                }
            }
            Message::Delegate {
                delegator_address, ..
            }
            | Message::Undelegate {
                delegator_address, ..
            }
            | Message::Redelegate {
                delegator_address, ..
            }
            | Message::WithdrawReward {
                delegator_address, ..
            } => fill(delegator_address, address),
            Message::SubmitProposal { proposer, .. } => fill(proposer, address),
            Message::Vote { voter, .. } => fill(voter, address),
            Message::Deposit { depositor, .. } => fill(depositor, address),
            Message::LockTokens { owner, .. }
            | Message::BeginUnlocking { owner, .. }
            | Message::BeginUnlockingAll { owner } => fill(owner, address),
            Message::IbcTransfer { sender, .. }
            | Message::SwapExactAmountIn { sender, .. }
            | Message::JoinPool { sender, .. }
            | Message::ExitPool { sender, .. }
            | Message::SuperfluidDelegate { sender, .. }
            | Message::SuperfluidUndelegate { sender, .. }
            | Message::CreateDenom { sender, .. }
            | Message::Mint { sender, .. }
            | Message::Burn { sender, .. } => fill(sender, address),
        }
        msg
    }
}

/// Fill blank signer slots across a batch
pub fn resolve_signers(messages: &[Message], address: &str) -> Vec<Message> {
    messages.iter().map(|msg| msg.with_signer(address)).collect()
}

// Builders. Signer arguments may be empty; see `resolve_signers`.

pub fn msg_send(from_address: &str, to_address: &str, amount: Vec<Coin>) -> Message {
    Message::Send {
        from_address: from_address.to_string(),
        to_address: to_address.to_string(),
        amount,
    }
}

pub fn msg_multi_send(inputs: Vec<BankIo>, outputs: Vec<BankIo>) -> Message {
    Message::MultiSend { inputs, outputs }
}

pub fn msg_delegate(delegator: &str, validator: &str, amount: Coin) -> Message {
    Message::Delegate {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
        amount,
    }
}

pub fn msg_undelegate(delegator: &str, validator: &str, amount: Coin) -> Message {
    Message::Undelegate {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
        amount,
    }
}

pub fn msg_begin_redelegate(
    delegator: &str,
    validator_src: &str,
    validator_dst: &str,
    amount: Coin,
) -> Message {
    Message::Redelegate {
        delegator_address: delegator.to_string(),
        validator_src_address: validator_src.to_string(),
        validator_dst_address: validator_dst.to_string(),
        amount,
    }
}

pub fn msg_withdraw_delegator_reward(delegator: &str, validator: &str) -> Message {
    Message::WithdrawReward {
        delegator_address: delegator.to_string(),
        validator_address: validator.to_string(),
    }
}

pub fn msg_submit_text_proposal(
    proposer: &str,
    initial_deposit: Vec<Coin>,
    title: &str,
    description: &str,
) -> Message {
    Message::SubmitProposal {
        proposer: proposer.to_string(),
        initial_deposit,
        content: ProposalContent::Text {
            title: title.to_string(),
            description: description.to_string(),
        },
    }
}

pub fn msg_vote(proposal_id: u64, voter: &str, option: VoteOption) -> Message {
    Message::Vote {
        proposal_id,
        voter: voter.to_string(),
        option,
    }
}

pub fn msg_deposit(proposal_id: u64, depositor: &str, amount: Vec<Coin>) -> Message {
    Message::Deposit {
        proposal_id,
        depositor: depositor.to_string(),
        amount,
    }
}

pub fn msg_transfer(
    source_port: &str,
    source_channel: &str,
    token: Coin,
    sender: &str,
    receiver: &str,
    timeout: IbcTimeout,
    memo: &str,
) -> Message {
    Message::IbcTransfer {
        source_port: source_port.to_string(),
        source_channel: source_channel.to_string(),
        token,
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        timeout,
        memo: memo.to_string(),
    }
}

pub fn msg_lock_tokens(owner: &str, duration_secs: u64, coins: Vec<Coin>) -> Message {
    Message::LockTokens {
        owner: owner.to_string(),
        duration_secs,
        coins,
    }
}

pub fn msg_begin_unlocking(owner: &str, lock_id: u64, coins: Vec<Coin>) -> Message {
    Message::BeginUnlocking {
        owner: owner.to_string(),
        lock_id,
        coins,
    }
}

pub fn msg_begin_unlocking_all(owner: &str) -> Message {
    Message::BeginUnlockingAll {
        owner: owner.to_string(),
    }
}

pub fn msg_swap_exact_amount_in(
    sender: &str,
    routes: Vec<SwapRoute>,
    token_in: Coin,
    token_out_min_amount: &str,
) -> Message {
    Message::SwapExactAmountIn {
        sender: sender.to_string(),
        routes,
        token_in,
        token_out_min_amount: token_out_min_amount.to_string(),
    }
}

pub fn msg_join_pool(
    sender: &str,
    pool_id: u64,
    share_out_amount: &str,
    token_in_maxs: Vec<Coin>,
) -> Message {
    Message::JoinPool {
        sender: sender.to_string(),
        pool_id,
        share_out_amount: share_out_amount.to_string(),
        token_in_maxs,
    }
}

pub fn msg_exit_pool(
    sender: &str,
    pool_id: u64,
    share_in_amount: &str,
    token_out_mins: Vec<Coin>,
) -> Message {
    Message::ExitPool {
        sender: sender.to_string(),
        pool_id,
        share_in_amount: share_in_amount.to_string(),
        token_out_mins,
    }
}

pub fn msg_superfluid_delegate(sender: &str, lock_id: u64, val_addr: &str) -> Message {
    Message::SuperfluidDelegate {
        sender: sender.to_string(),
        lock_id,
        val_addr: val_addr.to_string(),
    }
}

pub fn msg_superfluid_undelegate(sender: &str, lock_id: u64) -> Message {
    Message::SuperfluidUndelegate {
        sender: sender.to_string(),
        lock_id,
    }
}

pub fn msg_create_denom(sender: &str, subdenom: &str) -> Message {
    Message::CreateDenom {
        sender: sender.to_string(),
        subdenom: subdenom.to_string(),
    }
}

pub fn msg_mint(sender: &str, amount: Coin, mint_to_address: &str) -> Message {
    Message::Mint {
        sender: sender.to_string(),
        amount,
        mint_to_address: mint_to_address.to_string(),
    }
}

pub fn msg_burn(sender: &str, amount: Coin, burn_from_address: &str) -> Message {
    Message::Burn {
        sender: sender.to_string(),
        amount,
        burn_from_address: burn_from_address.to_string(),
    }
}
