//! State-changing Osmosis tools
//!
//! Each operation only knows how to turn its arguments into messages; signing,
//! fees and broadcast are shared through [`ExecutionTool`].

use super::types::{
    check_required, deserialize_secret, opt_u64_from_any, parse_args, u64_from_any, CommonArgs,
};
use super::{Tool, ToolRegistry};
use crate::config::NetworkConfig;
use crate::tx::messages::{self, BankIo, IbcTimeout, SwapRoute};
use crate::tx::{validate_coins, Coin, Message, SigningClient, ToolResponse, VoteOption};
use crate::wallet::{address_prefix, validate_address};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::marker::PhantomData;

/// Default initial deposit for text proposals, in base units of the network denom
const DEFAULT_PROPOSAL_DEPOSIT: &str = "10000000";

/// IBC timeout applied when the caller gives neither a height nor a timestamp
const DEFAULT_IBC_TIMEOUT_MINUTES: i64 = 10;

const DEFAULT_IBC_PORT: &str = "transfer";

/// A chain operation exposed as a tool
pub trait Operation: Send + Sync + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Always starts with `mnemonic`
    const REQUIRED: &'static [&'static str];
    type Args: DeserializeOwned + JsonSchema + Send;

    fn messages(args: Self::Args, network: &NetworkConfig) -> Result<Vec<Message>>;
}

/// Common execution arguments plus the operation's own
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecutionInput<A> {
    #[serde(flatten)]
    common: CommonArgs,
    #[serde(flatten)]
    args: A,
}

pub struct ExecutionTool<O> {
    client: SigningClient,
    _operation: PhantomData<fn() -> O>,
}

impl<O: Operation> ExecutionTool<O> {
    pub fn new(client: SigningClient) -> Self {
        Self {
            client,
            _operation: PhantomData,
        }
    }
}

#[async_trait]
impl<O: Operation> Tool for ExecutionTool<O> {
    const NAME: &'static str = O::NAME;
    type Input = ExecutionInput<O::Args>;

    fn description(&self) -> &'static str {
        O::DESCRIPTION
    }

    fn required(&self) -> &'static [&'static str] {
        O::REQUIRED
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        input.common.check_mnemonic()?;
        let messages = O::messages(input.args, self.client.network())?;

        tracing::debug!(tool = O::NAME, messages = messages.len(), "Executing");
        let result = self
            .client
            .execute(&input.common.mnemonic, &messages, &input.common.options())
            .await;
        Ok(ToolResponse::new(O::NAME, result).to_value())
    }
}

pub fn register_execution_tools(registry: &mut ToolRegistry, client: &SigningClient) {
    registry.register(ExecutionTool::<SendTokens>::new(client.clone()));
    registry.register(ExecutionTool::<MultiSend>::new(client.clone()));
    registry.register(ExecutionTool::<Delegate>::new(client.clone()));
    registry.register(ExecutionTool::<Undelegate>::new(client.clone()));
    registry.register(ExecutionTool::<Redelegate>::new(client.clone()));
    registry.register(ExecutionTool::<ClaimRewards>::new(client.clone()));
    registry.register(ExecutionTool::<SubmitProposal>::new(client.clone()));
    registry.register(ExecutionTool::<VoteProposal>::new(client.clone()));
    registry.register(ExecutionTool::<DepositProposal>::new(client.clone()));
    registry.register(ExecutionTool::<IbcTransfer>::new(client.clone()));
    registry.register(ExecutionTool::<LockTokens>::new(client.clone()));
    registry.register(ExecutionTool::<BeginUnlocking>::new(client.clone()));
    registry.register(ExecutionTool::<BeginUnlockingAll>::new(client.clone()));
    registry.register(ExecutionTool::<SwapExactAmountIn>::new(client.clone()));
    registry.register(ExecutionTool::<JoinPool>::new(client.clone()));
    registry.register(ExecutionTool::<ExitPool>::new(client.clone()));
    registry.register(ExecutionTool::<SuperfluidDelegate>::new(client.clone()));
    registry.register(ExecutionTool::<SuperfluidUndelegate>::new(client.clone()));
    registry.register(ExecutionTool::<CreateDenom>::new(client.clone()));
    registry.register(ExecutionTool::<MintTokens>::new(client.clone()));
    registry.register(ExecutionTool::<BurnTokens>::new(client.clone()));
}

type BuildFn = fn(Value, &NetworkConfig) -> Result<Vec<Message>>;

fn build_with<O: Operation>(args: Value, network: &NetworkConfig) -> Result<Vec<Message>> {
    let required: Vec<&str> = O::REQUIRED
        .iter()
        .copied()
        .filter(|name| *name != "mnemonic")
        .collect();
    check_required(&args, &required)?;
    O::messages(parse_args(args)?, network)
}

fn simulation_builder(tool: &str) -> Option<BuildFn> {
    let build: BuildFn = match tool {
        super::TOOL_SEND => build_with::<SendTokens>,
        super::TOOL_MULTI_SEND => build_with::<MultiSend>,
        super::TOOL_DELEGATE => build_with::<Delegate>,
        super::TOOL_UNDELEGATE => build_with::<Undelegate>,
        super::TOOL_REDELEGATE => build_with::<Redelegate>,
        super::TOOL_CLAIM_REWARDS => build_with::<ClaimRewards>,
        super::TOOL_SUBMIT_PROPOSAL => build_with::<SubmitProposal>,
        super::TOOL_VOTE_PROPOSAL => build_with::<VoteProposal>,
        super::TOOL_DEPOSIT_PROPOSAL => build_with::<DepositProposal>,
        super::TOOL_IBC_TRANSFER => build_with::<IbcTransfer>,
        super::TOOL_LOCK_TOKENS => build_with::<LockTokens>,
        super::TOOL_BEGIN_UNLOCKING => build_with::<BeginUnlocking>,
        super::TOOL_BEGIN_UNLOCKING_ALL => build_with::<BeginUnlockingAll>,
        super::TOOL_SWAP_EXACT_AMOUNT_IN => build_with::<SwapExactAmountIn>,
        super::TOOL_JOIN_POOL => build_with::<JoinPool>,
        super::TOOL_EXIT_POOL => build_with::<ExitPool>,
        super::TOOL_SUPERFLUID_DELEGATE => build_with::<SuperfluidDelegate>,
        super::TOOL_SUPERFLUID_UNDELEGATE => build_with::<SuperfluidUndelegate>,
        super::TOOL_CREATE_DENOM => build_with::<CreateDenom>,
        super::TOOL_MINT_TOKENS => build_with::<MintTokens>,
        super::TOOL_BURN_TOKENS => build_with::<BurnTokens>,
        _ => return None,
    };
    Some(build)
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulateInput {
    /// BIP-39 mnemonic of the signing wallet
    #[serde(deserialize_with = "deserialize_secret")]
    #[schemars(with = "String")]
    mnemonic: SecretString,
    /// Name of the execution tool to dry-run, e.g. `send`
    tool: String,
    /// Arguments for that tool, without the mnemonic
    #[serde(default)]
    arguments: super::AnyJson,
    #[serde(default)]
    memo: Option<String>,
}

/// Dry-run any execution tool and report a buffered gas estimate
pub struct SimulateTransactionTool {
    client: SigningClient,
}

impl SimulateTransactionTool {
    pub fn new(client: SigningClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SimulateTransactionTool {
    const NAME: &'static str = super::TOOL_SIMULATE_TRANSACTION;
    type Input = SimulateInput;

    fn description(&self) -> &'static str {
        "Estimate gas for an execution tool without broadcasting. Returns gasUsed and a \
         recommended gasWanted (gasUsed + 30%)."
    }

    fn required(&self) -> &'static [&'static str] {
        &["mnemonic", "tool"]
    }

    async fn execute(&self, input: Self::Input) -> Result<Value> {
        let build = simulation_builder(&input.tool)
            .ok_or_else(|| Error::NotImplemented(input.tool.clone()))?;

        let common = CommonArgs {
            mnemonic: input.mnemonic,
            gas: None,
            gas_price: None,
            memo: input.memo,
            fee: None,
        };
        common.check_mnemonic()?;
        let messages = build(input.arguments.into(), self.client.network())?;

        let result = self
            .client
            .simulate(&common.mnemonic, &messages, common.options().memo())
            .await;

        let mut response = json!({
            "tool": Self::NAME,
            "simulatedTool": input.tool,
        });
        if let (Value::Object(map), Value::Object(fields)) = (&mut response, serde_json::to_value(&result)?) {
            map.extend(fields);
        }
        Ok(response)
    }
}

fn check_address(address: &str, prefix: &str) -> Result<()> {
    if validate_address(address, prefix) {
        Ok(())
    } else {
        Err(Error::InvalidAddress(format!(
            "{} (expected prefix '{}')",
            address, prefix
        )))
    }
}

fn check_account(address: &str, network: &NetworkConfig) -> Result<()> {
    check_address(address, &network.address_prefix)
}

fn check_validator(address: &str, network: &NetworkConfig) -> Result<()> {
    check_address(address, &format!("{}valoper", network.address_prefix))
}

/// Base-unit integer carried as a string
fn check_integer(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidArgument(format!(
            "{} must be a non-negative integer, got '{}'",
            field, value
        )));
    }
    Ok(())
}

fn non_empty_coins(field: &str, coins: &[Coin]) -> Result<()> {
    if coins.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must contain at least one coin", field)));
    }
    validate_coins(coins)
}

/// Lockup durations: plain seconds, or a number with an `s`/`m`/`h`/`d` suffix
pub(crate) fn parse_duration_secs(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let invalid = || Error::InvalidArgument(format!("Invalid lock duration: '{}'", input));

    let (digits, unit) = match trimmed.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&trimmed[..i], c.to_ascii_lowercase()),
        Some(_) => (trimmed, 's'),
        None => return Err(invalid()),
    };
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        _ => return Err(invalid()),
    };
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let secs = value.checked_mul(multiplier).ok_or_else(invalid)?;
    if secs == 0 {
        return Err(Error::InvalidArgument("Lock duration must be positive".to_string()));
    }
    Ok(secs)
}

fn default_ibc_timeout_nanos() -> Result<u64> {
    let deadline = chrono::Utc::now() + chrono::Duration::minutes(DEFAULT_IBC_TIMEOUT_MINUTES);
    deadline
        .timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .ok_or_else(|| Error::InvalidArgument("IBC timeout out of range".to_string()))
}

// ---- bank ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendArgs {
    /// Recipient address
    to_address: String,
    /// Coins to send
    amount: Vec<Coin>,
}

pub struct SendTokens;

impl Operation for SendTokens {
    const NAME: &'static str = super::TOOL_SEND;
    const DESCRIPTION: &'static str = "Send tokens to another address";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "toAddress", "amount"];
    type Args = SendArgs;

    fn messages(args: SendArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_account(&args.to_address, network)?;
        non_empty_coins("amount", &args.amount)?;
        Ok(vec![messages::msg_send("", &args.to_address, args.amount)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultiSendArgs {
    /// Inputs; an empty address means the signer
    inputs: Vec<BankIo>,
    outputs: Vec<BankIo>,
}

pub struct MultiSend;

impl Operation for MultiSend {
    const NAME: &'static str = super::TOOL_MULTI_SEND;
    const DESCRIPTION: &'static str = "Send tokens from one or more inputs to multiple recipients";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "inputs", "outputs"];
    type Args = MultiSendArgs;

    fn messages(args: MultiSendArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        if args.inputs.is_empty() || args.outputs.is_empty() {
            return Err(Error::InvalidArgument(
                "multi-send needs at least one input and one output".to_string(),
            ));
        }
        for input in &args.inputs {
            if !input.address.trim().is_empty() {
                check_account(&input.address, network)?;
            }
            non_empty_coins("inputs.coins", &input.coins)?;
        }
        for output in &args.outputs {
            check_account(&output.address, network)?;
            non_empty_coins("outputs.coins", &output.coins)?;
        }
        Ok(vec![messages::msg_multi_send(args.inputs, args.outputs)])
    }
}

// ---- staking & distribution ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegationArgs {
    /// Validator operator address (`osmovaloper...`)
    validator_address: String,
    amount: Coin,
}

pub struct Delegate;

impl Operation for Delegate {
    const NAME: &'static str = super::TOOL_DELEGATE;
    const DESCRIPTION: &'static str = "Delegate tokens to a validator";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "validatorAddress", "amount"];
    type Args = DelegationArgs;

    fn messages(args: DelegationArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_validator(&args.validator_address, network)?;
        args.amount.validate()?;
        Ok(vec![messages::msg_delegate("", &args.validator_address, args.amount)])
    }
}

pub struct Undelegate;

impl Operation for Undelegate {
    const NAME: &'static str = super::TOOL_UNDELEGATE;
    const DESCRIPTION: &'static str = "Undelegate tokens from a validator";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "validatorAddress", "amount"];
    type Args = DelegationArgs;

    fn messages(args: DelegationArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_validator(&args.validator_address, network)?;
        args.amount.validate()?;
        Ok(vec![messages::msg_undelegate("", &args.validator_address, args.amount)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedelegateArgs {
    validator_src_address: String,
    validator_dst_address: String,
    amount: Coin,
}

pub struct Redelegate;

impl Operation for Redelegate {
    const NAME: &'static str = super::TOOL_REDELEGATE;
    const DESCRIPTION: &'static str = "Move a delegation from one validator to another";
    const REQUIRED: &'static [&'static str] =
        &["mnemonic", "validatorSrcAddress", "validatorDstAddress", "amount"];
    type Args = RedelegateArgs;

    fn messages(args: RedelegateArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_validator(&args.validator_src_address, network)?;
        check_validator(&args.validator_dst_address, network)?;
        if args.validator_src_address == args.validator_dst_address {
            return Err(Error::InvalidArgument(
                "Source and destination validators must differ".to_string(),
            ));
        }
        args.amount.validate()?;
        Ok(vec![messages::msg_begin_redelegate(
            "",
            &args.validator_src_address,
            &args.validator_dst_address,
            args.amount,
        )])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRewardsArgs {
    validator_address: String,
}

pub struct ClaimRewards;

impl Operation for ClaimRewards {
    const NAME: &'static str = super::TOOL_CLAIM_REWARDS;
    const DESCRIPTION: &'static str = "Withdraw staking rewards from a validator";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "validatorAddress"];
    type Args = ClaimRewardsArgs;

    fn messages(args: ClaimRewardsArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_validator(&args.validator_address, network)?;
        Ok(vec![messages::msg_withdraw_delegator_reward("", &args.validator_address)])
    }
}

// ---- governance ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProposalArgs {
    title: String,
    description: String,
    /// Proposal type; only `text` is supported
    #[serde(default, rename = "type")]
    proposal_type: Option<String>,
    /// Defaults to 10000000 of the network denom
    #[serde(default)]
    initial_deposit: Option<Vec<Coin>>,
}

pub struct SubmitProposal;

impl Operation for SubmitProposal {
    const NAME: &'static str = super::TOOL_SUBMIT_PROPOSAL;
    const DESCRIPTION: &'static str = "Submit a text governance proposal";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "title", "description"];
    type Args = SubmitProposalArgs;

    fn messages(args: SubmitProposalArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        match args.proposal_type.as_deref().map(str::trim) {
            None | Some("") => {}
            Some(t) if t.eq_ignore_ascii_case("text") => {}
            Some(other) => {
                return Err(Error::InvalidArgument(format!(
                    "Unsupported proposal type: {}",
                    other
                )))
            }
        }
        let deposit = args.initial_deposit.unwrap_or_else(|| {
            vec![Coin::new(DEFAULT_PROPOSAL_DEPOSIT, network.default_denom.clone())]
        });
        validate_coins(&deposit)?;
        Ok(vec![messages::msg_submit_text_proposal(
            "",
            deposit,
            &args.title,
            &args.description,
        )])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    proposal_id: u64,
    /// `yes`, `no`, `abstain` or `no_with_veto`
    option: String,
}

pub struct VoteProposal;

impl Operation for VoteProposal {
    const NAME: &'static str = super::TOOL_VOTE_PROPOSAL;
    const DESCRIPTION: &'static str = "Vote on a governance proposal";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "proposalId", "option"];
    type Args = VoteArgs;

    fn messages(args: VoteArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        let option = VoteOption::parse(&args.option)?;
        Ok(vec![messages::msg_vote(args.proposal_id, "", option)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    proposal_id: u64,
    /// Amount in base units
    amount: String,
    /// Defaults to the network denom
    #[serde(default)]
    denom: Option<String>,
}

pub struct DepositProposal;

impl Operation for DepositProposal {
    const NAME: &'static str = super::TOOL_DEPOSIT_PROPOSAL;
    const DESCRIPTION: &'static str = "Add a deposit to a governance proposal";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "proposalId", "amount"];
    type Args = DepositArgs;

    fn messages(args: DepositArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        let denom = args
            .denom
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| network.default_denom.clone());
        let coin = Coin::new(args.amount, denom);
        coin.validate()?;
        Ok(vec![messages::msg_deposit(args.proposal_id, "", vec![coin])])
    }
}

// ---- ibc ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutHeight {
    #[serde(default, deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    revision_number: u64,
    #[serde(default, deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    revision_height: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IbcTransferArgs {
    /// Defaults to `transfer`
    #[serde(default)]
    source_port: Option<String>,
    /// e.g. `channel-0`
    source_channel: String,
    token: Coin,
    /// Address on the destination chain
    receiver: String,
    #[serde(default)]
    timeout_height: Option<TimeoutHeight>,
    /// Unix time in nanoseconds. Ten minutes from now when no timeout is given.
    #[serde(default, deserialize_with = "opt_u64_from_any")]
    #[schemars(with = "Option<u64>")]
    timeout_timestamp: Option<u64>,
}

pub struct IbcTransfer;

impl Operation for IbcTransfer {
    const NAME: &'static str = super::TOOL_IBC_TRANSFER;
    const DESCRIPTION: &'static str = "Transfer tokens to another chain over IBC";
    const REQUIRED: &'static [&'static str] =
        &["mnemonic", "sourceChannel", "token", "receiver"];
    type Args = IbcTransferArgs;

    fn messages(args: IbcTransferArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        if address_prefix(&args.receiver).is_none() {
            return Err(Error::InvalidAddress(args.receiver));
        }
        args.token.validate()?;

        let mut timeout = IbcTimeout::default();
        if let Some(height) = &args.timeout_height {
            timeout.revision_number = height.revision_number;
            timeout.revision_height = height.revision_height;
        }
        timeout.timestamp_nanos = args.timeout_timestamp.unwrap_or(0);
        if timeout.revision_height == 0 && timeout.timestamp_nanos == 0 {
            timeout.timestamp_nanos = default_ibc_timeout_nanos()?;
        }

        let port = args
            .source_port
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IBC_PORT.to_string());
        Ok(vec![messages::msg_transfer(
            &port,
            &args.source_channel,
            args.token,
            "",
            &args.receiver,
            timeout,
            "",
        )])
    }
}

// ---- lockup ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LockDuration {
    Seconds(u64),
    /// e.g. `86400s`, `24h`, `14d`
    Text(String),
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockTokensArgs {
    coins: Vec<Coin>,
    duration: LockDuration,
}

pub struct LockTokens;

impl Operation for LockTokens {
    const NAME: &'static str = super::TOOL_LOCK_TOKENS;
    const DESCRIPTION: &'static str = "Lock tokens (e.g. LP shares) for a duration";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "coins", "duration"];
    type Args = LockTokensArgs;

    fn messages(args: LockTokensArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        let secs = match args.duration {
            LockDuration::Seconds(0) => {
                return Err(Error::InvalidArgument("Lock duration must be positive".to_string()))
            }
            LockDuration::Seconds(secs) => secs,
            LockDuration::Text(text) => parse_duration_secs(&text)?,
        };
        non_empty_coins("coins", &args.coins)?;
        Ok(vec![messages::msg_lock_tokens("", secs, args.coins)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeginUnlockingArgs {
    /// Lock id
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    id: u64,
    /// Partial amount; omit to unlock everything
    #[serde(default)]
    coins: Option<Vec<Coin>>,
}

pub struct BeginUnlocking;

impl Operation for BeginUnlocking {
    const NAME: &'static str = super::TOOL_BEGIN_UNLOCKING;
    const DESCRIPTION: &'static str = "Begin unlocking a specific lock";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "id"];
    type Args = BeginUnlockingArgs;

    fn messages(args: BeginUnlockingArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        let coins = args.coins.unwrap_or_default();
        validate_coins(&coins)?;
        Ok(vec![messages::msg_begin_unlocking("", args.id, coins)])
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoArgs {}

pub struct BeginUnlockingAll;

impl Operation for BeginUnlockingAll {
    const NAME: &'static str = super::TOOL_BEGIN_UNLOCKING_ALL;
    const DESCRIPTION: &'static str = "Begin unlocking every unlockable lock owned by the wallet";
    const REQUIRED: &'static [&'static str] = &["mnemonic"];
    type Args = NoArgs;

    fn messages(_args: NoArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        Ok(vec![messages::msg_begin_unlocking_all("")])
    }
}

// ---- pools ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapArgs {
    /// Hops, in order
    routes: Vec<SwapRoute>,
    token_in: Coin,
    /// Minimum output in base units (slippage bound)
    token_out_min_amount: String,
}

pub struct SwapExactAmountIn;

impl Operation for SwapExactAmountIn {
    const NAME: &'static str = super::TOOL_SWAP_EXACT_AMOUNT_IN;
    const DESCRIPTION: &'static str = "Swap an exact input amount through one or more pools";
    const REQUIRED: &'static [&'static str] =
        &["mnemonic", "routes", "tokenIn", "tokenOutMinAmount"];
    type Args = SwapArgs;

    fn messages(args: SwapArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        if args.routes.is_empty() {
            return Err(Error::InvalidArgument("routes must not be empty".to_string()));
        }
        if let Some(hop) = args.routes.iter().find(|r| r.token_out_denom.trim().is_empty()) {
            return Err(Error::InvalidArgument(format!(
                "Route through pool {} has no tokenOutDenom",
                hop.pool_id
            )));
        }
        args.token_in.validate()?;
        check_integer("tokenOutMinAmount", &args.token_out_min_amount)?;
        Ok(vec![messages::msg_swap_exact_amount_in(
            "",
            args.routes,
            args.token_in,
            &args.token_out_min_amount,
        )])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinPoolArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    pool_id: u64,
    share_out_amount: String,
    #[serde(default)]
    token_in_maxs: Option<Vec<Coin>>,
}

pub struct JoinPool;

impl Operation for JoinPool {
    const NAME: &'static str = super::TOOL_JOIN_POOL;
    const DESCRIPTION: &'static str = "Provide liquidity to a pool for a given amount of shares";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "poolId", "shareOutAmount"];
    type Args = JoinPoolArgs;

    fn messages(args: JoinPoolArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        check_integer("shareOutAmount", &args.share_out_amount)?;
        let maxs = args.token_in_maxs.unwrap_or_default();
        validate_coins(&maxs)?;
        Ok(vec![messages::msg_join_pool("", args.pool_id, &args.share_out_amount, maxs)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExitPoolArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    pool_id: u64,
    share_in_amount: String,
    #[serde(default)]
    token_out_mins: Option<Vec<Coin>>,
}

pub struct ExitPool;

impl Operation for ExitPool {
    const NAME: &'static str = super::TOOL_EXIT_POOL;
    const DESCRIPTION: &'static str = "Withdraw liquidity from a pool by burning shares";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "poolId", "shareInAmount"];
    type Args = ExitPoolArgs;

    fn messages(args: ExitPoolArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        check_integer("shareInAmount", &args.share_in_amount)?;
        let mins = args.token_out_mins.unwrap_or_default();
        validate_coins(&mins)?;
        Ok(vec![messages::msg_exit_pool("", args.pool_id, &args.share_in_amount, mins)])
    }
}

// ---- superfluid ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperfluidDelegateArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    lock_id: u64,
    /// Validator operator address
    val_addr: String,
}

pub struct SuperfluidDelegate;

impl Operation for SuperfluidDelegate {
    const NAME: &'static str = super::TOOL_SUPERFLUID_DELEGATE;
    const DESCRIPTION: &'static str = "Superfluid-delegate a locked LP position to a validator";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "lockId", "valAddr"];
    type Args = SuperfluidDelegateArgs;

    fn messages(args: SuperfluidDelegateArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        check_validator(&args.val_addr, network)?;
        Ok(vec![messages::msg_superfluid_delegate("", args.lock_id, &args.val_addr)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperfluidUndelegateArgs {
    #[serde(deserialize_with = "u64_from_any")]
    #[schemars(with = "u64")]
    lock_id: u64,
}

pub struct SuperfluidUndelegate;

impl Operation for SuperfluidUndelegate {
    const NAME: &'static str = super::TOOL_SUPERFLUID_UNDELEGATE;
    const DESCRIPTION: &'static str = "Remove the superfluid delegation of a lock";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "lockId"];
    type Args = SuperfluidUndelegateArgs;

    fn messages(args: SuperfluidUndelegateArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        Ok(vec![messages::msg_superfluid_undelegate("", args.lock_id)])
    }
}

// ---- tokenfactory ----

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDenomArgs {
    /// Becomes `factory/<creator>/<subdenom>`
    subdenom: String,
}

pub struct CreateDenom;

impl Operation for CreateDenom {
    const NAME: &'static str = super::TOOL_CREATE_DENOM;
    const DESCRIPTION: &'static str = "Create a tokenfactory denom owned by the wallet";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "subdenom"];
    type Args = CreateDenomArgs;

    fn messages(args: CreateDenomArgs, _network: &NetworkConfig) -> Result<Vec<Message>> {
        if args.subdenom.contains('/') || args.subdenom.chars().any(char::is_whitespace) {
            return Err(Error::InvalidArgument(format!(
                "Invalid subdenom: '{}'",
                args.subdenom
            )));
        }
        Ok(vec![messages::msg_create_denom("", &args.subdenom)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintArgs {
    amount: Coin,
    /// Defaults to the signer
    #[serde(default)]
    mint_to_address: Option<String>,
}

pub struct MintTokens;

impl Operation for MintTokens {
    const NAME: &'static str = super::TOOL_MINT_TOKENS;
    const DESCRIPTION: &'static str = "Mint tokens of a tokenfactory denom the wallet administers";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "amount"];
    type Args = MintArgs;

    fn messages(args: MintArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        args.amount.validate()?;
        let to = args.mint_to_address.unwrap_or_default();
        if !to.is_empty() {
            check_account(&to, network)?;
        }
        Ok(vec![messages::msg_mint("", args.amount, &to)])
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BurnArgs {
    amount: Coin,
    /// Defaults to the signer
    #[serde(default)]
    burn_from_address: Option<String>,
}

pub struct BurnTokens;

impl Operation for BurnTokens {
    const NAME: &'static str = super::TOOL_BURN_TOKENS;
    const DESCRIPTION: &'static str = "Burn tokens of a tokenfactory denom the wallet administers";
    const REQUIRED: &'static [&'static str] = &["mnemonic", "amount"];
    type Args = BurnArgs;

    fn messages(args: BurnArgs, network: &NetworkConfig) -> Result<Vec<Message>> {
        args.amount.validate()?;
        let from = args.burn_from_address.unwrap_or_default();
        if !from.is_empty() {
            check_account(&from, network)?;
        }
        Ok(vec![messages::msg_burn("", args.amount, &from)])
    }
}
