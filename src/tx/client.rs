//! Signing & broadcast client
//!
//! SECURITY: the mnemonic is exposed only inside [`SecureWallet`]; this module
//! sees addresses, public keys and signatures.

use super::fee::{compute_fee, ExecutionOptions, Fee, SimulationResult};
use super::messages::{resolve_signers, Message};
use super::result::ExecutionResult;
use super::transport::{AccountInfo, ChainTransport, HttpTransport};
use crate::config::NetworkConfig;
use crate::wallet::SecureWallet;
use crate::{Error, Result};
use cosmos_sdk_proto::cosmos::tx::v1beta1::TxRaw;
use cosmrs::tendermint::chain;
use cosmrs::tx::{self, Body, Raw, SignDoc, SignerInfo};
use cosmrs::Denom;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

/// HD account index used for every execution
const ACCOUNT_INDEX: u32 = 0;

/// Signs message batches with a per-call wallet and hands them to a transport
#[derive(Clone)]
pub struct SigningClient {
    network: Arc<NetworkConfig>,
    transport: Arc<dyn ChainTransport>,
}

impl SigningClient {
    pub fn new(network: Arc<NetworkConfig>, transport: Arc<dyn ChainTransport>) -> Self {
        Self { network, transport }
    }

    /// Client backed by the network's RPC/REST endpoints
    pub fn http(network: Arc<NetworkConfig>, timeout: Duration) -> Self {
        let transport = Arc::new(HttpTransport::new(network.clone(), timeout));
        Self::new(network, transport)
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn wallet(&self, mnemonic: &SecretString) -> Result<SecureWallet> {
        SecureWallet::from_mnemonic(mnemonic, &self.network.address_prefix, ACCOUNT_INDEX)
    }

    /// Sign and broadcast `messages`, single attempt.
    ///
    /// Never returns an error: derivation, transport and chain failures are all
    /// folded into the [`ExecutionResult`].
    pub async fn execute(
        &self,
        mnemonic: &SecretString,
        messages: &[Message],
        options: &ExecutionOptions,
    ) -> ExecutionResult {
        let wallet = match self.wallet(mnemonic) {
            Ok(wallet) => wallet,
            Err(e) => return ExecutionResult::failure(format!("Failed to create signing client: {}", e)),
        };

        match self.sign_and_broadcast(&wallet, messages, options).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(address = %wallet.address(), error = %e, "Transaction did not reach the chain");
                ExecutionResult::failure(e.to_string())
            }
        }
    }

    async fn sign_and_broadcast(
        &self,
        wallet: &SecureWallet,
        messages: &[Message],
        options: &ExecutionOptions,
    ) -> Result<ExecutionResult> {
        if messages.is_empty() {
            return Err(Error::InvalidArgument("No messages to execute".to_string()));
        }
        let messages = resolve_signers(messages, wallet.address());

        if options.gas.is_none() && options.fee.is_none() {
            tracing::debug!(
                messages = messages.len(),
                "No gas limit supplied, using default; run simulate-transaction for an estimate"
            );
        }
        let fee = compute_fee(options)?;
        let account = self.account_info(wallet.address()).await?;

        let tx = build_tx(
            wallet,
            &self.network.chain_id,
            account,
            &messages,
            &fee,
            options.memo(),
            true,
        )?;

        tracing::info!(
            address = %wallet.address(),
            messages = messages.len(),
            gas = fee.gas_limit,
            sequence = account.sequence,
            "Broadcasting transaction"
        );
        let outcome = self.transport.broadcast(&tx).await?;
        if outcome.code == 0 {
            tracing::info!(tx_hash = %outcome.tx_hash, height = outcome.height, "Transaction committed");
        } else {
            tracing::warn!(tx_hash = %outcome.tx_hash, code = outcome.code, "Transaction rejected by chain");
        }

        Ok(ExecutionResult::from_broadcast(outcome))
    }

    /// Accounts the chain has not seen yet sign with 0/0; the chain decides.
    async fn account_info(&self, address: &str) -> Result<AccountInfo> {
        match self.transport.account(address).await? {
            Some(info) => Ok(info),
            None => {
                tracing::warn!(address = %address, "Account not found on chain, signing with account number 0");
                Ok(AccountInfo::default())
            }
        }
    }

    /// Dry-run `messages` and suggest a gas limit with a 30% buffer.
    ///
    /// Failures come back as `success: false` with zero gas.
    pub async fn simulate(
        &self,
        mnemonic: &SecretString,
        messages: &[Message],
        memo: &str,
    ) -> SimulationResult {
        let wallet = match self.wallet(mnemonic) {
            Ok(wallet) => wallet,
            Err(e) => return SimulationResult::failed(format!("Failed to create signing client: {}", e)),
        };

        match self.try_simulate(&wallet, messages, memo).await {
            Ok(gas_used) => {
                tracing::debug!(address = %wallet.address(), gas_used, "Simulation succeeded");
                SimulationResult::success(gas_used)
            }
            Err(e) => {
                tracing::warn!(address = %wallet.address(), error = %e, "Simulation failed");
                SimulationResult::failed(e.to_string())
            }
        }
    }

    async fn try_simulate(&self, wallet: &SecureWallet, messages: &[Message], memo: &str) -> Result<u64> {
        if messages.is_empty() {
            return Err(Error::InvalidArgument("No messages to simulate".to_string()));
        }
        let messages = resolve_signers(messages, wallet.address());
        let fee = compute_fee(&ExecutionOptions::default())?;
        let account = self.account_info(wallet.address()).await?;

        let tx = build_tx(
            wallet,
            &self.network.chain_id,
            account,
            &messages,
            &fee,
            memo,
            false,
        )?;
        self.transport.simulate(&tx).await
    }
}

impl std::fmt::Debug for SigningClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningClient")
            .field("chain_id", &self.network.chain_id)
            .finish()
    }
}

fn tx_error(e: impl std::fmt::Display) -> Error {
    Error::Transaction(e.to_string())
}

fn fee_coin(coin: &super::messages::Coin) -> Result<cosmrs::Coin> {
    let amount = coin
        .amount
        .parse::<u128>()
        .map_err(|e| Error::InvalidArgument(format!("Invalid fee amount '{}': {}", coin.amount, e)))?;
    let denom = coin
        .denom
        .parse::<Denom>()
        .map_err(|e| Error::InvalidArgument(format!("Invalid fee denom '{}': {}", coin.denom, e)))?;
    Ok(cosmrs::Coin { denom, amount })
}

/// Assemble and encode a `TxRaw` in SIGN_MODE_DIRECT.
///
/// With `sign == false` the signature is left empty, which is what the
/// simulate endpoint expects.
pub(crate) fn build_tx(
    wallet: &SecureWallet,
    chain_id: &str,
    account: AccountInfo,
    messages: &[Message],
    fee: &Fee,
    memo: &str,
    sign: bool,
) -> Result<Vec<u8>> {
    let messages = messages
        .iter()
        .map(Message::to_any)
        .collect::<Result<Vec<_>>>()?;
    let body = Body::new(messages, memo, 0u32);

    let fee = tx::Fee {
        amount: fee.amount.iter().map(fee_coin).collect::<Result<Vec<_>>>()?,
        gas_limit: fee.gas_limit,
        payer: None,
        granter: None,
    };
    let auth_info =
        SignerInfo::single_direct(Some(wallet.cosmos_public_key()), account.sequence).auth_info(fee);

    let raw = if sign {
        let chain_id = chain_id
            .parse::<chain::Id>()
            .map_err(|e| Error::Config(format!("Invalid chain id '{}': {}", chain_id, e)))?;
        let sign_doc =
            SignDoc::new(&body, &auth_info, &chain_id, account.account_number).map_err(tx_error)?;
        wallet.sign(sign_doc)?
    } else {
        Raw::from(TxRaw {
            body_bytes: body.into_bytes().map_err(tx_error)?,
            auth_info_bytes: auth_info.into_bytes().map_err(tx_error)?,
            signatures: vec![Vec::new()],
        })
    };

    raw.to_bytes().map_err(tx_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::messages::{msg_send, msg_vote, Coin, VoteOption};
    use crate::tx::result::BroadcastOutcome;
    use crate::tx::transport::mock::MockTransport;
    use cosmos_sdk_proto::cosmos::tx::v1beta1::SignDoc as ProtoSignDoc;
    use cosmrs::tx::Tx;
    use crate::tx::fee::DEFAULT_GAS_LIMIT;
    use k256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
    use prost::Message as _;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn mnemonic(phrase: &str) -> SecretString {
        SecretString::from(phrase.to_string())
    }

    fn outcome(code: u32, raw_log: &str) -> BroadcastOutcome {
        BroadcastOutcome {
            code,
            raw_log: raw_log.to_string(),
            tx_hash: "0A1B2C".to_string(),
            gas_used: 80_000,
            gas_wanted: 200_000,
            height: 4242,
        }
    }

    fn client(transport: Arc<MockTransport>) -> SigningClient {
        SigningClient::new(Arc::new(NetworkConfig::testnet()), transport)
    }

    fn send_batch() -> Vec<Message> {
        vec![msg_send("", "osmo1recipient", vec![Coin::new("1000", "uosmo")])]
    }

    #[tokio::test]
    async fn test_execute_success() {
        let transport = Arc::new(MockTransport::with_outcome(outcome(0, "")));
        let result = client(transport.clone())
            .execute(&mnemonic(TEST_MNEMONIC), &send_batch(), &ExecutionOptions::default())
            .await;

        assert!(result.success());
        assert_eq!(result.tx_hash(), Some("0A1B2C"));
        assert_eq!(result.gas_used(), Some("80000"));
        assert_eq!(result.height(), Some(4242));
        assert_eq!(transport.broadcast_count(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_tx_is_signed_for_chain() {
        let transport = Arc::new(MockTransport::with_outcome(outcome(0, "")));
        let options = ExecutionOptions {
            memo: Some("hello".to_string()),
            gas: Some(100_000),
            ..Default::default()
        };
        client(transport.clone())
            .execute(&mnemonic(TEST_MNEMONIC), &send_batch(), &options)
            .await;

        let bytes = transport.last_broadcast().unwrap();
        let tx = Tx::from_bytes(&bytes).unwrap();
        let wallet = SecureWallet::from_mnemonic(&mnemonic(TEST_MNEMONIC), "osmo", 0).unwrap();

        // signer slot resolved before encoding
        let expected = send_batch()[0].with_signer(wallet.address()).to_any().unwrap();
        assert_eq!(tx.body.messages, vec![expected]);
        assert_eq!(tx.body.memo, "hello");

        assert_eq!(tx.auth_info.fee.gas_limit, 100_000);
        assert_eq!(tx.auth_info.fee.amount[0].amount, 2500);
        assert_eq!(tx.auth_info.fee.amount[0].denom.to_string(), "uosmo");
        assert_eq!(tx.auth_info.signer_infos[0].sequence, 7);

        // the signature covers the exact body/auth bytes under our chain id and account number
        let raw = TxRaw::decode(bytes.as_slice()).unwrap();
        let sign_doc = ProtoSignDoc {
            body_bytes: raw.body_bytes.clone(),
            auth_info_bytes: raw.auth_info_bytes.clone(),
            chain_id: "osmo-test-5".to_string(),
            account_number: 42,
        };
        let key = VerifyingKey::from_sec1_bytes(wallet.public_key()).unwrap();
        let signature = Signature::from_slice(&raw.signatures[0]).unwrap();
        assert!(key.verify(&sign_doc.encode_to_vec(), &signature).is_ok());
        assert!(signature.normalize_s().is_none());
    }

    #[tokio::test]
    async fn test_execute_logical_failure_keeps_hash() {
        let transport = Arc::new(MockTransport::with_outcome(outcome(
            5,
            "0uosmo is smaller than 1000uosmo: insufficient funds",
        )));
        let result = client(transport)
            .execute(&mnemonic(TEST_MNEMONIC), &send_batch(), &ExecutionOptions::default())
            .await;

        assert!(!result.success());
        assert_eq!(
            result.error(),
            Some("Transaction failed with code 5: 0uosmo is smaller than 1000uosmo: insufficient funds")
        );
        assert_eq!(result.tx_hash(), Some("0A1B2C"));
        assert_eq!(result.gas_wanted(), Some("200000"));
    }

    #[tokio::test]
    async fn test_execute_transport_failure_has_no_telemetry() {
        let transport = Arc::new(MockTransport {
            account: Some(AccountInfo::default()),
            ..Default::default()
        });
        let result = client(transport)
            .execute(&mnemonic(TEST_MNEMONIC), &send_batch(), &ExecutionOptions::default())
            .await;

        assert!(!result.success());
        assert_eq!(result.error(), Some("Transport error: connection refused"));
        assert!(result.tx_hash().is_none());
        assert!(result.height().is_none());
        assert!(result.gas_used().is_none());
    }

    #[tokio::test]
    async fn test_execute_bad_mnemonic_never_broadcasts() {
        let transport = Arc::new(MockTransport::with_outcome(outcome(0, "")));
        let eleven = TEST_MNEMONIC.rsplit_once(' ').unwrap().0;
        let result = client(transport.clone())
            .execute(&mnemonic(eleven), &send_batch(), &ExecutionOptions::default())
            .await;

        assert_eq!(
            result.error(),
            Some("Failed to create signing client: Invalid mnemonic phrase")
        );
        assert!(result.tx_hash().is_none());
        assert_eq!(transport.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_account_signs_with_zero() {
        let transport = Arc::new(MockTransport {
            account: None,
            outcome: Some(outcome(32, "account sequence mismatch")),
            ..Default::default()
        });
        let result = client(transport.clone())
            .execute(
                &mnemonic(TEST_MNEMONIC),
                &[msg_vote(1, "", VoteOption::Yes)],
                &ExecutionOptions::default(),
            )
            .await;

        assert!(!result.success());
        assert!(result.tx_hash().is_some());
        let tx = Tx::from_bytes(&transport.last_broadcast().unwrap()).unwrap();
        assert_eq!(tx.auth_info.signer_infos[0].sequence, 0);
    }

    #[tokio::test]
    async fn test_invalid_gas_price_is_reported() {
        let transport = Arc::new(MockTransport::with_outcome(outcome(0, "")));
        let options = ExecutionOptions {
            gas_price: Some("cheap".to_string()),
            ..Default::default()
        };
        let result = client(transport.clone())
            .execute(&mnemonic(TEST_MNEMONIC), &send_batch(), &options)
            .await;

        assert!(!result.success());
        assert!(result.error().unwrap().contains("Invalid gas price"));
        assert_eq!(transport.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_simulate_applies_buffer() {
        let transport = Arc::new(MockTransport {
            simulate_gas: Some(100_000),
            ..Default::default()
        });
        let result = client(transport)
            .simulate(&mnemonic(TEST_MNEMONIC), &send_batch(), "")
            .await;

        assert!(result.success);
        assert_eq!(result.gas_used, 100_000);
        assert_eq!(result.gas_wanted, 130_000);
    }

    #[tokio::test]
    async fn test_simulate_failure_is_zeroed() {
        let transport = Arc::new(MockTransport::default());
        let result = client(transport)
            .simulate(&mnemonic(TEST_MNEMONIC), &send_batch(), "")
            .await;

        assert!(!result.success);
        assert_eq!((result.gas_used, result.gas_wanted), (0, 0));
        assert_eq!(result.error.as_deref(), Some("Transport error: simulation unavailable"));
    }

    #[test]
    fn test_unsigned_tx_has_empty_signature() {
        let wallet = SecureWallet::from_mnemonic(&mnemonic(TEST_MNEMONIC), "osmo", 0).unwrap();
        let fee = compute_fee(&ExecutionOptions::default()).unwrap();
        let bytes = build_tx(
            &wallet,
            "osmo-test-5",
            AccountInfo::default(),
            &send_batch(),
            &fee,
            "",
            false,
        )
        .unwrap();
        let raw = TxRaw::decode(bytes.as_slice()).unwrap();
        assert_eq!(raw.signatures, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_explicit_fee_in_other_denom() {
        let wallet = SecureWallet::from_mnemonic(&mnemonic(TEST_MNEMONIC), "osmo", 0).unwrap();
        let options = ExecutionOptions {
            fee: Some(vec![Coin::new("7777", "uion")]),
            ..Default::default()
        };
        let fee = compute_fee(&options).unwrap();
        let bytes = build_tx(
            &wallet,
            "osmo-test-5",
            AccountInfo::default(),
            &send_batch(),
            &fee,
            "",
            true,
        )
        .unwrap();
        let tx = Tx::from_bytes(&bytes).unwrap();
        assert_eq!(tx.auth_info.fee.amount[0].amount, 7777);
        assert_eq!(tx.auth_info.fee.amount[0].denom.to_string(), "uion");
        assert_eq!(tx.auth_info.fee.gas_limit, DEFAULT_GAS_LIMIT);
    }
}
