//! Wire mapping for [`Message`]
//!
//! Cosmos SDK messages map onto `cosmos-sdk-proto` types; Osmosis and IBC
//! messages map onto `osmosis-std` types. Type URLs come from those crates.

use super::messages::{self, BankIo, IbcTimeout, Message, ProposalContent, SwapRoute};
use crate::{Error, Result};
use cosmos_sdk_proto::cosmos::{
    bank::v1beta1 as bank, base::v1beta1 as base, distribution::v1beta1 as distribution,
    gov::v1beta1 as gov, staking::v1beta1 as staking,
};
use cosmrs::Any;
use osmosis_std::shim;
use osmosis_std::types::cosmos::base::v1beta1::Coin as OsmosisCoin;
use osmosis_std::types::ibc::applications::transfer::v1::MsgTransfer;
use osmosis_std::types::ibc::core::client::v1::Height;
use osmosis_std::types::osmosis::{
    gamm::v1beta1 as gamm, lockup, poolmanager::v1beta1 as poolmanager, superfluid,
    tokenfactory::v1beta1 as tokenfactory,
};

fn cosmos_coin(coin: &messages::Coin) -> base::Coin {
    base::Coin {
        denom: coin.denom.clone(),
        amount: coin.amount.clone(),
    }
}

fn cosmos_coins(list: &[messages::Coin]) -> Vec<base::Coin> {
    list.iter().map(cosmos_coin).collect()
}

fn osmosis_coin(coin: &messages::Coin) -> OsmosisCoin {
    OsmosisCoin {
        denom: coin.denom.clone(),
        amount: coin.amount.clone(),
    }
}

fn osmosis_coins(list: &[messages::Coin]) -> Vec<OsmosisCoin> {
    list.iter().map(osmosis_coin).collect()
}

fn bank_input(io: &BankIo) -> bank::Input {
    bank::Input {
        address: io.address.clone(),
        coins: cosmos_coins(&io.coins),
    }
}

fn bank_output(io: &BankIo) -> bank::Output {
    bank::Output {
        address: io.address.clone(),
        coins: cosmos_coins(&io.coins),
    }
}

fn swap_route(route: &SwapRoute) -> poolmanager::SwapAmountInRoute {
    poolmanager::SwapAmountInRoute {
        pool_id: route.pool_id,
        token_out_denom: route.token_out_denom.clone(),
    }
}

fn encode_error(e: impl std::fmt::Display) -> Error {
    Error::Transaction(format!("Failed to encode message: {}", e))
}

/// `osmosis-std` carries its own `Any`; same two fields
fn from_osmosis(any: shim::Any) -> Any {
    Any {
        type_url: any.type_url,
        value: any.value,
    }
}

impl Message {
    /// Encode into the `Any` carried by the transaction body
    pub fn to_any(&self) -> Result<Any> {
        let any = match self {
            Message::Send {
                from_address,
                to_address,
                amount,
            } => Any::from_msg(&bank::MsgSend {
                from_address: from_address.clone(),
                to_address: to_address.clone(),
                amount: cosmos_coins(amount),
            })
            .map_err(encode_error)?,
            Message::MultiSend { inputs, outputs } => Any::from_msg(&bank::MsgMultiSend {
                inputs: inputs.iter().map(bank_input).collect(),
                outputs: outputs.iter().map(bank_output).collect(),
            })
            .map_err(encode_error)?,
            Message::Delegate {
                delegator_address,
                validator_address,
                amount,
            } => Any::from_msg(&staking::MsgDelegate {
                delegator_address: delegator_address.clone(),
                validator_address: validator_address.clone(),
                amount: Some(cosmos_coin(amount)),
            })
            .map_err(encode_error)?,
            Message::Undelegate {
                delegator_address,
                validator_address,
                amount,
            } => Any::from_msg(&staking::MsgUndelegate {
                delegator_address: delegator_address.clone(),
                validator_address: validator_address.clone(),
                amount: Some(cosmos_coin(amount)),
            })
            .map_err(encode_error)?,
            Message::Redelegate {
                delegator_address,
                validator_src_address,
                validator_dst_address,
                amount,
            } => Any::from_msg(&staking::MsgBeginRedelegate {
                delegator_address: delegator_address.clone(),
                validator_src_address: validator_src_address.clone(),
                validator_dst_address: validator_dst_address.clone(),
                amount: Some(cosmos_coin(amount)),
            })
            .map_err(encode_error)?,
            Message::WithdrawReward {
                delegator_address,
                validator_address,
            } => Any::from_msg(&distribution::MsgWithdrawDelegatorReward {
                delegator_address: delegator_address.clone(),
                validator_address: validator_address.clone(),
            })
            .map_err(encode_error)?,
            Message::SubmitProposal {
                proposer,
                initial_deposit,
                content,
            } => {
                let content = match content {
                    ProposalContent::Text { title, description } => {
                        Any::from_msg(&gov::TextProposal {
                            title: title.clone(),
                            description: description.clone(),
                        })
                        .map_err(encode_error)?
                    }
                };
                Any::from_msg(&gov::MsgSubmitProposal {
                    content: Some(content),
                    initial_deposit: cosmos_coins(initial_deposit),
                    proposer: proposer.clone(),
                })
                .map_err(encode_error)?
            }
            Message::Vote {
                proposal_id,
                voter,
                option,
            } => Any::from_msg(&gov::MsgVote {
                proposal_id: *proposal_id,
                voter: voter.clone(),
                option: option.code(),
            })
            .map_err(encode_error)?,
            Message::Deposit {
                proposal_id,
                depositor,
                amount,
            } => Any::from_msg(&gov::MsgDeposit {
                proposal_id: *proposal_id,
                depositor: depositor.clone(),
                amount: cosmos_coins(amount),
            })
            .map_err(encode_error)?,
            Message::IbcTransfer {
                source_port,
                source_channel,
                token,
                sender,
                receiver,
                timeout,
                memo,
            } => {
                let IbcTimeout {
                    revision_number,
                    revision_height,
                    timestamp_nanos,
                } = *timeout;
                from_osmosis(
                    MsgTransfer {
                        source_port: source_port.clone(),
                        source_channel: source_channel.clone(),
                        token: Some(osmosis_coin(token)),
                        sender: sender.clone(),
                        receiver: receiver.clone(),
                        timeout_height: Some(Height {
                            revision_number,
                            revision_height,
                        }),
                        timeout_timestamp: timestamp_nanos,
                        memo: memo.clone(),
                    }
                    .to_any(),
                )
            }
            Message::LockTokens {
                owner,
                duration_secs,
                coins,
            } => {
                let seconds = i64::try_from(*duration_secs).map_err(|_| {
                    Error::InvalidArgument(format!("Lock duration too large: {}s", duration_secs))
                })?;
                from_osmosis(
                    lockup::MsgLockTokens {
                        owner: owner.clone(),
                        duration: Some(shim::Duration { seconds, nanos: 0 }),
                        coins: osmosis_coins(coins),
                    }
                    .to_any(),
                )
            }
            Message::BeginUnlocking {
                owner,
                lock_id,
                coins,
            } => from_osmosis(
                lockup::MsgBeginUnlocking {
                    owner: owner.clone(),
                    id: *lock_id,
                    coins: osmosis_coins(coins),
                }
                .to_any(),
            ),
            Message::BeginUnlockingAll { owner } => from_osmosis(
                lockup::MsgBeginUnlockingAll {
                    owner: owner.clone(),
                }
                .to_any(),
            ),
            Message::SwapExactAmountIn {
                sender,
                routes,
                token_in,
                token_out_min_amount,
            } => from_osmosis(
                poolmanager::MsgSwapExactAmountIn {
                    sender: sender.clone(),
                    routes: routes.iter().map(swap_route).collect(),
                    token_in: Some(osmosis_coin(token_in)),
                    token_out_min_amount: token_out_min_amount.clone(),
                }
                .to_any(),
            ),
            Message::JoinPool {
                sender,
                pool_id,
                share_out_amount,
                token_in_maxs,
            } => from_osmosis(
                gamm::MsgJoinPool {
                    sender: sender.clone(),
                    pool_id: *pool_id,
                    share_out_amount: share_out_amount.clone(),
                    token_in_maxs: osmosis_coins(token_in_maxs),
                }
                .to_any(),
            ),
            Message::ExitPool {
                sender,
                pool_id,
                share_in_amount,
                token_out_mins,
            } => from_osmosis(
                gamm::MsgExitPool {
                    sender: sender.clone(),
                    pool_id: *pool_id,
                    share_in_amount: share_in_amount.clone(),
                    token_out_mins: osmosis_coins(token_out_mins),
                }
                .to_any(),
            ),
            Message::SuperfluidDelegate {
                sender,
                lock_id,
                val_addr,
            } => from_osmosis(
                superfluid::MsgSuperfluidDelegate {
                    sender: sender.clone(),
                    lock_id: *lock_id,
                    val_addr: val_addr.clone(),
                }
                .to_any(),
            ),
            Message::SuperfluidUndelegate { sender, lock_id } => from_osmosis(
                superfluid::MsgSuperfluidUndelegate {
                    sender: sender.clone(),
                    lock_id: *lock_id,
                }
                .to_any(),
            ),
            Message::CreateDenom { sender, subdenom } => from_osmosis(
                tokenfactory::MsgCreateDenom {
                    sender: sender.clone(),
                    subdenom: subdenom.clone(),
                }
                .to_any(),
            ),
            Message::Mint {
                sender,
                amount,
                mint_to_address,
            } => from_osmosis(
                tokenfactory::MsgMint {
                    sender: sender.clone(),
                    amount: Some(osmosis_coin(amount)),
                    mint_to_address: mint_to_address.clone(),
                }
                .to_any(),
            ),
            Message::Burn {
                sender,
                amount,
                burn_from_address,
            } => from_osmosis(
                tokenfactory::MsgBurn {
                    sender: sender.clone(),
                    amount: Some(osmosis_coin(amount)),
                    burn_from_address: burn_from_address.clone(),
                }
                .to_any(),
            ),
        };
        Ok(any)
    }
}
