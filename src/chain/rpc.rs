//! RPC node gateway.
//!
//! `ChainRpc` is the seam between the sniper and a Solana node. Callers
//! never invoke it directly; every call is submitted through the
//! [`CallScheduler`](crate::scheduler::CallScheduler).

use crate::chain::types::{AccountRecord, HolderBalance, InstructionRecord, TransactionRecord};
use crate::error::{Result, SniperError};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSimulateTransactionConfig, RpcTransactionConfig};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::{
    EncodedTransaction, UiInstruction, UiMessage, UiParsedInstruction, UiTransactionEncoding,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn get_transaction(&self, signature: &str) -> Result<TransactionRecord>;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountRecord>>;

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    /// Total supply in base units.
    async fn get_token_supply(&self, mint: &Pubkey) -> Result<u64>;

    async fn get_token_largest_accounts(&self, mint: &Pubkey) -> Result<Vec<HolderBalance>>;

    /// `Ok(())` when the node accepts the transaction in simulation,
    /// `SimulationFailure` when it rejects it.
    async fn simulate(&self, transaction: &Transaction) -> Result<()>;
}

/// `ChainRpc` backed by the nonblocking Solana RPC client.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            client: RpcClient::new_with_timeout_and_commitment(
                url,
                timeout,
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

#[async_trait]
impl ChainRpc for SolanaRpc {
    #[instrument(skip(self))]
    async fn get_transaction(&self, signature: &str) -> Result<TransactionRecord> {
        let parsed = Signature::from_str(signature)
            .map_err(|e| SniperError::MalformedData(format!("bad signature {signature}: {e}")))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.client.commitment()),
            max_supported_transaction_version: Some(0),
        };

        let confirmed = self
            .client
            .get_transaction_with_config(&parsed, config)
            .await
            .map_err(SniperError::from_rpc)?;

        let instructions = top_level_instructions(&confirmed.transaction.transaction)?;
        debug!("Fetched transaction with {} instructions", instructions.len());

        Ok(TransactionRecord {
            signature: signature.to_string(),
            instructions,
        })
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountRecord>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(SniperError::from_rpc)?;
        Ok(response.value.map(AccountRecord::from))
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>> {
        let accounts = self
            .client
            .get_multiple_accounts(addresses)
            .await
            .map_err(SniperError::from_rpc)?;
        Ok(accounts
            .into_iter()
            .map(|account| account.map(AccountRecord::from))
            .collect())
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        self.client
            .get_balance(address)
            .await
            .map_err(SniperError::from_rpc)
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> Result<u64> {
        let supply = self
            .client
            .get_token_supply(mint)
            .await
            .map_err(SniperError::from_rpc)?;
        parse_amount(&supply.amount)
    }

    async fn get_token_largest_accounts(&self, mint: &Pubkey) -> Result<Vec<HolderBalance>> {
        let holders = self
            .client
            .get_token_largest_accounts(mint)
            .await
            .map_err(SniperError::from_rpc)?;

        holders
            .into_iter()
            .map(|holder| {
                Ok(HolderBalance {
                    amount: parse_amount(&holder.amount.amount)?,
                    address: holder.address,
                })
            })
            .collect()
    }

    async fn simulate(&self, transaction: &Transaction) -> Result<()> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.client.commitment()),
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .client
            .simulate_transaction_with_config(transaction, config)
            .await
            .map_err(SniperError::from_rpc)?;

        match response.value.err {
            None => Ok(()),
            Some(err) => Err(SniperError::SimulationFailure(format!(
                "{err}; logs: {:?}",
                response.value.logs.unwrap_or_default()
            ))),
        }
    }
}

fn parse_amount(raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|e| SniperError::MalformedData(format!("token amount `{raw}`: {e}")))
}

/// Flatten a `jsonParsed` transaction into program id + account lists.
fn top_level_instructions(encoded: &EncodedTransaction) -> Result<Vec<InstructionRecord>> {
    let EncodedTransaction::Json(transaction) = encoded else {
        return Err(SniperError::MalformedData("transaction not json encoded".into()));
    };
    let UiMessage::Parsed(message) = &transaction.message else {
        return Err(SniperError::MalformedData("transaction message not parsed".into()));
    };

    Ok(message
        .instructions
        .iter()
        .filter_map(|instruction| match instruction {
            UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(ix)) => {
                Some(InstructionRecord {
                    program_id: ix.program_id.clone(),
                    accounts: ix.accounts.clone(),
                })
            }
            UiInstruction::Parsed(UiParsedInstruction::Parsed(ix)) => Some(InstructionRecord {
                program_id: ix.program_id.clone(),
                accounts: Vec::new(),
            }),
            UiInstruction::Compiled(_) => None,
        })
        .collect())
}
