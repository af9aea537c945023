//! Turns a discovery event into the pair of mints the new pool trades.

use crate::chain::{ChainRpc, TransactionRecord};
use crate::error::Result;
use crate::retry::with_backoff;
use crate::scheduler::CallScheduler;
use crate::types::{Resolution, TokenPair};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Positions of the two mints in the pool-initialisation account list.
const TOKEN_A_INDEX: usize = 8;
const TOKEN_B_INDEX: usize = 9;
/// Fewer accounts than this cannot be a pool initialisation.
const MIN_ACCOUNTS: usize = 10;

pub struct EventResolver {
    rpc: Arc<dyn ChainRpc>,
    scheduler: CallScheduler,
    amm_program: Pubkey,
    native_mint: Pubkey,
    retry_base_delay: Duration,
    retry_attempts: usize,
}

impl EventResolver {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        scheduler: CallScheduler,
        amm_program: Pubkey,
        native_mint: Pubkey,
    ) -> Self {
        Self {
            rpc,
            scheduler,
            amm_program,
            native_mint,
            retry_base_delay: Duration::from_millis(1000),
            retry_attempts: 5,
        }
    }

    /// Override the bounded-retry wrapper settings.
    pub fn with_retry(mut self, base_delay: Duration, attempts: usize) -> Self {
        self.retry_base_delay = base_delay;
        self.retry_attempts = attempts;
        self
    }

    /// Fetch the transaction and extract the pair it created.
    #[instrument(skip(self))]
    pub async fn resolve(&self, transaction_id: &str) -> Result<Resolution> {
        let record = with_backoff(
            "resolve_pool_transaction",
            self.retry_base_delay,
            self.retry_attempts,
            || {
                let rpc = self.rpc.clone();
                let signature = transaction_id.to_string();
                self.scheduler.submit("get_transaction", move || {
                    let rpc = rpc.clone();
                    let signature = signature.clone();
                    async move { rpc.get_transaction(&signature).await }
                })
            },
        )
        .await?;

        let resolution = self.extract_pair(&record);
        match &resolution {
            Resolution::Pair(pair) => {
                info!(tx = transaction_id, token_a = %pair.token_a, token_b = %pair.token_b, "Resolved new pool pair")
            }
            Resolution::NoValidPair => debug!(tx = transaction_id, "No valid pair in transaction"),
            Resolution::NativePairSkipped => info!(tx = transaction_id, "Native/native pair skipped"),
        }
        Ok(resolution)
    }

    /// Pure extraction step, separated from the fetch.
    pub fn extract_pair(&self, record: &TransactionRecord) -> Resolution {
        let Some(instruction) = record.find_instruction(&self.amm_program) else {
            return Resolution::NoValidPair;
        };
        if instruction.accounts.len() < MIN_ACCOUNTS {
            return Resolution::NoValidPair;
        }

        let parsed = (
            Pubkey::from_str(&instruction.accounts[TOKEN_A_INDEX]),
            Pubkey::from_str(&instruction.accounts[TOKEN_B_INDEX]),
        );
        let pair = match parsed {
            (Ok(token_a), Ok(token_b)) => TokenPair::new(token_a, token_b),
            _ => return Resolution::NoValidPair,
        };

        if pair.is_native_pair(&self.native_mint) {
            Resolution::NativePairSkipped
        } else {
            Resolution::Pair(pair)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AccountRecord, HolderBalance, InstructionRecord};
    use crate::error::SniperError;
    use async_trait::async_trait;
    use solana_sdk::transaction::Transaction;

    struct StaticRpc {
        record: TransactionRecord,
    }

    #[async_trait]
    impl ChainRpc for StaticRpc {
        async fn get_transaction(&self, _signature: &str) -> Result<TransactionRecord> {
            Ok(self.record.clone())
        }
        async fn get_account(&self, _address: &Pubkey) -> Result<Option<AccountRecord>> {
            Ok(None)
        }
        async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>> {
            Ok(vec![None; addresses.len()])
        }
        async fn get_balance(&self, _address: &Pubkey) -> Result<u64> {
            Ok(0)
        }
        async fn get_token_supply(&self, _mint: &Pubkey) -> Result<u64> {
            Err(SniperError::NotFound("supply".into()))
        }
        async fn get_token_largest_accounts(&self, _mint: &Pubkey) -> Result<Vec<HolderBalance>> {
            Ok(Vec::new())
        }
        async fn simulate(&self, _transaction: &Transaction) -> Result<()> {
            Ok(())
        }
    }

    fn record_with_accounts(program: &Pubkey, accounts: Vec<String>) -> TransactionRecord {
        TransactionRecord {
            signature: "sig".to_string(),
            instructions: vec![
                InstructionRecord {
                    program_id: Pubkey::new_unique().to_string(),
                    accounts: vec![],
                },
                InstructionRecord {
                    program_id: program.to_string(),
                    accounts,
                },
            ],
        }
    }

    fn accounts_with(token_a: Pubkey, token_b: Pubkey, len: usize) -> Vec<String> {
        (0..len)
            .map(|i| match i {
                TOKEN_A_INDEX => token_a.to_string(),
                TOKEN_B_INDEX => token_b.to_string(),
                _ => Pubkey::new_unique().to_string(),
            })
            .collect()
    }

    fn resolver(record: TransactionRecord, program: Pubkey, native: Pubkey) -> EventResolver {
        let scheduler = CallScheduler::new(Duration::ZERO, 0, Duration::from_millis(1));
        EventResolver::new(Arc::new(StaticRpc { record }), scheduler, program, native)
            .with_retry(Duration::from_millis(1), 1)
    }

    #[tokio::test]
    async fn test_resolves_pair_from_fixed_positions() {
        let (program, native, token) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let record = record_with_accounts(&program, accounts_with(token, native, 18));

        let resolution = resolver(record, program, native).resolve("sig").await.unwrap();

        assert_eq!(resolution, Resolution::Pair(TokenPair::new(token, native)));
    }

    #[tokio::test]
    async fn test_too_few_accounts_is_no_valid_pair() {
        let (program, native) = (Pubkey::new_unique(), Pubkey::new_unique());
        let record = record_with_accounts(&program, accounts_with(native, native, 9));

        let resolution = resolver(record, program, native).resolve("sig").await.unwrap();

        assert_eq!(resolution, Resolution::NoValidPair);
    }

    #[tokio::test]
    async fn test_missing_instruction_is_no_valid_pair() {
        let (program, native, token) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let record = record_with_accounts(&Pubkey::new_unique(), accounts_with(token, native, 18));

        let resolution = resolver(record, program, native).resolve("sig").await.unwrap();

        assert_eq!(resolution, Resolution::NoValidPair);
    }

    #[tokio::test]
    async fn test_native_pair_is_skipped() {
        let (program, native) = (Pubkey::new_unique(), Pubkey::new_unique());
        let record = record_with_accounts(&program, accounts_with(native, native, 18));

        let resolution = resolver(record, program, native).resolve("sig").await.unwrap();

        assert_eq!(resolution, Resolution::NativePairSkipped);
    }
}
