//! In-memory chain, pool registry and price feed for integration tests.
//!
//! Every remote call is counted so tests can assert that a path did or did
//! not touch the network.

#![allow(dead_code)]

use async_trait::async_trait;
use pool_sniper::chain::{
    AccountRecord, ChainRpc, HolderBalance, InstructionRecord, MintInfo, TransactionRecord,
    TOKEN_PROGRAM_ID,
};
use pool_sniper::market::{PoolInfo, PoolRegistry, PriceOracle};
use pool_sniper::trading::PaperTrader;
use pool_sniper::verification::{CheckSettings, TokenInspector, VerificationOrchestrator};
use pool_sniper::scheduler::CallScheduler;
use pool_sniper::{Gateways, NetworkIds, Result, SniperConfig, SniperConfigBuilder, SniperError};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN_SUPPLY: u64 = 1_000_000_000_000;
pub const TOKEN_RESERVE: f64 = 1_000_000.0;
pub const NATIVE_RESERVE: f64 = 1_000.0;
pub const NATIVE_USD: f64 = 150.0;

pub fn mint_data(mint_authority: Option<Pubkey>, freeze_authority: Option<Pubkey>) -> Vec<u8> {
    MintInfo {
        mint_authority,
        supply: TOKEN_SUPPLY,
        decimals: 6,
        is_initialized: true,
        freeze_authority,
    }
    .pack()
}

#[derive(Default)]
pub struct MockChain {
    accounts: Mutex<HashMap<Pubkey, AccountRecord>>,
    transactions: Mutex<HashMap<String, TransactionRecord>>,
    holders: Mutex<Vec<HolderBalance>>,
    balance: AtomicU64,
    fail_supply: AtomicBool,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn put_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(
            address,
            AccountRecord {
                owner,
                lamports: 1_461_600,
                data,
            },
        );
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    pub fn put_transaction(&self, record: TransactionRecord) {
        self.transactions
            .lock()
            .unwrap()
            .insert(record.signature.clone(), record);
    }

    pub fn set_holders(&self, amounts: &[u64]) {
        *self.holders.lock().unwrap() = amounts
            .iter()
            .map(|amount| HolderBalance {
                address: Pubkey::new_unique().to_string(),
                amount: *amount,
            })
            .collect();
    }

    pub fn set_balance(&self, lamports: u64) {
        self.balance.store(lamports, Ordering::SeqCst);
    }

    pub fn fail_supply(&self) {
        self.fail_supply.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn get_transaction(&self, signature: &str) -> Result<TransactionRecord> {
        self.count();
        self.transactions
            .lock()
            .unwrap()
            .get(signature)
            .cloned()
            .ok_or_else(|| SniperError::NotFound(format!("transaction {signature}")))
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountRecord>> {
        self.count();
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_multiple_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<AccountRecord>>> {
        self.count();
        let accounts = self.accounts.lock().unwrap();
        Ok(addresses.iter().map(|address| accounts.get(address).cloned()).collect())
    }

    async fn get_balance(&self, _address: &Pubkey) -> Result<u64> {
        self.count();
        Ok(self.balance.load(Ordering::SeqCst))
    }

    async fn get_token_supply(&self, mint: &Pubkey) -> Result<u64> {
        self.count();
        if self.fail_supply.load(Ordering::SeqCst) {
            return Err(SniperError::TransientNetwork(format!("supply of {mint} unavailable")));
        }
        Ok(TOKEN_SUPPLY)
    }

    async fn get_token_largest_accounts(&self, _mint: &Pubkey) -> Result<Vec<HolderBalance>> {
        self.count();
        Ok(self.holders.lock().unwrap().clone())
    }

    async fn simulate(&self, _transaction: &Transaction) -> Result<()> {
        self.count();
        Ok(())
    }
}

pub struct MockRegistry {
    pool: Mutex<PoolInfo>,
    calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new(pool: PoolInfo) -> Self {
        Self {
            pool: Mutex::new(pool),
            calls: AtomicUsize::new(0),
        }
    }

    /// Move the native side so the token trades at `price` native units.
    pub fn set_token_price(&self, price: f64) {
        let mut pool = self.pool.lock().unwrap();
        pool.reserve_b = pool.reserve_a * price;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolRegistry for MockRegistry {
    async fn find_pool(&self, mint: &Pubkey, quote_mint: &Pubkey) -> Result<PoolInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let pool = self.pool.lock().unwrap().clone();
        if pool.mint_a == *mint && pool.mint_b == *quote_mint {
            Ok(pool)
        } else {
            Err(SniperError::NotFound(format!("pool for {mint}")))
        }
    }
}

pub struct FixedPriceOracle;

#[async_trait]
impl PriceOracle for FixedPriceOracle {
    async fn native_usd_price(&self) -> Result<f64> {
        Ok(NATIVE_USD)
    }
}

/// A freshly launched token that passes every check.
pub struct Fixture {
    pub wallet: Pubkey,
    pub amm_program: Pubkey,
    pub native_mint: Pubkey,
    pub token: Pubkey,
    pub pool_id: Pubkey,
    pub lp_mint: Pubkey,
    pub chain: Arc<MockChain>,
    pub registry: Arc<MockRegistry>,
}

impl Fixture {
    pub fn healthy() -> Self {
        let (wallet, amm_program, native_mint) =
            (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let (token, pool_id, lp_mint) =
            (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());

        let chain = Arc::new(MockChain::default());
        chain.put_account(token, TOKEN_PROGRAM_ID, mint_data(None, None));
        chain.put_account(pool_id, amm_program, vec![0; 16]);
        chain.put_account(lp_mint, TOKEN_PROGRAM_ID, mint_data(None, None));
        chain.set_holders(&[
            TOKEN_SUPPLY / 20,
            TOKEN_SUPPLY / 20,
            TOKEN_SUPPLY / 20,
            TOKEN_SUPPLY / 20,
            TOKEN_SUPPLY / 20,
            TOKEN_SUPPLY / 20,
        ]);
        chain.set_balance(1_000_000_000);

        let registry = Arc::new(MockRegistry::new(PoolInfo {
            id: pool_id,
            program_id: amm_program,
            mint_a: token,
            mint_b: native_mint,
            reserve_a: TOKEN_RESERVE,
            reserve_b: NATIVE_RESERVE,
            lp_mint,
            burn_percent: 100.0,
        }));

        Self {
            wallet,
            amm_program,
            native_mint,
            token,
            pool_id,
            lp_mint,
            chain,
            registry,
        }
    }

    pub fn config(&self) -> SniperConfig {
        SniperConfigBuilder::new()
            .with_wallet(&self.wallet)
            .with_amm_program(&self.amm_program)
            .with_native_mint(&self.native_mint)
            .with_scheduler(0, 3, 1)
            .with_check_interval(0)
            .with_take_profit(0.5, 10)
            .build()
    }

    pub fn ids(&self) -> NetworkIds {
        NetworkIds {
            wallet: self.wallet,
            amm_program: self.amm_program,
            native_mint: self.native_mint,
        }
    }

    pub fn gateways(&self) -> Gateways {
        Gateways {
            rpc: self.chain.clone(),
            registry: self.registry.clone(),
            price_oracle: Arc::new(FixedPriceOracle),
            submitter: Arc::new(PaperTrader::new(self.registry.clone(), self.native_mint)),
        }
    }

    pub fn scheduler(&self) -> CallScheduler {
        CallScheduler::new(Duration::ZERO, 3, Duration::from_millis(1))
    }

    pub fn orchestrator(&self, cache_capacity: usize) -> VerificationOrchestrator {
        let inspector = TokenInspector::new(
            self.chain.clone(),
            self.registry.clone(),
            self.scheduler(),
            CheckSettings {
                wallet: self.wallet,
                amm_program: self.amm_program,
                native_mint: self.native_mint,
                probe_lamports: 10_000_000,
                honeypot_threshold: 0.30,
                max_top_holder_share: 0.50,
            },
        );
        VerificationOrchestrator::new(inspector, cache_capacity, Duration::ZERO)
    }

    /// Record a pool-initialisation transaction pairing `token_a` and `token_b`.
    pub fn pool_creation(&self, signature: &str, token_a: Pubkey, token_b: Pubkey) {
        let accounts = (0..18)
            .map(|index| match index {
                8 => token_a.to_string(),
                9 => token_b.to_string(),
                _ => Pubkey::new_unique().to_string(),
            })
            .collect();
        self.chain.put_transaction(TransactionRecord {
            signature: signature.to_string(),
            instructions: vec![InstructionRecord {
                program_id: self.amm_program.to_string(),
                accounts,
            }],
        });
    }

    pub fn remote_calls(&self) -> usize {
        self.chain.calls() + self.registry.calls()
    }
}
