//! The individual safety checks.
//!
//! Each check gathers its own data through the call scheduler and answers
//! a single yes/no question about the token. Errors are returned as-is;
//! whether they are absorbed or abort the run is the orchestrator's call.

use crate::chain::instructions::{create_token_account, self_transfer};
use crate::chain::{is_token_program, AccountRecord, ChainRpc, MintInfo};
use crate::error::{Result, SniperError};
use crate::market::{PoolInfo, PoolRegistry};
use crate::scheduler::CallScheduler;
use crate::verification::types::{honeypot_impact, top_holder_share, CheckKind};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::debug;

/// Holders counted by the distribution check.
const TOP_HOLDERS: usize = 5;

/// Thresholds the checks apply.
#[derive(Debug, Clone, Copy)]
pub struct CheckSettings {
    pub wallet: Pubkey,
    pub amm_program: Pubkey,
    pub native_mint: Pubkey,
    pub probe_lamports: u64,
    pub honeypot_threshold: f64,
    pub max_top_holder_share: f64,
}

pub struct TokenInspector {
    rpc: Arc<dyn ChainRpc>,
    registry: Arc<dyn PoolRegistry>,
    scheduler: CallScheduler,
    settings: CheckSettings,
}

impl TokenInspector {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        registry: Arc<dyn PoolRegistry>,
        scheduler: CallScheduler,
        settings: CheckSettings,
    ) -> Self {
        Self {
            rpc,
            registry,
            scheduler,
            settings,
        }
    }

    pub async fn run(&self, kind: CheckKind, mint: &Pubkey) -> Result<bool> {
        match kind {
            CheckKind::Centralization => self.ownership_centralized(mint).await,
            CheckKind::LiquidityLock => self.liquidity_locked(mint).await,
            CheckKind::OwnerPoolAccess => self.owner_pool_access(mint).await,
            CheckKind::MintValidity => self.mint_valid(mint).await,
            CheckKind::AccountExistence => self.account_exists(mint).await,
            CheckKind::BasicTransferSimulation => self.basic_transfer_ok().await,
            CheckKind::TradeSimulation => self.trade_simulation_ok(mint).await,
            CheckKind::ApprovalTransfer => self.approval_ok(mint).await,
            CheckKind::BurnMechanism => self.burn_mechanism_present(mint).await,
            CheckKind::RenouncedOwnership => self.ownership_renounced(mint).await,
            CheckKind::DistributionFairness => self.distribution_fair(mint).await,
            CheckKind::Honeypot => self.is_honeypot(mint).await,
        }
    }

    /// Mint and freeze authority both still held.
    async fn ownership_centralized(&self, mint: &Pubkey) -> Result<bool> {
        let info = self.fetch_mint(mint).await?;
        Ok(info.mint_authority.is_some() && info.freeze_authority.is_some())
    }

    /// Nobody can freeze holder accounts.
    async fn liquidity_locked(&self, mint: &Pubkey) -> Result<bool> {
        let info = self.fetch_mint(mint).await?;
        Ok(info.freeze_authority.is_none())
    }

    /// Pool not controlled by the AMM program, or LP mintable by a wallet key.
    async fn owner_pool_access(&self, mint: &Pubkey) -> Result<bool> {
        let pool = self.fetch_pool(mint).await?;
        let accounts = self.fetch_accounts(vec![pool.id, pool.lp_mint]).await?;

        let (Some(Some(pool_account)), Some(lp_account)) = (accounts.first(), accounts.get(1)) else {
            debug!(pool = %pool.id, "Pool account missing");
            return Ok(true);
        };
        if pool_account.owner != self.settings.amm_program {
            return Ok(true);
        }

        let lp_authority = match lp_account {
            Some(account) => MintInfo::unpack(&account.data)?.mint_authority,
            None => return Ok(true),
        };
        Ok(lp_authority.is_some_and(|authority| authority.is_on_curve()))
    }

    async fn mint_valid(&self, mint: &Pubkey) -> Result<bool> {
        let Some(account) = self.fetch_account(mint).await? else {
            return Ok(false);
        };
        if !is_token_program(&account.owner) {
            return Ok(false);
        }
        Ok(MintInfo::unpack(&account.data)
            .map(|info| info.is_initialized)
            .unwrap_or(false))
    }

    async fn account_exists(&self, mint: &Pubkey) -> Result<bool> {
        let account = self.fetch_account(mint).await?;
        Ok(account.is_some_and(|account| account.lamports > 0))
    }

    async fn basic_transfer_ok(&self) -> Result<bool> {
        self.simulate_accepted(self_transfer(&self.settings.wallet)).await
    }

    /// A probe-sized buy yields tokens.
    async fn trade_simulation_ok(&self, mint: &Pubkey) -> Result<bool> {
        let pool = self.fetch_pool(mint).await?;
        let tokens_out = pool.quote(&self.settings.native_mint, self.probe_amount())?;
        debug!(tokens_out, "Simulated buy");
        Ok(tokens_out > 0.0)
    }

    /// The wallet can open an account for the token.
    async fn approval_ok(&self, mint: &Pubkey) -> Result<bool> {
        let account = self
            .fetch_account(mint)
            .await?
            .ok_or_else(|| SniperError::NotFound(format!("mint {mint}")))?;
        let transaction = create_token_account(&self.settings.wallet, mint, &account.owner);
        self.simulate_accepted(transaction).await
    }

    /// Some of the pool's LP supply has been burned.
    async fn burn_mechanism_present(&self, mint: &Pubkey) -> Result<bool> {
        let pool = self.fetch_pool(mint).await?;
        Ok(pool.burn_percent > 0.0)
    }

    async fn ownership_renounced(&self, mint: &Pubkey) -> Result<bool> {
        let info = self.fetch_mint(mint).await?;
        Ok(info.mint_authority.is_none())
    }

    async fn distribution_fair(&self, mint: &Pubkey) -> Result<bool> {
        let mint = *mint;
        let rpc = self.rpc.clone();
        let supply = self
            .scheduler
            .submit("get_token_supply", move || {
                let rpc = rpc.clone();
                async move { rpc.get_token_supply(&mint).await }
            })
            .await?;
        if supply == 0 {
            return Err(SniperError::MalformedData(format!("{mint} has zero supply")));
        }

        let rpc = self.rpc.clone();
        let holders = self
            .scheduler
            .submit("get_token_largest_accounts", move || {
                let rpc = rpc.clone();
                async move { rpc.get_token_largest_accounts(&mint).await }
            })
            .await?;

        let share = top_holder_share(
            holders.into_iter().map(|holder| holder.amount).collect(),
            supply,
            TOP_HOLDERS,
        );
        debug!(share, "Top holder share");
        Ok(share <= self.settings.max_top_holder_share)
    }

    /// Buy then sell the same probe against the pool and compare legs,
    /// both valued in the native asset.
    async fn is_honeypot(&self, mint: &Pubkey) -> Result<bool> {
        let pool = self.fetch_pool(mint).await?;
        let spot = pool
            .price_of(mint)
            .ok_or_else(|| SniperError::MalformedData(format!("no spot price for {mint}")))?;

        let tokens_bought = pool.quote(&self.settings.native_mint, self.probe_amount())?;
        let buy_output = tokens_bought * spot;
        let sell_output = pool.quote(mint, tokens_bought)?;

        let impact = honeypot_impact(buy_output, sell_output);
        debug!(buy_output, sell_output, impact, "Round-trip simulation");
        Ok(impact > self.settings.honeypot_threshold)
    }

    fn probe_amount(&self) -> f64 {
        lamports_to_sol(self.settings.probe_lamports)
    }

    async fn simulate_accepted(&self, transaction: Transaction) -> Result<bool> {
        let rpc = self.rpc.clone();
        let outcome = self
            .scheduler
            .submit("simulate_transaction", move || {
                let rpc = rpc.clone();
                let transaction = transaction.clone();
                async move { rpc.simulate(&transaction).await }
            })
            .await;

        match outcome {
            Ok(()) => Ok(true),
            Err(SniperError::SimulationFailure(reason)) => {
                debug!(%reason, "Simulation rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<AccountRecord>> {
        let address = *address;
        let rpc = self.rpc.clone();
        self.scheduler
            .submit("get_account", move || {
                let rpc = rpc.clone();
                async move { rpc.get_account(&address).await }
            })
            .await
    }

    async fn fetch_accounts(&self, addresses: Vec<Pubkey>) -> Result<Vec<Option<AccountRecord>>> {
        let rpc = self.rpc.clone();
        self.scheduler
            .submit("get_multiple_accounts", move || {
                let rpc = rpc.clone();
                let addresses = addresses.clone();
                async move { rpc.get_multiple_accounts(&addresses).await }
            })
            .await
    }

    async fn fetch_mint(&self, mint: &Pubkey) -> Result<MintInfo> {
        let account = self
            .fetch_account(mint)
            .await?
            .ok_or_else(|| SniperError::NotFound(format!("mint {mint}")))?;
        MintInfo::unpack(&account.data)
    }

    async fn fetch_pool(&self, mint: &Pubkey) -> Result<PoolInfo> {
        let mint = *mint;
        let native_mint = self.settings.native_mint;
        let registry = self.registry.clone();
        self.scheduler
            .submit("find_pool", move || {
                let registry = registry.clone();
                async move { registry.find_pool(&mint, &native_mint).await }
            })
            .await
    }
}
