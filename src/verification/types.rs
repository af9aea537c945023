//! Check identities, per-run results and the aggregate verdict.

use crate::error::SniperError;
use serde::Serialize;

/// The battery, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckKind {
    Centralization,
    LiquidityLock,
    OwnerPoolAccess,
    MintValidity,
    AccountExistence,
    BasicTransferSimulation,
    TradeSimulation,
    ApprovalTransfer,
    BurnMechanism,
    RenouncedOwnership,
    DistributionFairness,
    Honeypot,
}

impl CheckKind {
    pub const ALL: [CheckKind; 12] = [
        CheckKind::Centralization,
        CheckKind::LiquidityLock,
        CheckKind::OwnerPoolAccess,
        CheckKind::MintValidity,
        CheckKind::AccountExistence,
        CheckKind::BasicTransferSimulation,
        CheckKind::TradeSimulation,
        CheckKind::ApprovalTransfer,
        CheckKind::BurnMechanism,
        CheckKind::RenouncedOwnership,
        CheckKind::DistributionFairness,
        CheckKind::Honeypot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Centralization => "ownership_centralization",
            CheckKind::LiquidityLock => "liquidity_lock",
            CheckKind::OwnerPoolAccess => "owner_pool_access",
            CheckKind::MintValidity => "mint_validity",
            CheckKind::AccountExistence => "account_existence",
            CheckKind::BasicTransferSimulation => "basic_transfer_simulation",
            CheckKind::TradeSimulation => "trade_simulation",
            CheckKind::ApprovalTransfer => "approval_transfer",
            CheckKind::BurnMechanism => "burn_mechanism",
            CheckKind::RenouncedOwnership => "renounced_ownership",
            CheckKind::DistributionFairness => "distribution_fairness",
            CheckKind::Honeypot => "honeypot",
        }
    }

    /// Whether an error inside this check is absorbed as a negative outcome.
    /// The others abort the whole battery.
    pub fn fails_closed(&self) -> bool {
        !matches!(self, CheckKind::DistributionFairness | CheckKind::Honeypot)
    }
}

/// Outcome of every check in one run. `None` means the check errored and
/// was failed closed; it never satisfies a required condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResultSet {
    pub ownership_centralized: Option<bool>,
    pub liquidity_locked: Option<bool>,
    pub owner_pool_access: Option<bool>,
    pub mint_valid: Option<bool>,
    pub account_exists: Option<bool>,
    pub basic_simulation_ok: Option<bool>,
    pub trade_simulation_ok: Option<bool>,
    pub approval_ok: Option<bool>,
    pub burn_mechanism_present: Option<bool>,
    pub ownership_renounced: Option<bool>,
    pub distribution_fair: Option<bool>,
    pub honeypot: Option<bool>,
}

impl CheckResultSet {
    pub fn record(&mut self, kind: CheckKind, outcome: Option<bool>) {
        let slot = match kind {
            CheckKind::Centralization => &mut self.ownership_centralized,
            CheckKind::LiquidityLock => &mut self.liquidity_locked,
            CheckKind::OwnerPoolAccess => &mut self.owner_pool_access,
            CheckKind::MintValidity => &mut self.mint_valid,
            CheckKind::AccountExistence => &mut self.account_exists,
            CheckKind::BasicTransferSimulation => &mut self.basic_simulation_ok,
            CheckKind::TradeSimulation => &mut self.trade_simulation_ok,
            CheckKind::ApprovalTransfer => &mut self.approval_ok,
            CheckKind::BurnMechanism => &mut self.burn_mechanism_present,
            CheckKind::RenouncedOwnership => &mut self.ownership_renounced,
            CheckKind::DistributionFairness => &mut self.distribution_fair,
            CheckKind::Honeypot => &mut self.honeypot,
        };
        *slot = outcome;
    }

    /// Required conditions that did not hold. Centralization is reported
    /// but never part of the decision.
    pub fn unmet_conditions(&self) -> Vec<&'static str> {
        let must_hold = [
            ("liquidity_locked", self.liquidity_locked),
            ("mint_valid", self.mint_valid),
            ("account_exists", self.account_exists),
            ("basic_simulation_ok", self.basic_simulation_ok),
            ("trade_simulation_ok", self.trade_simulation_ok),
            ("approval_ok", self.approval_ok),
            ("burn_mechanism_present", self.burn_mechanism_present),
            ("ownership_renounced", self.ownership_renounced),
            ("distribution_fair", self.distribution_fair),
        ];
        let must_not_hold = [
            ("owner_pool_access", self.owner_pool_access),
            ("honeypot", self.honeypot),
        ];

        must_hold
            .iter()
            .filter(|(_, outcome)| *outcome != Some(true))
            .chain(must_not_hold.iter().filter(|(_, outcome)| *outcome != Some(false)))
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn verdict(&self) -> bool {
        self.unmet_conditions().is_empty()
    }
}

/// What a `verify` call actually did.
#[derive(Debug, Clone)]
pub enum VerificationOutcome {
    /// Another verification holds the battery lock; nothing ran
    Skipped,
    /// Served from the verdict cache; no check ran
    Cached(bool),
    Completed { results: CheckResultSet, verdict: bool },
    /// An error escaped a check; the run is rejected
    Aborted(SniperError),
}

impl VerificationOutcome {
    pub fn verdict(&self) -> bool {
        match self {
            VerificationOutcome::Cached(verdict) => *verdict,
            VerificationOutcome::Completed { verdict, .. } => *verdict,
            VerificationOutcome::Skipped | VerificationOutcome::Aborted(_) => false,
        }
    }
}

/// Relative difference between the two legs of a round trip.
pub fn honeypot_impact(buy_output: f64, sell_output: f64) -> f64 {
    let mean = (buy_output + sell_output) / 2.0;
    if mean <= 0.0 {
        return f64::INFINITY;
    }
    (buy_output - sell_output).abs() / mean
}

/// Combined share of supply held by the `top` largest holders.
pub fn top_holder_share(mut amounts: Vec<u64>, supply: u64, top: usize) -> f64 {
    if supply == 0 {
        return 1.0;
    }
    amounts.sort_unstable_by(|a, b| b.cmp(a));
    let held: u128 = amounts.iter().take(top).map(|amount| *amount as u128).sum();
    held as f64 / supply as f64
}
