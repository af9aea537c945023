//! Token verification: the check battery, its aggregation and the verdict
//! cache in front of it.

pub mod cache;
pub mod checks;
pub mod orchestrator;
pub mod types;

pub use cache::VerdictCache;
pub use checks::{CheckSettings, TokenInspector};
pub use orchestrator::VerificationOrchestrator;
pub use types::{
    honeypot_impact, top_holder_share, CheckKind, CheckResultSet, VerificationOutcome,
};
