//! Error taxonomy shared by every component of the sniper.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SniperError>;

/// Markers a provider puts in an error body when it throttles us.
const RATE_LIMIT_MARKERS: [&str; 2] = ["429", "Too Many Requests"];

#[derive(Debug, Clone, Error)]
pub enum SniperError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("transient network failure: {0}")]
    TransientNetwork(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed data: {0}")]
    MalformedData(String),
    #[error("simulation rejected: {0}")]
    SimulationFailure(String),
    #[error("insufficient balance: need {needed} lamports, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },
    #[error("fatal startup failure: {0}")]
    FatalStartup(String),
    #[error("call scheduler dropped the call before settling it")]
    SchedulerClosed,
    #[error("scheduled call `{0}` panicked")]
    CallPanicked(&'static str),
    #[error("event subscription lost after {attempts} reconnect attempts")]
    ReconnectExhausted { attempts: u32 },
}

impl SniperError {
    /// Classify a raw transport error message.
    pub fn from_transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if RATE_LIMIT_MARKERS.iter().any(|marker| message.contains(marker)) {
            SniperError::RateLimited(message)
        } else {
            SniperError::TransientNetwork(message)
        }
    }

    pub fn from_rpc(err: solana_client::client_error::ClientError) -> Self {
        Self::from_transport(err.to_string())
    }

    pub fn from_http(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            return SniperError::RateLimited(err.to_string());
        }
        if err.is_decode() {
            return SniperError::MalformedData(err.to_string());
        }
        Self::from_transport(err.to_string())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SniperError::RateLimited(_))
    }

    /// Errors worth another attempt from the bounded-retry wrapper.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SniperError::RateLimited(_) | SniperError::TransientNetwork(_)
        )
    }
}
