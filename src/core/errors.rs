use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
pub enum BalancerError {
    /// A request field is missing or malformed
    #[error("invalid input for `{0}`: {1}")]
    InvalidInput(String, String),

    /// Purchaser or consumer is not a member of the balance
    #[error("user {0} is not part of this balance")]
    InvalidMember(String),

    /// Balance with given ID not found
    #[error("balance {0} not found")]
    BalanceNotFound(String),

    /// User with given ID not found
    #[error("user {0} not found")]
    UserNotFound(String),

    /// Purchase with given ID not found
    #[error("purchase {0} not found")]
    PurchaseNotFound(String),

    /// Caller is not a member of the balance
    #[error("you don't have access to balance {0}")]
    Forbidden(String),

    /// Transient key-value store failure, already retried
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Could not acquire the per-document lock in time
    #[error("conflicting update on {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("logging error: {0}")]
    Logging(String),
}

impl BalancerError {
    /// Callers may retry these with backoff; every other kind is terminal
    /// for the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BalancerError::StoreUnavailable(_) | BalancerError::Conflict(_)
        )
    }

    pub fn invalid_input(field: &str, reason: &str) -> Self {
        BalancerError::InvalidInput(field.to_string(), reason.to_string())
    }
}
