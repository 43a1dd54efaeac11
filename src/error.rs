//! Errors surfaced by contract reads and writes.

use stargate_evm::{EvmError, FailureKind};

use crate::amount::AmountError;

/// Failure of a single contract interaction, classified by what the
/// user can do about it.
#[derive(Debug, thiserror::Error)]
pub enum ChainCallError {
    #[error("request rejected in the wallet")]
    UserRejected(#[source] EvmError),
    #[error("contract call reverted{}", reason_suffix(.reason))]
    Reverted {
        reason: Option<String>,
        #[source]
        source: EvmError,
    },
    #[error("network failure: {0}")]
    Network(#[source] EvmError),
    #[error("node rejected the request: {message}")]
    Rejected {
        message: String,
        #[source]
        source: EvmError,
    },
    #[error("invalid amount: {0}")]
    InvalidInput(#[from] AmountError),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("could not decode contract response: {0}")]
    MalformedResponse(#[from] alloy::sol_types::Error),
    #[error("no wallet connected")]
    NotConnected,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|reason| format!(": {reason}"))
        .unwrap_or_default()
}

impl From<EvmError> for ChainCallError {
    fn from(error: EvmError) -> Self {
        match error.failure_kind() {
            FailureKind::UserRejected => Self::UserRejected(error),
            FailureKind::Reverted { reason } => Self::Reverted {
                reason,
                source: error,
            },
            FailureKind::Network => Self::Network(error),
            FailureKind::Rejected { message } => Self::Rejected {
                message,
                source: error,
            },
        }
    }
}

impl ChainCallError {
    /// Short message suitable for a status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::UserRejected(_) => "You rejected the request in your wallet.".to_string(),
            Self::Reverted {
                reason: Some(reason),
                ..
            } => format!("The contract rejected this action ({reason})."),
            Self::Reverted { reason: None, .. } => {
                "The contract rejected this action. Check your balance and allowance.".to_string()
            }
            Self::Network(_) => "Could not reach the network. Try again.".to_string(),
            Self::Rejected { message, .. } => format!("The node refused the request: {message}"),
            Self::InvalidInput(error) => format!("Enter a valid amount ({error})."),
            Self::NonPositiveAmount => "Enter an amount greater than zero.".to_string(),
            Self::MalformedResponse(_) => {
                "The contract returned an unexpected response.".to_string()
            }
            Self::NotConnected => "Connect a wallet first.".to_string(),
        }
    }
}
