//! RPC failure classification.
//!
//! Maps transport errors onto the handful of outcomes a user can act
//! on, decoding Solidity revert reasons where the node returned revert
//! data.

use alloy::rpc::json_rpc::ErrorPayload;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::{RpcError, TransportErrorKind};
use tracing::debug;

/// EIP-1193 code for a request the user declined in their wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Code geth-compatible nodes use for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// What went wrong with an RPC request, from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The signer declined to sign or submit.
    UserRejected,
    /// The node simulated the call and it reverted.
    Reverted { reason: Option<String> },
    /// The endpoint could not be reached or answered nonsense.
    Network,
    /// The node refused the request for another reason.
    Rejected { message: String },
}

/// Classifies an RPC error.
pub fn classify(error: &RpcError<TransportErrorKind>) -> FailureKind {
    let Some(payload) = error.as_error_resp() else {
        return FailureKind::Network;
    };

    let message = payload.message.to_lowercase();

    if payload.code == USER_REJECTED_CODE
        || message.contains("user rejected")
        || message.contains("user denied")
    {
        return FailureKind::UserRejected;
    }

    if payload.code == EXECUTION_REVERTED_CODE
        || message.contains("revert")
        || payload.as_revert_data().is_some()
    {
        return FailureKind::Reverted {
            reason: revert_reason(payload),
        };
    }

    FailureKind::Rejected {
        message: payload.message.to_string(),
    }
}

fn revert_reason(payload: &ErrorPayload) -> Option<String> {
    let revert_data = payload.as_revert_data()?;

    let reason = decode_revert_reason(revert_data.as_ref());
    if reason.is_none() {
        debug!(%revert_data, "Failed to decode revert data");
    }

    reason
}
