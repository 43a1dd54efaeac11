//! EVM chain interaction abstraction.
//!
//! This crate provides two traits for interacting with EVM chains:
//!
//! - [`Evm`]: read-only chain access. Provides the underlying provider
//!   and a `call` method that runs `eth_call`, optionally on behalf of a
//!   caller address so that `msg.sender`-dependent views resolve.
//!
//! - [`Wallet`]: extends `Evm` with a signing identity and
//!   transaction submission. Submission returns as soon as the node
//!   accepts the transaction; callers get the hash of a pending
//!   transaction and nothing waits for inclusion.
//!
//! RPC failures are classified by [`EvmError::failure_kind`] so that
//! consumers can tell a rejected signature from a revert or a dead
//! endpoint.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;

pub mod error_decoding;
pub mod local;
pub mod read_only;

pub use error_decoding::FailureKind;
pub use local::{LocalWallet, connect_http};
pub use read_only::ReadOnlyEvm;

/// Errors that can occur during EVM operations.
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(#[from] alloy::signers::k256::ecdsa::Error),
}

impl EvmError {
    /// Classifies the failure for user-facing reporting.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Transport(error) => error_decoding::classify(error),
            Self::InvalidPrivateKey(error) => FailureKind::Rejected {
                message: error.to_string(),
            },
        }
    }
}

/// Read-only EVM chain access.
///
/// Implementations only need to supply the provider; `call` has a
/// default implementation that builds the `eth_call` request.
#[async_trait]
pub trait Evm: Send + Sync + 'static {
    /// The provider type used for chain access.
    type Provider: Provider + Clone + Send + Sync;

    /// Returns the underlying provider for direct chain queries.
    fn provider(&self) -> &Self::Provider;

    /// Address view calls are executed from, if any.
    fn caller(&self) -> Option<Address> {
        None
    }

    /// Execute a view call against `contract` with ABI-encoded `calldata`.
    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError> {
        let mut tx = TransactionRequest::default()
            .to(contract)
            .input(calldata.into());

        if let Some(caller) = self.caller() {
            tx = tx.from(caller);
        }

        Ok(self.provider().call(tx).await?)
    }
}

/// Signing wallet on an EVM chain.
///
/// Extends [`Evm`] with a wallet identity (address) and transaction
/// submission. [`LocalWallet`] signs with an in-process private key.
#[async_trait]
pub trait Wallet: Evm {
    /// Returns the address this wallet signs transactions from.
    fn address(&self) -> Address;

    /// Sign and submit a contract call, returning the pending
    /// transaction's hash.
    ///
    /// - `contract`: target contract address
    /// - `calldata`: ABI-encoded function call
    /// - `note`: human-readable operation description used for logging
    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxHash, EvmError>;
}

#[async_trait]
impl<T: Evm> Evm for Arc<T> {
    type Provider = T::Provider;

    fn provider(&self) -> &Self::Provider {
        (**self).provider()
    }

    fn caller(&self) -> Option<Address> {
        (**self).caller()
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> Result<Bytes, EvmError> {
        (**self).call(contract, calldata).await
    }
}

#[async_trait]
impl<T: Wallet> Wallet for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxHash, EvmError> {
        (**self).send(contract, calldata, note).await
    }
}
