//! Typed access to the token and Stargate wrapper contracts.
//!
//! Reads go through [`VaultQuery`] and only need an [`Evm`] connection.
//! Writes go through [`VaultActions`] and need a signing [`Wallet`].
//! Both traits work in human [`TokenAmount`]s; scaling to and from the
//! contracts' fixed-point integers happens inside [`VaultClient`].
//!
//! [`Evm`]: stargate_evm::Evm
//! [`Wallet`]: stargate_evm::Wallet

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::amount::TokenAmount;
use crate::error::ChainCallError;

mod client;
mod config;
#[cfg(test)]
pub(crate) mod mock;

pub use client::VaultClient;
pub use config::{DeploymentError, VaultDeployment};

/// Read-only views over the deployment.
#[async_trait]
pub trait VaultQuery: Send + Sync {
    fn deployment(&self) -> &VaultDeployment;

    /// Underlying token balance held by `user`.
    async fn asset_balance(&self, user: Address) -> Result<TokenAmount, ChainCallError>;

    /// Wrapper shares held by `user`.
    async fn share_balance(&self, user: Address) -> Result<TokenAmount, ChainCallError>;

    /// Rewards accrued to the caller. The wrapper resolves the account
    /// from `msg.sender`, so the result is only meaningful when the
    /// connection has a caller address.
    async fn reward_balance(&self) -> Result<TokenAmount, ChainCallError>;

    async fn max_withdrawable(&self, user: Address) -> Result<TokenAmount, ChainCallError>;

    /// Shares that depositing `amount` would mint.
    async fn preview_deposit(&self, amount: TokenAmount) -> Result<TokenAmount, ChainCallError>;

    /// What the wrapper reports for withdrawing `amount`.
    async fn preview_withdraw(&self, amount: TokenAmount)
    -> Result<TokenAmount, ChainCallError>;
}

/// State-changing calls. Each returns as soon as the transaction is
/// accepted; inclusion is never awaited.
#[async_trait]
pub trait VaultActions: VaultQuery {
    /// Address transactions are signed from.
    fn account(&self) -> Address;

    async fn approve(
        &self,
        amount: TokenAmount,
        spender: Address,
    ) -> Result<TxHash, ChainCallError>;

    async fn deposit(&self, amount: TokenAmount) -> Result<TxHash, ChainCallError>;

    async fn withdraw(
        &self,
        amount: TokenAmount,
        recipient: Address,
    ) -> Result<TxHash, ChainCallError>;

    async fn claim_rewards(&self) -> Result<TxHash, ChainCallError>;
}
