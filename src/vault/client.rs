//! [`VaultQuery`] and [`VaultActions`] over an EVM connection.

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use stargate_evm::{Evm, Wallet};
use tracing::{debug, info};

use super::{VaultActions, VaultDeployment, VaultQuery};
use crate::amount::TokenAmount;
use crate::bindings::{IERC20, IStargateWrapper};
use crate::error::ChainCallError;

/// Contract client for one token/wrapper deployment.
///
/// Works with any [`Evm`] for reads. Writes are available when `E` is
/// also a [`Wallet`].
#[derive(Debug, Clone)]
pub struct VaultClient<E> {
    evm: E,
    deployment: VaultDeployment,
}

impl<E: Evm> VaultClient<E> {
    pub fn new(evm: E, deployment: VaultDeployment) -> Self {
        Self { evm, deployment }
    }

    async fn view<C>(&self, contract: Address, call: C) -> Result<C::Return, ChainCallError>
    where
        C: SolCall + Send + Sync,
    {
        let output = self.evm.call(contract, call.abi_encode().into()).await?;

        Ok(C::abi_decode_returns(&output)?)
    }

    /// Runs a `uint256` view and scales the result for display.
    async fn view_amount<C>(&self, contract: Address, call: C) -> Result<TokenAmount, ChainCallError>
    where
        C: SolCall<Return = U256> + Send + Sync,
    {
        let raw = self.view(contract, call).await?;
        debug!(%contract, function = C::SIGNATURE, %raw, "view call returned");

        Ok(TokenAmount::from_raw(raw, self.deployment.decimals)?)
    }

    fn raw(&self, amount: TokenAmount) -> Result<U256, ChainCallError> {
        Ok(amount.to_raw(self.deployment.decimals)?)
    }

    /// Scales a write amount, rejecting anything that would reach the
    /// contract as zero.
    fn positive_raw(&self, amount: TokenAmount) -> Result<U256, ChainCallError> {
        if amount.is_negative() {
            return Err(ChainCallError::NonPositiveAmount);
        }

        let raw = self.raw(amount)?;
        if raw.is_zero() {
            return Err(ChainCallError::NonPositiveAmount);
        }

        Ok(raw)
    }
}

impl<W: Wallet> VaultClient<W> {
    async fn submit<C>(
        &self,
        contract: Address,
        call: C,
        raw: Option<U256>,
        note: &str,
    ) -> Result<TxHash, ChainCallError>
    where
        C: SolCall + Send + Sync,
    {
        let tx_hash = self
            .evm
            .send(contract, call.abi_encode().into(), note)
            .await?;

        info!(
            %contract,
            from = %self.evm.address(),
            raw_amount = ?raw,
            %tx_hash,
            note,
            "Vault write submitted"
        );

        Ok(tx_hash)
    }
}

#[async_trait]
impl<E: Evm> VaultQuery for VaultClient<E> {
    fn deployment(&self) -> &VaultDeployment {
        &self.deployment
    }

    async fn asset_balance(&self, user: Address) -> Result<TokenAmount, ChainCallError> {
        self.view_amount(self.deployment.token, IERC20::balanceOfCall { account: user })
            .await
    }

    async fn share_balance(&self, user: Address) -> Result<TokenAmount, ChainCallError> {
        self.view_amount(
            self.deployment.wrapper,
            IStargateWrapper::balanceOfCall { account: user },
        )
        .await
    }

    async fn reward_balance(&self) -> Result<TokenAmount, ChainCallError> {
        self.view_amount(self.deployment.wrapper, IStargateWrapper::getRewardsCall {})
            .await
    }

    async fn max_withdrawable(&self, user: Address) -> Result<TokenAmount, ChainCallError> {
        self.view_amount(
            self.deployment.wrapper,
            IStargateWrapper::maxWithdrawCall { owner: user },
        )
        .await
    }

    async fn preview_deposit(&self, amount: TokenAmount) -> Result<TokenAmount, ChainCallError> {
        if amount.is_zero() {
            return Ok(TokenAmount::ZERO);
        }

        let assets = self.raw(amount)?;
        self.view_amount(
            self.deployment.wrapper,
            IStargateWrapper::previewDepositCall { assets },
        )
        .await
    }

    async fn preview_withdraw(
        &self,
        amount: TokenAmount,
    ) -> Result<TokenAmount, ChainCallError> {
        if amount.is_zero() {
            return Ok(TokenAmount::ZERO);
        }

        let assets = self.raw(amount)?;
        self.view_amount(
            self.deployment.wrapper,
            IStargateWrapper::previewWithdrawCall { assets },
        )
        .await
    }
}

#[async_trait]
impl<W: Wallet> VaultActions for VaultClient<W> {
    fn account(&self) -> Address {
        self.evm.address()
    }

    async fn approve(
        &self,
        amount: TokenAmount,
        spender: Address,
    ) -> Result<TxHash, ChainCallError> {
        let raw = self.raw(amount)?;

        self.submit(
            self.deployment.token,
            IERC20::approveCall {
                spender,
                amount: raw,
            },
            Some(raw),
            &format!("approve {amount} {}", self.deployment.asset_symbol),
        )
        .await
    }

    async fn deposit(&self, amount: TokenAmount) -> Result<TxHash, ChainCallError> {
        let assets = self.positive_raw(amount)?;

        self.submit(
            self.deployment.wrapper,
            IStargateWrapper::depositCall { assets },
            Some(assets),
            &format!("deposit {amount} {}", self.deployment.asset_symbol),
        )
        .await
    }

    async fn withdraw(
        &self,
        amount: TokenAmount,
        recipient: Address,
    ) -> Result<TxHash, ChainCallError> {
        let assets = self.positive_raw(amount)?;

        self.submit(
            self.deployment.wrapper,
            IStargateWrapper::withdrawCall {
                assets,
                receiver: recipient,
            },
            Some(assets),
            &format!("withdraw {amount} to {recipient}"),
        )
        .await
    }

    async fn claim_rewards(&self) -> Result<TxHash, ChainCallError> {
        self.submit(
            self.deployment.wrapper,
            IStargateWrapper::claimRewardsCall {},
            None,
            "claim rewards",
        )
        .await
    }
}
