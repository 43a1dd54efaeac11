//! Mock implementation of the vault traits for testing.

use std::sync::Mutex;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{VaultActions, VaultDeployment, VaultQuery};
use crate::amount::TokenAmount;
use crate::error::ChainCallError;

/// Write call observed by [`MockVault`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedCall {
    Approve {
        amount: TokenAmount,
        spender: Address,
    },
    Deposit(TokenAmount),
    Withdraw {
        amount: TokenAmount,
        recipient: Address,
    },
    ClaimRewards,
}

/// Mock vault with fixed balances and a proportional preview rate.
///
/// Previews return `amount * rate`; writes are recorded and answered
/// with a fresh random hash unless the mock is set to fail.
pub(crate) struct MockVault {
    deployment: VaultDeployment,
    account: Address,
    asset_balance: TokenAmount,
    share_balance: TokenAmount,
    reward_balance: TokenAmount,
    rate: Decimal,
    writes_fail: bool,
    queries: Mutex<Vec<&'static str>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockVault {
    pub(crate) fn new(account: Address) -> Self {
        Self {
            deployment: VaultDeployment::default(),
            account,
            asset_balance: TokenAmount::ZERO,
            share_balance: TokenAmount::ZERO,
            reward_balance: TokenAmount::ZERO,
            rate: Decimal::ONE,
            writes_fail: false,
            queries: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_balances(mut self, assets: Decimal, shares: Decimal) -> Self {
        self.asset_balance = TokenAmount::new(assets);
        self.share_balance = TokenAmount::new(shares);
        self
    }

    pub(crate) fn with_rewards(mut self, rewards: Decimal) -> Self {
        self.reward_balance = TokenAmount::new(rewards);
        self
    }

    pub(crate) fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = rate;
        self
    }

    /// Creates a mock whose writes are rejected by the user.
    pub(crate) fn rejecting(mut self) -> Self {
        self.writes_fail = true;
        self
    }

    /// Names of the query methods invoked, in order.
    pub(crate) fn queries(&self) -> Vec<&'static str> {
        self.queries.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn query(&self, name: &'static str) {
        self.queries.lock().unwrap().push(name);
    }

    fn preview(&self, amount: TokenAmount) -> Result<TokenAmount, ChainCallError> {
        if amount.is_negative() {
            return Err(crate::amount::AmountError::Negative(amount.into()).into());
        }

        Ok(TokenAmount::new((Decimal::from(amount) * self.rate).normalize()))
    }

    fn record(&self, call: RecordedCall) -> Result<TxHash, ChainCallError> {
        if self.writes_fail {
            return Err(ChainCallError::UserRejected(
                stargate_evm::EvmError::Transport(alloy::transports::TransportError::ErrorResp(
                    alloy::rpc::json_rpc::ErrorPayload {
                        code: 4001,
                        message: "User rejected the request.".into(),
                        data: None,
                    },
                )),
            ));
        }

        self.calls.lock().unwrap().push(call);
        Ok(TxHash::random())
    }
}

#[async_trait]
impl VaultQuery for MockVault {
    fn deployment(&self) -> &VaultDeployment {
        &self.deployment
    }

    async fn asset_balance(&self, _user: Address) -> Result<TokenAmount, ChainCallError> {
        self.query("asset_balance");
        Ok(self.asset_balance)
    }

    async fn share_balance(&self, _user: Address) -> Result<TokenAmount, ChainCallError> {
        self.query("share_balance");
        Ok(self.share_balance)
    }

    async fn reward_balance(&self) -> Result<TokenAmount, ChainCallError> {
        self.query("reward_balance");
        Ok(self.reward_balance)
    }

    async fn max_withdrawable(&self, _user: Address) -> Result<TokenAmount, ChainCallError> {
        self.query("max_withdrawable");
        Ok(self.share_balance)
    }

    async fn preview_deposit(&self, amount: TokenAmount) -> Result<TokenAmount, ChainCallError> {
        self.query("preview_deposit");
        self.preview(amount)
    }

    async fn preview_withdraw(
        &self,
        amount: TokenAmount,
    ) -> Result<TokenAmount, ChainCallError> {
        self.query("preview_withdraw");
        self.preview(amount)
    }
}

#[async_trait]
impl VaultActions for MockVault {
    fn account(&self) -> Address {
        self.account
    }

    async fn approve(
        &self,
        amount: TokenAmount,
        spender: Address,
    ) -> Result<TxHash, ChainCallError> {
        self.record(RecordedCall::Approve { amount, spender })
    }

    async fn deposit(&self, amount: TokenAmount) -> Result<TxHash, ChainCallError> {
        self.record(RecordedCall::Deposit(amount))
    }

    async fn withdraw(
        &self,
        amount: TokenAmount,
        recipient: Address,
    ) -> Result<TxHash, ChainCallError> {
        self.record(RecordedCall::Withdraw { amount, recipient })
    }

    async fn claim_rewards(&self) -> Result<TxHash, ChainCallError> {
        self.record(RecordedCall::ClaimRewards)
    }
}
