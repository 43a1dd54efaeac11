//! Shared test fixtures: mocked providers and a wallet that records
//! what it was asked to sign instead of broadcasting it.

use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::mock::Asserter;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::sol_types::SolValue;
use async_trait::async_trait;
use stargate_evm::{Evm, EvmError, Wallet};

/// Provider answering from `asserter` in push order.
pub(crate) fn mocked_provider(asserter: Asserter) -> impl Provider + Clone + 'static {
    ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter)
}

/// ABI-encoded `uint256` as returned by a view call.
pub(crate) fn encoded_uint(value: u64) -> Bytes {
    Bytes::from(U256::from(value).abi_encode())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentCall {
    pub(crate) contract: Address,
    pub(crate) calldata: Bytes,
    pub(crate) note: String,
}

/// Wallet whose reads hit a mocked provider and whose writes are
/// recorded and answered with a random hash.
pub(crate) struct RecordingWallet<P> {
    provider: P,
    address: Address,
    sent: Mutex<Vec<SentCall>>,
}

/// Recording wallet signing as `address`, with reads answered by
/// `asserter`.
pub(crate) fn recording_wallet(
    asserter: Asserter,
    address: Address,
) -> RecordingWallet<impl Provider + Clone + 'static> {
    RecordingWallet {
        provider: mocked_provider(asserter),
        address,
        sent: Mutex::new(Vec::new()),
    }
}

impl<P> RecordingWallet<P> {
    pub(crate) fn sent(&self) -> Vec<SentCall> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl<P> Evm for RecordingWallet<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn caller(&self) -> Option<Address> {
        Some(self.address)
    }
}

#[async_trait]
impl<P> Wallet for RecordingWallet<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    fn address(&self) -> Address {
        self.address
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxHash, EvmError> {
        self.sent.lock().unwrap().push(SentCall {
            contract,
            calldata,
            note: note.to_string(),
        });

        Ok(TxHash::random())
    }
}
