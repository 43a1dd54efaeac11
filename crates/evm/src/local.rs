//! Local signer implementation.
//!
//! `LocalWallet` wraps an alloy provider with an embedded
//! `EthereumWallet` and submits transactions directly.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder, WalletProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::{Evm, EvmError, Wallet};

/// Wallet that signs locally and submits transactions without waiting
/// for them to be mined.
///
/// Wraps a provider that includes a wallet filler (e.g., built with
/// `ProviderBuilder::new().wallet(wallet).connect_http(...)`). The wallet
/// address is derived from the provider's default signer.
#[derive(Debug, Clone)]
pub struct LocalWallet<P> {
    provider: P,
}

impl<P> LocalWallet<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Builds an HTTP-backed wallet from a raw secp256k1 private key.
pub fn connect_http(
    rpc_url: Url,
    private_key: &B256,
) -> Result<LocalWallet<impl Provider + WalletProvider + Clone + 'static>, EvmError> {
    let signer = PrivateKeySigner::from_bytes(private_key)?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(rpc_url);

    Ok(LocalWallet::new(provider))
}

#[async_trait]
impl<P> Evm for LocalWallet<P>
where
    P: Provider + WalletProvider + Clone + Send + Sync + 'static,
{
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn caller(&self) -> Option<Address> {
        Some(self.provider.default_signer_address())
    }
}

#[async_trait]
impl<P> Wallet for LocalWallet<P>
where
    P: Provider + WalletProvider + Clone + Send + Sync + 'static,
{
    fn address(&self) -> Address {
        self.provider.default_signer_address()
    }

    async fn send(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<TxHash, EvmError> {
        info!(%contract, note, "Submitting contract call");

        let tx = TransactionRequest::default()
            .to(contract)
            .input(calldata.into());

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();

        info!(%tx_hash, note, "Transaction submitted");

        Ok(tx_hash)
    }
}
