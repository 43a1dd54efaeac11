//! Chain access for sessions without a signer.

use alloy::primitives::Address;
use alloy::providers::Provider;
use async_trait::async_trait;

use crate::Evm;

/// Read-only chain access.
///
/// Optionally carries a caller address so views that depend on
/// `msg.sender` can be evaluated for a watched account.
#[derive(Debug, Clone)]
pub struct ReadOnlyEvm<P> {
    provider: P,
    caller: Option<Address>,
}

impl<P> ReadOnlyEvm<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            caller: None,
        }
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }
}

#[async_trait]
impl<P> Evm for ReadOnlyEvm<P>
where
    P: Provider + Clone + Send + Sync + 'static,
{
    type Provider = P;

    fn provider(&self) -> &P {
        &self.provider
    }

    fn caller(&self) -> Option<Address> {
        self.caller
    }
}
