//! Deployment the client talks to.
//!
//! The token/wrapper pair and the fixed-point scale are configuration,
//! defaulting to the Stargate USDC wrapper on Polygon.

use alloy::primitives::{Address, address};
use serde::Deserialize;

use crate::amount::MAX_DECIMALS;

/// Bridged USDC on Polygon.
const POLYGON_USDC: Address = address!("0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");

/// Stargate USDC wrapper vault on Polygon.
const POLYGON_STARGATE_WRAPPER: Address = address!("0x3ca2b1565f43e8ed469571b28aB4f4445486070E");

const USDC_DECIMALS: u8 = 6;

/// Token/wrapper pair plus the integer scale shared by both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultDeployment {
    /// Underlying ERC20 deposited into the wrapper.
    pub token: Address,
    /// Wrapper contract holding deposits and issuing shares.
    pub wrapper: Address,
    /// Onchain amounts are human amounts times `10^decimals`.
    pub decimals: u8,
    pub asset_symbol: String,
    pub share_symbol: String,
}

impl Default for VaultDeployment {
    fn default() -> Self {
        Self {
            token: POLYGON_USDC,
            wrapper: POLYGON_STARGATE_WRAPPER,
            decimals: USDC_DECIMALS,
            asset_symbol: "USDC".to_string(),
            share_symbol: "USDC-SV".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeploymentError {
    #[error("decimals must be at most {MAX_DECIMALS}, got {0}")]
    UnsupportedDecimals(u8),
    #[error("token and wrapper must be different contracts ({0})")]
    SameContract(Address),
}

impl VaultDeployment {
    pub(crate) fn validate(self) -> Result<Self, DeploymentError> {
        if self.decimals > MAX_DECIMALS {
            return Err(DeploymentError::UnsupportedDecimals(self.decimals));
        }

        if self.token == self.wrapper {
            return Err(DeploymentError::SameContract(self.token));
        }

        Ok(self)
    }
}
