//! Human-readable token amounts and their fixed-point onchain form.
//!
//! Contracts deal in integers scaled by `10^decimals`; people type and
//! read decimals. Every amount crossing that boundary goes through
//! [`TokenAmount::to_raw`] or [`TokenAmount::from_raw`].

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Largest supported fixed-point scale.
pub const MAX_DECIMALS: u8 = 18;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct TokenAmount(pub(crate) Decimal);

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();

        Decimal::from_str(input)
            .map(Self)
            .map_err(|source| AmountError::Parse {
                input: input.to_string(),
                source,
            })
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TokenAmount> for Decimal {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl TokenAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Scales to the contract's integer representation, truncating
    /// digits beyond `decimals`.
    ///
    /// Returns an error for negative values or overflow during scaling.
    pub fn to_raw(self, decimals: u8) -> Result<U256, AmountError> {
        check_decimals(decimals)?;

        if self.is_negative() {
            return Err(AmountError::Negative(self.0));
        }

        if self.0.is_zero() {
            return Ok(U256::ZERO);
        }

        let scale = Decimal::from(10u64.pow(u32::from(decimals)));
        let scaled = self
            .0
            .checked_mul(scale)
            .ok_or(AmountError::Overflow { decimals })?;

        Ok(U256::from_str_radix(&scaled.trunc().to_string(), 10)?)
    }

    /// Converts a contract integer back into a decimal amount with
    /// trailing zeros removed.
    pub fn from_raw(raw: U256, decimals: u8) -> Result<Self, AmountError> {
        check_decimals(decimals)?;

        let mantissa = u128::try_from(raw)
            .ok()
            .and_then(|mantissa| i128::try_from(mantissa).ok())
            .ok_or(AmountError::TooLarge(raw))?;

        let value = Decimal::try_from_i128_with_scale(mantissa, u32::from(decimals))
            .map_err(|_| AmountError::TooLarge(raw))?;

        Ok(Self(value.normalize()))
    }
}

fn check_decimals(decimals: u8) -> Result<(), AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedDecimals { decimals });
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("{input:?} is not a decimal amount")]
    Parse {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    #[error("amount overflow when scaling to {decimals} decimals")]
    Overflow { decimals: u8 },
    #[error("{decimals} decimals exceeds the supported maximum of {MAX_DECIMALS}")]
    UnsupportedDecimals { decimals: u8 },
    #[error("onchain amount {0} is too large to display")]
    TooLarge(U256),
    #[error("failed to parse scaled amount as U256")]
    ParseError(#[from] alloy::primitives::ruint::ParseError),
}
