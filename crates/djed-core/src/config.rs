//! Bank configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, Error, Money, Result};

/// Immutable parameters of a bank, fixed at construction.
///
/// Ratios and rates are plain decimals: a `min_reserve_ratio` of 4 means the
/// reserves must cover four times the stable liabilities, a `fee_rate` of
/// 0.02 is a 2% fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Fee levied on the gross notional value of every mint/redeem
    pub fee_rate: Money,

    /// Reserve floor, as a multiple of stable liabilities at par
    pub min_reserve_ratio: Money,

    /// Reserve ceiling, as a multiple of stable liabilities at par
    pub max_reserve_ratio: Money,

    /// Residual token price (in base asset) while no residual tokens exist
    pub default_residual_price: Money,

    /// Asset held in reserve
    pub base_asset: CurrencyCode,

    /// External currency the stable token tracks
    pub peg_currency: CurrencyCode,

    /// Stable token identity
    pub stable_token: CurrencyCode,

    /// Residual token identity
    pub residual_token: CurrencyCode,
}

impl Default for BankConfig {
    /// SigmaUSD mainnet parameters: 2% fee, 400%..800% reserve band,
    /// 0.001 ERG bootstrap price for SigRSV.
    ///
    /// These suit restoring a running bank with `Bank::with_state`. An empty
    /// bank cannot start under them: the first stable mint needs
    /// `min_reserve_ratio <= 1 + fee_rate`, and the residual ceiling is zero
    /// until stable tokens exist.
    fn default() -> Self {
        Self {
            fee_rate: Decimal::new(2, 2),
            min_reserve_ratio: Decimal::from(4),
            max_reserve_ratio: Decimal::from(8),
            default_residual_price: Decimal::new(1, 3),
            base_asset: CurrencyCode::new("ERG"),
            peg_currency: CurrencyCode::new("USD"),
            stable_token: CurrencyCode::new("SigUSD"),
            residual_token: CurrencyCode::new("SigRSV"),
        }
    }
}

impl BankConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges and currency identities
    pub fn validate(&self) -> Result<()> {
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(Error::Config(format!(
                "fee_rate must be in [0, 1), got {}",
                self.fee_rate
            )));
        }

        if self.min_reserve_ratio < Decimal::ZERO {
            return Err(Error::Config(format!(
                "min_reserve_ratio must be non-negative, got {}",
                self.min_reserve_ratio
            )));
        }

        if self.max_reserve_ratio < self.min_reserve_ratio {
            return Err(Error::Config(format!(
                "max_reserve_ratio {} is below min_reserve_ratio {}",
                self.max_reserve_ratio, self.min_reserve_ratio
            )));
        }

        if self.default_residual_price <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "default_residual_price must be positive, got {}",
                self.default_residual_price
            )));
        }

        let codes = [
            &self.base_asset,
            &self.peg_currency,
            &self.stable_token,
            &self.residual_token,
        ];
        if let Some(empty) = codes.iter().find(|c| c.as_str().is_empty()) {
            return Err(Error::Config(format!("empty currency code: {:?}", empty)));
        }
        for (i, a) in codes.iter().enumerate() {
            if codes[i + 1..].contains(a) {
                return Err(Error::Config(format!("currency code {} used twice", a)));
            }
        }

        Ok(())
    }
}
