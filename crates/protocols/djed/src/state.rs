//! Bank Status Snapshot
//!
//! Read-only view of a bank for display and monitoring.

use djed_core::{BankState, Money, Result};
use serde::{Deserialize, Serialize};

use crate::calculator::PricingEngine;

/// Derived bank status at one peg rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankStatus {
    // Bank state
    pub reserves: Money,
    pub stable_supply: Money,
    pub residual_supply: Money,

    // Oracle state
    pub peg_rate: Money,

    // Derived state
    pub liabilities: Money,
    pub equity: Money,
    pub stable_price: Money,
    pub residual_price: Money,
    /// `None` while no stable tokens are outstanding
    pub reserve_ratio: Option<Money>,
    pub min_reserve: Money,
    pub max_reserve: Money,

    // Action availability
    pub can_mint_stable: bool,
    pub can_redeem_stable: bool,
    pub can_mint_residual: bool,
    pub can_redeem_residual: bool,

    // Limits (`None` = unbounded)
    pub max_stable_mintable: Option<Money>,
    pub max_residual_mintable: Option<Money>,
    pub max_residual_redeemable: Money,
}

impl BankStatus {
    /// Derive the status of a state snapshot
    pub fn from_state(engine: &PricingEngine<'_>, state: &BankState) -> Result<Self> {
        let prices = engine.prices(state)?;
        let max_stable_mintable = engine.max_stable_mintable(state)?;
        let max_residual_mintable = engine.max_residual_mintable(state)?;
        let max_residual_redeemable = engine.max_residual_redeemable(state)?;

        Ok(Self {
            reserves: state.reserves,
            stable_supply: state.stable_supply,
            residual_supply: state.residual_supply,

            peg_rate: engine.peg_rate(),

            liabilities: engine.liabilities(state.reserves, state.stable_supply)?,
            equity: engine.equity(state.reserves, state.stable_supply)?,
            stable_price: prices.stable,
            residual_price: prices.residual,
            reserve_ratio: engine.reserve_ratio(state.reserves, state.stable_supply)?,
            min_reserve: engine.min_reserve(state.stable_supply)?,
            max_reserve: engine.max_reserve(state.stable_supply)?,

            can_mint_stable: is_positive_limit(max_stable_mintable),
            // Stable redemption is never bounded by the reserve band
            can_redeem_stable: state.stable_supply > Money::ZERO,
            can_mint_residual: is_positive_limit(max_residual_mintable),
            can_redeem_residual: max_residual_redeemable > Money::ZERO,

            max_stable_mintable,
            max_residual_mintable,
            max_residual_redeemable,
        })
    }
}

fn is_positive_limit(limit: Option<Money>) -> bool {
    limit.map_or(true, |max| max > Money::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use djed_core::BankConfig;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_from_state() {
        let config = BankConfig {
            fee_rate: dec!(0.01),
            min_reserve_ratio: dec!(1.0),
            max_reserve_ratio: dec!(2.0),
            ..BankConfig::default()
        };
        let engine = PricingEngine::new(&config, dec!(1));
        let state = BankState::new(dec!(1000), dec!(500), dec!(100));

        let status = BankStatus::from_state(&engine, &state).unwrap();

        assert_eq!(status.liabilities, dec!(500));
        assert_eq!(status.equity, dec!(500));
        assert_eq!(status.stable_price, dec!(1));
        assert_eq!(status.residual_price, dec!(5));
        assert_eq!(status.reserve_ratio, Some(dec!(2)));
        assert_eq!(status.min_reserve, dec!(500));
        assert_eq!(status.max_reserve, dec!(1000));

        assert!(status.can_mint_stable);
        assert!(status.can_redeem_stable);
        // Reserves sit on the ceiling
        assert!(!status.can_mint_residual);
        assert!(status.can_redeem_residual);
        assert_eq!(status.max_stable_mintable, None);
    }

    #[test]
    fn test_status_of_empty_bank() {
        let config = BankConfig::default();
        let engine = PricingEngine::new(&config, dec!(1.851851851));
        let status = BankStatus::from_state(&engine, &BankState::default()).unwrap();

        assert_eq!(status.stable_price, dec!(1.851851851));
        assert_eq!(status.residual_price, config.default_residual_price);
        assert_eq!(status.reserve_ratio, None);
        assert!(!status.can_redeem_stable);
        // Without stable supply the ceiling is zero
        assert!(!status.can_mint_residual);
        assert!(!status.can_redeem_residual);
    }

    #[test]
    fn test_stable_redeemable_when_undercollateralized() {
        let config = BankConfig::default();
        let engine = PricingEngine::new(&config, dec!(2));
        // Far below the 4x floor: nothing can be minted, stable can still leave
        let state = BankState::new(dec!(150), dec!(100), dec!(10));
        let status = BankStatus::from_state(&engine, &state).unwrap();

        assert!(status.can_redeem_stable);
        assert!(!status.can_mint_stable);
        assert!(!status.can_redeem_residual);
        assert_eq!(status.stable_price, dec!(1.5));
    }

    #[test]
    fn test_status_serialization() {
        let config = BankConfig::default();
        let engine = PricingEngine::new(&config, dec!(2));
        let state = BankState::new(dec!(10000), dec!(100), dec!(1000));
        let status = BankStatus::from_state(&engine, &state).unwrap();

        let json = serde_json::to_string(&status).unwrap();
        let parsed: BankStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}
