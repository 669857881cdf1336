//! Reserve Band Policy
//!
//! Decides whether a hypothetical next state keeps the reserves inside the
//! admissible band. The floor protects stable holders and applies to stable
//! minting and residual redemption. The ceiling limits residual dilution and
//! applies to residual minting only. Stable redemption is never blocked.

use djed_core::{Money, Rejection, Result};

use crate::calculator::PricingEngine;

/// Which legs of a transaction the band applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReserveChange {
    pub mints_stable: bool,
    pub mints_residual: bool,
    pub redeems_residual: bool,
}

impl ReserveChange {
    /// Classify signed token amounts
    pub fn from_amounts(amount_stable: Money, amount_residual: Money) -> Self {
        Self {
            mints_stable: amount_stable > Money::ZERO,
            mints_residual: amount_residual > Money::ZERO,
            redeems_residual: amount_residual < Money::ZERO,
        }
    }
}

/// The bound a next state would break, if any
pub fn reserve_violation(
    engine: &PricingEngine<'_>,
    change: ReserveChange,
    new_reserves: Money,
    new_stable_supply: Money,
) -> Result<Option<Rejection>> {
    if change.mints_stable || change.redeems_residual {
        let min_reserve = engine.min_reserve(new_stable_supply)?;
        if new_reserves < min_reserve {
            return Ok(Some(Rejection::BelowMinReserve {
                new_reserves,
                min_reserve,
            }));
        }
    }

    if change.mints_residual {
        let max_reserve = engine.max_reserve(new_stable_supply)?;
        if new_reserves > max_reserve {
            return Ok(Some(Rejection::AboveMaxReserve {
                new_reserves,
                max_reserve,
            }));
        }
    }

    Ok(None)
}

/// Whether the next state is admissible
pub fn acceptable_reserve_change(
    engine: &PricingEngine<'_>,
    mints_stable: bool,
    mints_residual: bool,
    redeems_residual: bool,
    new_reserves: Money,
    new_stable_supply: Money,
) -> Result<bool> {
    let change = ReserveChange {
        mints_stable,
        mints_residual,
        redeems_residual,
    };
    Ok(reserve_violation(engine, change, new_reserves, new_stable_supply)?.is_none())
}
