//! Djed Pricing Calculator
//!
//! Pure valuation functions over an explicit bank state snapshot.
//! No I/O, no locking - the peg rate is looked up by the caller and passed in.
//!
//! # Units
//!
//! - Reserves, prices and fees: base asset
//! - Stable supply: peg currency (one stable token is worth one peg unit at par)
//! - Peg rate: base asset per one unit of peg currency
//! - All arithmetic is checked; overflow aborts with `Error::ArithmeticOverflow`

use djed_core::{BankConfig, BankState, Error, Money, Result, TransactionProposal};

pub(crate) fn add(a: Money, b: Money, operation: &'static str) -> Result<Money> {
    a.checked_add(b)
        .ok_or(Error::ArithmeticOverflow { operation })
}

pub(crate) fn sub(a: Money, b: Money, operation: &'static str) -> Result<Money> {
    a.checked_sub(b)
        .ok_or(Error::ArithmeticOverflow { operation })
}

pub(crate) fn mul(a: Money, b: Money, operation: &'static str) -> Result<Money> {
    a.checked_mul(b)
        .ok_or(Error::ArithmeticOverflow { operation })
}

/// Division with a non-zero divisor; callers short-circuit the zero case.
fn div(a: Money, b: Money, operation: &'static str) -> Result<Money> {
    if b.is_zero() {
        return Err(Error::invariant(format!("division by zero in {}", operation)));
    }
    a.checked_div(b)
        .ok_or(Error::ArithmeticOverflow { operation })
}

/// Division for per-token payout prices: the quotient never multiplies back
/// above the dividend.
///
/// `checked_div` rounds its last digit to nearest, so 2 / 3 comes back as
/// 0.666...67 and three tokens would be paid more than the 2 held. Such a
/// quotient is stepped down by one unit in its last place.
fn div_down(a: Money, b: Money, operation: &'static str) -> Result<Money> {
    let quotient = div(a, b, operation)?;
    if mul(quotient, b, operation)? > a {
        return sub(quotient, Money::new(1, quotient.scale()), operation);
    }
    Ok(quotient)
}

/// Nominal prices of both tokens, in base asset per token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NominalPrices {
    pub stable: Money,
    pub residual: Money,
}

/// Valuation engine for one bank configuration at one peg rate
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine<'a> {
    config: &'a BankConfig,
    peg_rate: Money,
}

impl<'a> PricingEngine<'a> {
    pub fn new(config: &'a BankConfig, peg_rate: Money) -> Self {
        Self { config, peg_rate }
    }

    pub fn config(&self) -> &'a BankConfig {
        self.config
    }

    /// Base asset per unit of peg currency
    pub fn peg_rate(&self) -> Money {
        self.peg_rate
    }

    /// Stable liabilities, capped at the reserves
    pub fn liabilities(&self, reserves: Money, stable_supply: Money) -> Result<Money> {
        let at_par = mul(stable_supply, self.peg_rate, "liabilities")?;
        let liabilities = reserves.min(at_par);
        debug_assert!(liabilities <= reserves);
        Ok(liabilities)
    }

    /// Reserves left over after the stable liabilities
    pub fn equity(&self, reserves: Money, stable_supply: Money) -> Result<Money> {
        let liabilities = self.liabilities(reserves, stable_supply)?;
        let equity = sub(reserves, liabilities, "equity")?;
        if equity < Money::ZERO {
            return Err(Error::invariant(format!(
                "negative equity {} (reserves {}, liabilities {})",
                equity, reserves, liabilities
            )));
        }
        Ok(equity)
    }

    /// Stable token price: par while fully backed, the pro-rata share of the
    /// reserves once undercollateralized. The share rounds down, so redeeming
    /// the whole supply never pays out more than the liabilities.
    pub fn stable_nominal_price(&self, reserves: Money, stable_supply: Money) -> Result<Money> {
        if stable_supply.is_zero() {
            return Ok(self.peg_rate);
        }
        let liabilities = self.liabilities(reserves, stable_supply)?;
        let backed = div_down(liabilities, stable_supply, "stable price")?;
        Ok(self.peg_rate.min(backed))
    }

    /// Residual token price: book value per token, or the configured
    /// bootstrap price while no residual tokens exist. Rounds down like the
    /// stable share.
    pub fn residual_nominal_price(
        &self,
        reserves: Money,
        stable_supply: Money,
        residual_supply: Money,
    ) -> Result<Money> {
        if residual_supply.is_zero() {
            return Ok(self.config.default_residual_price);
        }
        let equity = self.equity(reserves, stable_supply)?;
        div_down(equity, residual_supply, "residual price")
    }

    /// Reserve floor for a given stable supply
    pub fn min_reserve(&self, stable_supply: Money) -> Result<Money> {
        let ratio_supply = mul(self.config.min_reserve_ratio, stable_supply, "min reserve")?;
        mul(ratio_supply, self.peg_rate, "min reserve")
    }

    /// Reserve ceiling for a given stable supply
    pub fn max_reserve(&self, stable_supply: Money) -> Result<Money> {
        let ratio_supply = mul(self.config.max_reserve_ratio, stable_supply, "max reserve")?;
        mul(ratio_supply, self.peg_rate, "max reserve")
    }

    /// Reserves over stable liabilities at par; `None` when nothing is owed
    pub fn reserve_ratio(&self, reserves: Money, stable_supply: Money) -> Result<Option<Money>> {
        let at_par = mul(stable_supply, self.peg_rate, "reserve ratio")?;
        if at_par.is_zero() {
            return Ok(None);
        }
        div(reserves, at_par, "reserve ratio").map(Some)
    }

    /// Both nominal prices for a state snapshot
    pub fn prices(&self, state: &BankState) -> Result<NominalPrices> {
        Ok(NominalPrices {
            stable: self.stable_nominal_price(state.reserves, state.stable_supply)?,
            residual: self.residual_nominal_price(
                state.reserves,
                state.stable_supply,
                state.residual_supply,
            )?,
        })
    }

    /// Fee on the gross notional value of both token legs
    pub fn fee_on(&self, stable_value: Money, residual_value: Money) -> Result<Money> {
        let gross = add(stable_value.abs(), residual_value.abs(), "fee")?;
        mul(gross, self.config.fee_rate, "fee")
    }

    /// Price a mint/redeem request at the current nominal prices.
    ///
    /// The counterparty's base flow exactly offsets the token value; the fee
    /// is charged on top.
    pub fn price_transaction(
        &self,
        state: &BankState,
        amount_stable: Money,
        amount_residual: Money,
    ) -> Result<TransactionProposal> {
        let prices = self.prices(state)?;
        let stable_value = mul(amount_stable, prices.stable, "stable leg")?;
        let residual_value = mul(amount_residual, prices.residual, "residual leg")?;
        let token_value = add(stable_value, residual_value, "token value")?;

        Ok(TransactionProposal {
            amount_base: sub(Money::ZERO, token_value, "base amount")?,
            amount_stable,
            amount_residual,
            fee: self.fee_on(stable_value, residual_value)?,
        })
    }

    /// Max stable tokens mintable while reserves stay at or above the floor.
    ///
    /// `None` means any amount is accepted. When each minted token deposits
    /// at least as much as it raises the floor but the bank is already below
    /// the floor, small mints still fail and zero is reported.
    pub fn max_stable_mintable(&self, state: &BankState) -> Result<Option<Money>> {
        let price = self.stable_nominal_price(state.reserves, state.stable_supply)?;
        let deposit_per_token = mul(price, add(Money::ONE, self.config.fee_rate, "fee")?, "deposit")?;
        let floor_per_token = mul(self.config.min_reserve_ratio, self.peg_rate, "floor")?;
        let slack = sub(state.reserves, self.min_reserve(state.stable_supply)?, "slack")?;

        // new_reserves - new_floor = slack + amount * margin
        let margin = sub(deposit_per_token, floor_per_token, "margin")?;
        if margin >= Money::ZERO {
            return Ok(if slack >= Money::ZERO {
                None
            } else {
                Some(Money::ZERO)
            });
        }
        if slack <= Money::ZERO {
            return Ok(Some(Money::ZERO));
        }
        div(slack, -margin, "max stable mint").map(Some)
    }

    /// Max residual tokens mintable while reserves stay at or below the ceiling
    pub fn max_residual_mintable(&self, state: &BankState) -> Result<Option<Money>> {
        let price = self.residual_nominal_price(
            state.reserves,
            state.stable_supply,
            state.residual_supply,
        )?;
        let deposit_per_token = mul(price, add(Money::ONE, self.config.fee_rate, "fee")?, "deposit")?;
        let headroom = sub(self.max_reserve(state.stable_supply)?, state.reserves, "headroom")?;

        if deposit_per_token.is_zero() {
            return Ok(if headroom >= Money::ZERO {
                None
            } else {
                Some(Money::ZERO)
            });
        }
        if headroom <= Money::ZERO {
            return Ok(Some(Money::ZERO));
        }
        div(headroom, deposit_per_token, "max residual mint").map(Some)
    }

    /// Max residual tokens redeemable while reserves stay at or above the floor
    pub fn max_residual_redeemable(&self, state: &BankState) -> Result<Money> {
        let price = self.residual_nominal_price(
            state.reserves,
            state.stable_supply,
            state.residual_supply,
        )?;
        let payout_per_token = mul(price, sub(Money::ONE, self.config.fee_rate, "fee")?, "payout")?;
        let slack = sub(state.reserves, self.min_reserve(state.stable_supply)?, "slack")?;

        if slack < Money::ZERO {
            return Ok(Money::ZERO);
        }
        if payout_per_token <= Money::ZERO {
            return Ok(state.residual_supply);
        }
        let by_floor = div(slack, payout_per_token, "max residual redeem")?;
        Ok(state.residual_supply.min(by_floor))
    }
}
