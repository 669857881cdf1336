//! Core type definitions for the reserve bank

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact decimal quantity used for every reserve, supply, price and fee.
///
/// 96-bit mantissa with up to 28 fractional digits, so magnitudes stay below
/// about 7.9e28. Products past that surface as `Error::ArithmeticOverflow`.
pub type Money = Decimal;

/// Currency or asset identifier (peg currency, base asset, or one of the two tokens)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counterparty account identifier, opaque to the bank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two tokens issued by the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Price-stable token pegged to the peg currency
    Stable,
    /// Residual-claim token absorbing reserve volatility
    Residual,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Residual => "residual",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable reserve and supply quantities of a bank.
///
/// All three quantities are non-negative in every committed state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BankState {
    /// Base asset held in reserve
    pub reserves: Money,
    /// Outstanding stable tokens
    pub stable_supply: Money,
    /// Outstanding residual tokens
    pub residual_supply: Money,
}

impl BankState {
    pub fn new(reserves: Money, stable_supply: Money, residual_supply: Money) -> Self {
        Self {
            reserves,
            stable_supply,
            residual_supply,
        }
    }

    /// Check that no quantity is negative
    pub fn is_well_formed(&self) -> bool {
        self.reserves >= Money::ZERO
            && self.stable_supply >= Money::ZERO
            && self.residual_supply >= Money::ZERO
    }

    /// Outstanding supply of the given token
    pub fn supply_of(&self, token: TokenKind) -> Money {
        match token {
            TokenKind::Stable => self.stable_supply,
            TokenKind::Residual => self.residual_supply,
        }
    }
}

/// A mint/redeem transaction as seen from the counterparty.
///
/// Positive token amounts mint, negative amounts redeem. A positive
/// `amount_base` is a net withdrawal of base asset from the reserves, a
/// negative one a net deposit. `fee` is always paid into the reserves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProposal {
    pub amount_base: Money,
    pub amount_stable: Money,
    pub amount_residual: Money,
    pub fee: Money,
}
