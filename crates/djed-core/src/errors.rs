//! Error types for the reserve bank

use thiserror::Error;

use crate::{CurrencyCode, Money, TokenKind};

/// Core errors that can abort a bank operation
#[derive(Debug, Error)]
pub enum Error {
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Bank state lock poisoned")]
    StatePoisoned,
}

/// Exchange rate lookup errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("No rate published for {from}/{to}")]
    RateUnavailable { from: CurrencyCode, to: CurrencyCode },

    #[error("Invalid rate {rate} for {from}/{to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Money,
    },
}

/// Settlement recording errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to record transfers: {message}")]
    RecordFailed { message: String },
}

/// Reasons a mint/redeem request is turned down.
///
/// A rejection is an ordinary outcome, not an error: the bank state is left
/// untouched and nothing is sent to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Reserves {new_reserves} would fall below minimum {min_reserve}")]
    BelowMinReserve {
        new_reserves: Money,
        min_reserve: Money,
    },

    #[error("Reserves {new_reserves} would exceed maximum {max_reserve}")]
    AboveMaxReserve {
        new_reserves: Money,
        max_reserve: Money,
    },

    #[error("Insufficient {token} supply: redeeming {requested}, outstanding {available}")]
    InsufficientSupply {
        token: TokenKind,
        requested: Money,
        available: Money,
    },
}

/// Result type alias for bank operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(OracleError::RateUnavailable { .. }) => "rate_unavailable",
            Self::Oracle(OracleError::InvalidRate { .. }) => "invalid_rate",
            Self::Ledger(_) => "ledger_failed",
            Self::InvariantViolation { .. } => "invariant_violation",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
            Self::StatePoisoned => "state_poisoned",
        }
    }

    /// Whether the error points at a defect in the engine rather than at
    /// its inputs or collaborators.
    ///
    /// `ArithmeticOverflow` is not fatal: it means a quantity left the range
    /// [`Money`] can hold.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. } | Self::StatePoisoned)
    }

    /// Shorthand for an [`Error::InvariantViolation`]
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

impl Rejection {
    /// Get a stable machine-readable rejection code
    pub fn code(&self) -> &'static str {
        match self {
            Self::BelowMinReserve { .. } => "below_min_reserve",
            Self::AboveMaxReserve { .. } => "above_max_reserve",
            Self::InsufficientSupply { .. } => "insufficient_supply",
        }
    }
}
