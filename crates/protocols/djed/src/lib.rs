//! Djed Protocol Implementation
//!
//! This crate implements a two-token reserve bank in the style of Djed /
//! AgeUSD (the design behind SigmaUSD).
//!
//! # Protocol Overview
//!
//! The bank holds a base asset in reserve and issues two tokens against it:
//! - Stable token: pegged to an external currency, redeemable at par while
//!   the reserves cover it
//! - Residual token: a claim on the equity left after the stable liabilities
//!
//! Minting and redemption are priced from the bank's own books and bounded by
//! a reserve band that scales with the stable supply.
//!
//! # Features
//!
//! - Exact decimal pricing of both tokens
//! - Reserve band policy and transaction validation
//! - Mutex-guarded mint/redeem with atomic ledger settlement
//! - Status snapshots with mint/redeem limits
//!
//! # Example
//!
//! ```
//! use djed::{AccountId, Bank, BankConfig, MemoryLedger, Outcome, StaticOracle};
//! use rust_decimal::Decimal;
//!
//! // An empty bank needs a floor its first stable deposit can meet
//! let config = BankConfig {
//!     min_reserve_ratio: Decimal::ONE,
//!     ..BankConfig::default()
//! };
//! let oracle = StaticOracle::new().with_rate(
//!     config.peg_currency.clone(),
//!     config.base_asset.clone(),
//!     Decimal::TWO,
//! );
//! let bank = Bank::new(config, oracle, MemoryLedger::new())?;
//!
//! let outcome = bank.mint_or_redeem(&AccountId::new("alice"), Decimal::TEN, Decimal::ZERO)?;
//! assert!(matches!(outcome, Outcome::Accepted { .. }));
//! # Ok::<(), djed::Error>(())
//! ```

pub mod bank;
pub mod calculator;
pub mod ledger;
pub mod oracle;
pub mod policy;
pub mod settlement;
pub mod state;
pub mod validator;

pub use bank::*;
pub use calculator::{NominalPrices, PricingEngine};
pub use djed_core::{
    AccountId, BankConfig, BankState, CurrencyCode, Error, LedgerError, Money, OracleError,
    Rejection, Result, TokenKind, TransactionProposal,
};
pub use ledger::*;
pub use oracle::*;
pub use policy::*;
pub use settlement::build_settlement;
pub use state::*;
pub use validator::*;
