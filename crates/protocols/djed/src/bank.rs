//! Djed Bank
//!
//! Owns the reserve and supply state and performs the only state transition:
//! a combined mint/redeem of both tokens against the base asset.
//!
//! # Important Notes
//!
//! - `mint_or_redeem` runs under the state lock from rate lookup to commit
//! - The ledger is written before the state is committed; a ledger failure
//!   leaves the state untouched
//! - Every accepted transaction is re-checked by the validator before commit

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use djed_core::{
    AccountId, BankConfig, BankState, Error, Money, OracleError, Rejection, Result, TokenKind,
    TransactionProposal,
};
use thiserror::Error as ThisError;

use crate::calculator::{add, PricingEngine};
use crate::ledger::Ledger;
use crate::oracle::ExchangeOracle;
use crate::policy::{reserve_violation, ReserveChange};
use crate::settlement::build_settlement;
use crate::state::BankStatus;
use crate::validator::{reserves_after, transaction_fault};

/// Single-leg bank actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAction {
    MintStable,
    RedeemStable,
    MintResidual,
    RedeemResidual,
}

/// Error returned when parsing a `BankAction` from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error(
    "invalid bank action (expected 'mint_stable', 'redeem_stable', 'mint_residual', or 'redeem_residual')"
)]
pub struct BankActionParseError;

impl FromStr for BankAction {
    type Err = BankActionParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mint_stable" => Ok(Self::MintStable),
            "redeem_stable" => Ok(Self::RedeemStable),
            "mint_residual" => Ok(Self::MintResidual),
            "redeem_residual" => Ok(Self::RedeemResidual),
            _ => Err(BankActionParseError),
        }
    }
}

impl fmt::Display for BankAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BankAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MintStable => "mint_stable",
            Self::RedeemStable => "redeem_stable",
            Self::MintResidual => "mint_residual",
            Self::RedeemResidual => "redeem_residual",
        }
    }

    pub fn token(&self) -> TokenKind {
        match self {
            Self::MintStable | Self::RedeemStable => TokenKind::Stable,
            Self::MintResidual | Self::RedeemResidual => TokenKind::Residual,
        }
    }

    /// Signed `(amount_stable, amount_residual)` for a positive token amount
    pub fn request(&self, amount: Money) -> Result<(Money, Money)> {
        if amount <= Money::ZERO {
            return Err(Error::InvalidAmount {
                message: format!("{} amount must be positive, got {}", self, amount),
            });
        }
        Ok(match self {
            Self::MintStable => (amount, Money::ZERO),
            Self::RedeemStable => (-amount, Money::ZERO),
            Self::MintResidual => (Money::ZERO, amount),
            Self::RedeemResidual => (Money::ZERO, -amount),
        })
    }
}

/// Result of a mint/redeem request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The transaction was (or would be) committed
    Accepted { amount_base: Money, fee: Money },
    /// The request was turned down; nothing changed
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Pure evaluation of a request against a state snapshot
enum Evaluation {
    Accepted {
        proposal: TransactionProposal,
        next: BankState,
    },
    Rejected(Rejection),
}

/// A two-token reserve bank
pub struct Bank<O, L> {
    config: BankConfig,
    oracle: O,
    ledger: L,
    state: Mutex<BankState>,
}

impl<O: ExchangeOracle, L: Ledger> Bank<O, L> {
    /// Create an empty bank
    pub fn new(config: BankConfig, oracle: O, ledger: L) -> Result<Self> {
        Self::with_state(config, oracle, ledger, BankState::default())
    }

    /// Restore a bank from a previously committed state
    pub fn with_state(config: BankConfig, oracle: O, ledger: L, state: BankState) -> Result<Self> {
        config.validate()?;
        if !state.is_well_formed() {
            return Err(Error::InvalidAmount {
                message: format!("negative quantity in initial state {:?}", state),
            });
        }

        tracing::info!(
            reserves = %state.reserves,
            stable_supply = %state.stable_supply,
            residual_supply = %state.residual_supply,
            "Bank initialized ({} backed by {})",
            config.stable_token,
            config.base_asset
        );

        Ok(Self {
            config,
            oracle,
            ledger,
            state: Mutex::new(state),
        })
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Copy of the committed state
    pub fn state(&self) -> Result<BankState> {
        Ok(*self.lock_state()?)
    }

    /// Base asset per unit of peg currency, as published by the oracle
    pub fn peg_rate(&self) -> Result<Money> {
        let from = &self.config.peg_currency;
        let to = &self.config.base_asset;
        let rate = self.oracle.conversion_rate(from, to)?;
        if rate < Money::ZERO {
            return Err(OracleError::InvalidRate {
                from: from.clone(),
                to: to.clone(),
                rate,
            }
            .into());
        }
        Ok(rate)
    }

    /// Derived status of the committed state
    pub fn status(&self) -> Result<BankStatus> {
        let state = self.state()?;
        let rate = self.peg_rate()?;
        BankStatus::from_state(&PricingEngine::new(&self.config, rate), &state)
    }

    /// Check a proposal against the committed state
    pub fn is_valid_transaction(&self, proposal: &TransactionProposal) -> Result<bool> {
        let state = self.state()?;
        let rate = self.peg_rate()?;
        let engine = PricingEngine::new(&self.config, rate);
        Ok(transaction_fault(&engine, &state, proposal)?.is_none())
    }

    /// Preview a request without committing it or touching the ledger
    pub fn quote(&self, amount_stable: Money, amount_residual: Money) -> Result<Outcome> {
        ensure_non_empty(amount_stable, amount_residual)?;
        let state = self.state()?;
        let rate = self.peg_rate()?;
        let engine = PricingEngine::new(&self.config, rate);

        Ok(match evaluate(&engine, &state, amount_stable, amount_residual)? {
            Evaluation::Accepted { proposal, .. } => Outcome::Accepted {
                amount_base: proposal.amount_base,
                fee: proposal.fee,
            },
            Evaluation::Rejected(rejection) => Outcome::Rejected(rejection),
        })
    }

    /// Mint and/or redeem both tokens for `counterparty`.
    ///
    /// Positive amounts mint, negative amounts redeem. On acceptance the
    /// settlement is recorded on the ledger and the new state committed as
    /// one unit; on rejection or error nothing changes.
    pub fn mint_or_redeem(
        &self,
        counterparty: &AccountId,
        amount_stable: Money,
        amount_residual: Money,
    ) -> Result<Outcome> {
        ensure_non_empty(amount_stable, amount_residual)?;

        let mut state = self.lock_state()?;
        let rate = self.peg_rate()?;
        let engine = PricingEngine::new(&self.config, rate);

        let (proposal, next) = match evaluate(&engine, &state, amount_stable, amount_residual)? {
            Evaluation::Accepted { proposal, next } => (proposal, next),
            Evaluation::Rejected(rejection) => {
                tracing::warn!(
                    counterparty = %counterparty,
                    amount_stable = %amount_stable,
                    amount_residual = %amount_residual,
                    "Request rejected: {}",
                    rejection
                );
                return Ok(Outcome::Rejected(rejection));
            }
        };

        let settlement = build_settlement(&self.config, counterparty, &proposal)?;
        if let Err(e) = self.ledger.record_transfers(settlement.transfers()) {
            tracing::warn!(counterparty = %counterparty, "Settlement not recorded: {}", e);
            return Err(e.into());
        }

        *state = next;

        tracing::info!(
            counterparty = %counterparty,
            amount_base = %proposal.amount_base,
            amount_stable = %amount_stable,
            amount_residual = %amount_residual,
            fee = %proposal.fee,
            reserves = %next.reserves,
            "Transaction committed"
        );

        Ok(Outcome::Accepted {
            amount_base: proposal.amount_base,
            fee: proposal.fee,
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, BankState>> {
        self.state.lock().map_err(|_| Error::StatePoisoned)
    }
}

fn ensure_non_empty(amount_stable: Money, amount_residual: Money) -> Result<()> {
    if amount_stable.is_zero() && amount_residual.is_zero() {
        return Err(Error::InvalidAmount {
            message: "nothing to mint or redeem".to_string(),
        });
    }
    Ok(())
}

/// Price, bound-check and self-validate a request against `state`
fn evaluate(
    engine: &PricingEngine<'_>,
    state: &BankState,
    amount_stable: Money,
    amount_residual: Money,
) -> Result<Evaluation> {
    let stable_supply = add(state.stable_supply, amount_stable, "new stable supply")?;
    if stable_supply < Money::ZERO {
        return Ok(Evaluation::Rejected(Rejection::InsufficientSupply {
            token: TokenKind::Stable,
            requested: -amount_stable,
            available: state.stable_supply,
        }));
    }

    let residual_supply = add(state.residual_supply, amount_residual, "new residual supply")?;
    if residual_supply < Money::ZERO {
        return Ok(Evaluation::Rejected(Rejection::InsufficientSupply {
            token: TokenKind::Residual,
            requested: -amount_residual,
            available: state.residual_supply,
        }));
    }

    let proposal = engine.price_transaction(state, amount_stable, amount_residual)?;
    let reserves = reserves_after(state, &proposal)?;

    tracing::debug!(
        amount_base = %proposal.amount_base,
        fee = %proposal.fee,
        new_reserves = %reserves,
        "Priced request"
    );

    let change = ReserveChange::from_amounts(amount_stable, amount_residual);
    if let Some(rejection) = reserve_violation(engine, change, reserves, stable_supply)? {
        return Ok(Evaluation::Rejected(rejection));
    }

    if reserves < Money::ZERO {
        return Err(Error::invariant(format!(
            "reserves would become negative ({})",
            reserves
        )));
    }

    if let Some(fault) = transaction_fault(engine, state, &proposal)? {
        return Err(Error::invariant(format!(
            "computed transaction fails validation: {}",
            fault
        )));
    }

    Ok(Evaluation::Accepted {
        proposal,
        next: BankState::new(reserves, stable_supply, residual_supply),
    })
}
