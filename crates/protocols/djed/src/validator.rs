//! Transaction Validator
//!
//! Cross-checks a proposed transaction against the engine's own pricing.
//! Every check uses nominal prices of the committed state before the
//! transaction, never the state it would produce.

use djed_core::{BankState, Money, Rejection, Result, TransactionProposal};
use thiserror::Error;

use crate::calculator::{add, mul, sub, PricingEngine};
use crate::policy::{reserve_violation, ReserveChange};

/// First inconsistency found in a proposal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionFault {
    #[error("Reserve band violated: {0}")]
    Insolvent(Rejection),

    #[error("Base amount does not offset token value (imbalance {imbalance})")]
    PriceMismatch { imbalance: Money },

    #[error("Fee {actual} does not match expected {expected}")]
    FeeMismatch { expected: Money, actual: Money },
}

/// Reserves after applying a proposal: the counterparty's withdrawal leaves,
/// the fee stays.
pub fn reserves_after(state: &BankState, proposal: &TransactionProposal) -> Result<Money> {
    let withdrawn = sub(state.reserves, proposal.amount_base, "new reserves")?;
    add(withdrawn, proposal.fee, "new reserves")
}

/// Find the first rule the proposal breaks
pub fn transaction_fault(
    engine: &PricingEngine<'_>,
    state: &BankState,
    proposal: &TransactionProposal,
) -> Result<Option<TransactionFault>> {
    let change = ReserveChange::from_amounts(proposal.amount_stable, proposal.amount_residual);
    let new_reserves = reserves_after(state, proposal)?;
    let new_stable_supply = add(state.stable_supply, proposal.amount_stable, "new stable supply")?;
    if let Some(rejection) = reserve_violation(engine, change, new_reserves, new_stable_supply)? {
        return Ok(Some(TransactionFault::Insolvent(rejection)));
    }

    let prices = engine.prices(state)?;
    let stable_value = mul(proposal.amount_stable, prices.stable, "stable leg")?;
    let residual_value = mul(proposal.amount_residual, prices.residual, "residual leg")?;
    let token_value = add(stable_value, residual_value, "token value")?;
    let imbalance = add(token_value, proposal.amount_base, "imbalance")?;
    if !imbalance.is_zero() {
        return Ok(Some(TransactionFault::PriceMismatch { imbalance }));
    }

    let expected = engine.fee_on(stable_value, residual_value)?;
    if expected != proposal.fee {
        return Ok(Some(TransactionFault::FeeMismatch {
            expected,
            actual: proposal.fee,
        }));
    }

    Ok(None)
}

/// Whether amounts, prices and fee are mutually consistent and solvent
pub fn is_valid_transaction(
    engine: &PricingEngine<'_>,
    state: &BankState,
    proposal: &TransactionProposal,
) -> Result<bool> {
    Ok(transaction_fault(engine, state, proposal)?.is_none())
}
