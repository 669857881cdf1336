//! Settlement Builder
//!
//! Turns an accepted transaction into the transfers the ledger must record.
//!
//! # Transfer rules
//!
//! - Base asset moves once, net of the fee: `fee - amount_base` flows into the bank
//! - Minted tokens flow from the bank to the counterparty
//! - Redeemed tokens flow from the counterparty back to the bank
//! - Zero legs produce no transfer

use djed_core::{AccountId, BankConfig, CurrencyCode, Money, Result, TransactionProposal};

use crate::calculator::sub;
use crate::ledger::{Party, SettlementRecord, Transfer};

/// Build the settlement record for an accepted transaction
pub fn build_settlement(
    config: &BankConfig,
    counterparty: &AccountId,
    proposal: &TransactionProposal,
) -> Result<SettlementRecord> {
    let mut transfers = Vec::with_capacity(3);
    let account = Party::Account(counterparty.clone());

    let into_bank = sub(proposal.fee, proposal.amount_base, "base settlement")?;
    push_leg(&mut transfers, &account, into_bank, &config.base_asset);

    // Tokens move the opposite way to base asset: a mint pays the counterparty
    push_leg(
        &mut transfers,
        &account,
        -proposal.amount_stable,
        &config.stable_token,
    );
    push_leg(
        &mut transfers,
        &account,
        -proposal.amount_residual,
        &config.residual_token,
    );

    Ok(SettlementRecord { transfers })
}

/// Push a transfer for a signed flow into the bank (negative flows out)
fn push_leg(
    transfers: &mut Vec<Transfer>,
    account: &Party,
    into_bank: Money,
    currency: &CurrencyCode,
) {
    if into_bank.is_zero() {
        return;
    }

    let (from, to) = if into_bank > Money::ZERO {
        (account.clone(), Party::Bank)
    } else {
        (Party::Bank, account.clone())
    };

    transfers.push(Transfer {
        from,
        to,
        amount: into_bank.abs(),
        currency: currency.clone(),
    });
}
