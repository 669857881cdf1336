//! Settlement Ledger
//!
//! Durable record of the transfers behind every accepted transaction.
//! The bank hands transfers over once and never retries.

use std::fmt;
use std::sync::{Arc, Mutex};

use djed_core::{AccountId, CurrencyCode, LedgerError, Money};
use serde::{Deserialize, Serialize};

/// One side of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Bank,
    Account(AccountId),
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Account(id) => write!(f, "{}", id),
        }
    }
}

/// A single movement of base asset or tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Party,
    pub to: Party,
    /// Always positive
    pub amount: Money,
    pub currency: CurrencyCode,
}

/// All transfers settling one accepted transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub transfers: Vec<Transfer>,
}

impl SettlementRecord {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Durable sink for settled transfers
pub trait Ledger: Send + Sync {
    /// Record transfers atomically; once this returns `Ok` they are durable
    fn record_transfers(&self, transfers: &[Transfer]) -> Result<(), LedgerError>;
}

impl<T: Ledger + ?Sized> Ledger for Arc<T> {
    fn record_transfers(&self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        (**self).record_transfers(transfers)
    }
}

/// In-memory journal of recorded transfers
#[derive(Debug, Default)]
pub struct MemoryLedger {
    journal: Mutex<Vec<Transfer>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every transfer recorded so far, oldest first
    pub fn transfers(&self) -> Vec<Transfer> {
        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.journal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for MemoryLedger {
    fn record_transfers(&self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        if let Some(bad) = transfers.iter().find(|t| t.amount <= Money::ZERO) {
            return Err(LedgerError::RecordFailed {
                message: format!("non-positive amount {} {}", bad.amount, bad.currency),
            });
        }

        let mut journal = self
            .journal
            .lock()
            .map_err(|_| LedgerError::RecordFailed {
                message: "journal lock poisoned".to_string(),
            })?;
        journal.extend_from_slice(transfers);
        Ok(())
    }
}
