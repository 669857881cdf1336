//! Exchange Rate Oracle
//!
//! The bank only reads rates; publishing them is someone else's job.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use djed_core::{CurrencyCode, Money, OracleError};

/// Source of conversion rates between two currencies
pub trait ExchangeOracle: Send + Sync {
    /// Units of `to` per one unit of `from`
    fn conversion_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Money, OracleError>;
}

impl<T: ExchangeOracle + ?Sized> ExchangeOracle for &T {
    fn conversion_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Money, OracleError> {
        (**self).conversion_rate(from, to)
    }
}

impl<T: ExchangeOracle + ?Sized> ExchangeOracle for Arc<T> {
    fn conversion_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Money, OracleError> {
        (**self).conversion_rate(from, to)
    }
}

/// In-memory rate table, safe to share between banks
#[derive(Debug, Default)]
pub struct StaticOracle {
    rates: RwLock<HashMap<(CurrencyCode, CurrencyCode), Money>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style rate publication
    pub fn with_rate(self, from: CurrencyCode, to: CurrencyCode, rate: Money) -> Self {
        self.set_rate(from, to, rate);
        self
    }

    /// Publish or replace the rate for an ordered pair
    pub fn set_rate(&self, from: CurrencyCode, to: CurrencyCode, rate: Money) {
        let mut rates = self.rates.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        rates.insert((from, to), rate);
    }

    /// Withdraw the rate for an ordered pair
    pub fn clear_rate(&self, from: &CurrencyCode, to: &CurrencyCode) {
        let mut rates = self.rates.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        rates.remove(&(from.clone(), to.clone()));
    }
}

impl ExchangeOracle for StaticOracle {
    fn conversion_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Result<Money, OracleError> {
        let rates = self.rates.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| OracleError::RateUnavailable {
                from: from.clone(),
                to: to.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    fn erg() -> CurrencyCode {
        CurrencyCode::new("ERG")
    }

    #[test]
    fn test_published_rate() {
        let oracle = StaticOracle::new().with_rate(usd(), erg(), dec!(1.851851851));
        assert_eq!(oracle.conversion_rate(&usd(), &erg()).unwrap(), dec!(1.851851851));
    }

    #[test]
    fn test_pairs_are_ordered() {
        let oracle = StaticOracle::new().with_rate(usd(), erg(), dec!(2));
        let err = oracle.conversion_rate(&erg(), &usd()).unwrap_err();
        assert!(matches!(err, OracleError::RateUnavailable { .. }));
    }

    #[test]
    fn test_rate_update_and_withdrawal() {
        let oracle = Arc::new(StaticOracle::new().with_rate(usd(), erg(), dec!(2)));
        oracle.set_rate(usd(), erg(), dec!(3));
        assert_eq!(oracle.conversion_rate(&usd(), &erg()).unwrap(), dec!(3));

        oracle.clear_rate(&usd(), &erg());
        assert!(oracle.conversion_rate(&usd(), &erg()).is_err());
    }
}
