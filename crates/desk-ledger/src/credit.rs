//! In-memory atomic credit ledger

use crate::{LedgerError, ResourceLedger};
use std::sync::atomic::{AtomicU64, Ordering};

/// Credit balance backed by a single atomic counter
#[derive(Debug, Default)]
pub struct CreditLedger {
    balance: AtomicU64,
}

impl CreditLedger {
    /// Create a ledger holding `balance` credits
    #[inline]
    #[must_use]
    pub fn new(balance: u64) -> Self {
        Self {
            balance: AtomicU64::new(balance),
        }
    }

    /// Add credits to the balance, returning the new balance
    pub fn replenish(&self, credits: u64) -> u64 {
        let mut current = self.balance.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(credits);
            match self.balance.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::debug!(credits, balance = next, "ledger replenished");
                    return next;
                }
                Err(observed) => current = observed,
            }
        }
    }
}

impl ResourceLedger for CreditLedger {
    fn available(&self) -> u64 {
        self.balance.load(Ordering::Acquire)
    }

    fn consume_one(&self) -> Result<(), LedgerError> {
        let mut current = self.balance.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return Err(LedgerError::Exhausted);
            }
            match self.balance.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }
}
