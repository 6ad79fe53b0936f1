//! Resource ledger
//!
//! A finite pool of consumable permits (credits). Each quality check burns
//! exactly one credit. The ledger is the only mutable resource shared across
//! batch runs, so every implementation must tolerate concurrent consumers.
//!
//! # Example
//!
//! ```rust
//! use desk_ledger::{CreditLedger, LedgerError, ResourceLedger};
//!
//! let ledger = CreditLedger::new(1);
//! assert!(ledger.consume_one().is_ok());
//! assert_eq!(ledger.consume_one(), Err(LedgerError::Exhausted));
//! assert_eq!(ledger.available(), 0);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod credit;

pub use credit::CreditLedger;

/// Ledger errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No credit left to consume
    #[error("credit balance exhausted")]
    Exhausted,
}

/// Finite counting resource consumed one unit at a time.
///
/// `consume_one` must be atomic with respect to `available`: the balance can
/// never go negative, even under concurrent callers.
pub trait ResourceLedger: Send + Sync {
    /// Credits currently available
    fn available(&self) -> u64;

    /// Consume a single credit
    ///
    /// # Errors
    /// Returns [`LedgerError::Exhausted`] if the balance is zero.
    fn consume_one(&self) -> Result<(), LedgerError>;
}
