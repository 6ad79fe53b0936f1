//! Batch action engine
//!
//! Executes bulk review actions (run checks, approve, reject) over a resolved
//! list of item ids.
//!
//! # Guarantees
//!
//! - Preconditions are checked before any side effect. A check batch that needs
//!   more credits than the ledger holds is rejected whole.
//! - Items are processed one at a time, in input order.
//! - A per-item failure never aborts the run; every target ends up in exactly
//!   one of `succeeded`, `failed` or `skipped`.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = BatchEngine::for_collection(collection, ledger, oracle);
//! let run = engine
//!     .run_batch(&ids, BatchKind::RunCheck, BatchOptions::default())
//!     .await?;
//! println!("{}", run.summary());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod engine;
mod error;
mod oracle;
mod plan;
mod run;

pub use config::EngineConfig;
pub use engine::{BatchEngine, BatchOptions};
pub use error::{BatchError, FailureReason, SkipReason};
pub use oracle::{OracleError, ScoringOracle};
pub use plan::BatchPlan;
pub use run::{BatchKind, BatchProgress, BatchRun, BatchSummary, ItemFailure, ItemSkip};

/// Re-exported so callers can build [`BatchOptions`] without a direct dependency
pub use tokio_util::sync::CancellationToken;
