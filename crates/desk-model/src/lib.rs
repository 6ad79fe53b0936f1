//! Review Desk shared model
//!
//! Types every other desk crate agrees on:
//! - [`ItemId`]: opaque row identifier
//! - [`EligibilityClass`]: per-item review lifecycle stage
//! - [`ReviewData`]: scoring oracle output
//! - [`RowPatch`]: a single write applied back onto the collection
//!
//! # Example
//!
//! ```rust
//! use desk_model::{EligibilityClass, ItemId};
//!
//! let id = ItemId::new("asset-17");
//! assert_eq!(id.as_str(), "asset-17");
//! assert!(EligibilityClass::NeedsCheck
//!     .validate_transition(EligibilityClass::Checking)
//!     .is_ok());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod eligibility;
mod id;
mod review;

pub use eligibility::{EligibilityClass, TransitionError};
pub use id::ItemId;
pub use review::{Finding, ReviewData, ReviewStatus, RowPatch, Severity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
