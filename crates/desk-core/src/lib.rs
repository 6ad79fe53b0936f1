//! Review desk core
//!
//! Wires the selection model, the asset collection and the batch engine into
//! one [`ReviewSession`] per dashboard screen:
//! - [`ReviewSession`]: selection, query state, and bulk actions
//! - [`DeskConfig`]: TOML configuration
//! - [`DeskError`]: unified error type
//!
//! # Example
//!
//! ```rust,ignore
//! let mut session = ReviewSession::new(Screen::AssetList, collection, engine, &config);
//! session.select_all_matching();
//! session.select("asset-7", false);
//! let run = session.run_bulk(BatchKind::RunCheck, BatchOptions::default()).await?;
//! println!("{}", run.summary().headline());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod session;

pub use config::DeskConfig;
pub use error::{ConfigError, DeskError, Result};
pub use session::{ReviewSession, Screen};

/// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
