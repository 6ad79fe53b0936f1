//! Selection model for large, filtered, paginated result views
//!
//! A [`SelectionModel`] never copies the result view it is evaluated against.
//! It stores ids only and is resolved against whatever view is current, so the
//! selection survives filter changes, re-sorts and collection mutations:
//!
//! - [`SelectionState::Explicit`]: exactly the listed ids are selected
//! - [`SelectionState::AllExceptExplicit`]: everything in the view except the listed ids
//!
//! # Example
//!
//! ```rust
//! use desk_model::ItemId;
//! use desk_selection::SelectionModel;
//!
//! let view: Vec<ItemId> = (0..50).map(|i| ItemId::new(format!("id{i}"))).collect();
//!
//! let mut selection = SelectionModel::new();
//! selection.select_all_matching();
//! selection.select_id(ItemId::new("id7"), false);
//!
//! assert_eq!(selection.count(view.len()), 49);
//! assert_eq!(selection.resolved_ids(&view).len(), 49);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod model;

pub use model::{PageCheckState, SelectionModel, SelectionState};
