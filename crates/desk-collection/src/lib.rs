//! Asset collection
//!
//! The canonical in-memory collection behind both review screens:
//! - [`Asset`]: one reviewable row
//! - [`VersionGroup`]: nested versions of one creative, each a row of its own
//! - [`AssetCollection`]: owns both containers and derives [`ResultView`]s
//! - [`RowMutationSink`]: the only write path, resolving ids across containers
//! - [`EligibilitySource`]: read path used for batch classification
//!
//! The collection is injected wherever it is needed (`Arc<AssetCollection>`);
//! views are recomputed on demand from current state.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod asset;
mod error;
mod sink;
mod store;
mod view;

pub use asset::{Asset, MediaKind, VersionGroup};
pub use error::{CollectionError, SinkError};
pub use sink::{EligibilitySource, RowMutationSink};
pub use store::{AssetCollection, ClassCounts, RowLocation};
pub use view::{AssetFilter, PageRequest, ResultView, SortKey, ViewQuery, ViewScope};
