//! Per-screen review session
//!
//! Owns the selection and query state of one screen and bridges them to the
//! batch engine. The selection is never filtered when the query changes;
//! ids are resolved against the current view only when a bulk action starts.

use crate::config::DeskConfig;
use crate::error::Result;
use desk_batch::{BatchEngine, BatchKind, BatchOptions, BatchPlan, BatchRun};
use desk_collection::{
    AssetCollection, AssetFilter, PageRequest, ResultView, SortKey, ViewQuery, ViewScope,
};
use desk_model::{EligibilityClass, ItemId};
use desk_selection::{PageCheckState, SelectionModel, SelectionState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dashboard screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// Every asset
    #[default]
    AssetList,
    /// Assets awaiting a decision
    ApprovalQueue,
}

impl Screen {
    /// View scope shown by this screen
    #[inline]
    #[must_use]
    pub fn scope(self) -> ViewScope {
        match self {
            Self::AssetList => ViewScope::All,
            Self::ApprovalQueue => ViewScope::Pending,
        }
    }
}

/// Selection, query and bulk actions of one screen
pub struct ReviewSession {
    screen: Screen,
    collection: Arc<AssetCollection>,
    engine: Arc<BatchEngine>,
    selection: SelectionModel,
    query: ViewQuery,
    page_size: usize,
}

impl ReviewSession {
    /// Create new session on `screen`
    pub fn new(
        screen: Screen,
        collection: Arc<AssetCollection>,
        engine: Arc<BatchEngine>,
        config: &DeskConfig,
    ) -> Self {
        let page_size = config.page_size.max(1);
        Self {
            screen,
            collection,
            engine,
            selection: SelectionModel::new(),
            query: Self::default_query(screen, page_size),
            page_size,
        }
    }

    fn default_query(screen: Screen, page_size: usize) -> ViewQuery {
        ViewQuery {
            page: PageRequest::new(0, page_size),
            ..ViewQuery::for_scope(screen.scope())
        }
    }

    #[inline]
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[inline]
    #[must_use]
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Current selection snapshot
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Arc<BatchEngine> {
        &self.engine
    }

    /// Switch screens. Selection and query start over.
    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!(from = ?self.screen, to = ?screen, "navigate");
        self.screen = screen;
        self.selection.clear_selection();
        self.query = Self::default_query(screen, self.page_size);
    }

    /// Replace the filter and go back to the first page
    pub fn set_filter(&mut self, filter: AssetFilter) {
        self.query.filter = filter;
        self.query.page.index = 0;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
    }

    /// Jump to page `index` (clamped when the view is derived)
    pub fn set_page(&mut self, index: usize) {
        self.query.page.index = index;
    }

    /// Current result view
    #[must_use]
    pub fn view(&self) -> ResultView {
        self.collection.view(&self.query)
    }

    pub fn toggle(&mut self, id: impl Into<ItemId>) {
        self.selection.toggle(id.into());
    }

    pub fn select(&mut self, id: impl Into<ItemId>, selected: bool) {
        self.selection.select_id(id.into(), selected);
    }

    /// Header checkbox: select every row on the current page
    pub fn select_page(&mut self) {
        let view = self.view();
        self.selection.select_page(&view.page);
    }

    /// Header checkbox: deselect every row on the current page
    pub fn deselect_page(&mut self) {
        let view = self.view();
        self.selection.deselect_page(&view.page);
    }

    /// Select every row matching the current query, on all pages
    pub fn select_all_matching(&mut self) {
        self.selection.select_all_matching();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    #[must_use]
    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selection.is_selected(id)
    }

    /// Number of selected rows visible in the current view
    #[must_use]
    pub fn selection_count(&self) -> usize {
        self.selection.count_in(&self.view().matching)
    }

    /// Header checkbox state for the current page
    #[must_use]
    pub fn page_check_state(&self) -> PageCheckState {
        self.selection.page_check_state(&self.view().page)
    }

    /// Selected ids in view order
    #[must_use]
    pub fn resolved_ids(&self) -> Vec<ItemId> {
        self.selection.resolved_ids(&self.view().matching)
    }

    /// Observed lifecycle stage of one row
    #[must_use]
    pub fn status(&self, id: &ItemId) -> Option<EligibilityClass> {
        self.engine.status(id)
    }

    /// Preview a bulk action over the current selection
    ///
    /// # Errors
    /// Returns the precondition error the action would fail with.
    pub fn plan_bulk(&self, kind: BatchKind, opts: &BatchOptions) -> Result<BatchPlan> {
        Ok(self.engine.plan(&self.resolved_ids(), kind, opts)?)
    }

    /// Run a bulk action over the current selection.
    ///
    /// The selection is cleared once the run completes and kept when a
    /// precondition fails.
    ///
    /// # Errors
    /// Returns [`DeskError::Batch`](crate::DeskError::Batch) on a precondition failure.
    pub async fn run_bulk(&mut self, kind: BatchKind, opts: BatchOptions) -> Result<BatchRun> {
        let ids = self.resolved_ids();
        tracing::debug!(screen = ?self.screen, %kind, selected = ids.len(), "bulk action");

        let run = self.engine.run_batch(&ids, kind, opts).await?;
        self.selection.clear_selection();
        Ok(run)
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("screen", &self.screen)
            .field("query", &self.query)
            .field("selection", self.selection.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_test_utils::{ids, numbered_collection, CountingLedger, ScriptedOracle};
    use pretty_assertions::assert_eq;

    fn session(n: usize, page_size: usize) -> ReviewSession {
        let collection = numbered_collection(n);
        let engine = BatchEngine::for_collection(
            collection.clone(),
            Arc::new(CountingLedger::new(100)),
            Arc::new(ScriptedOracle::new()),
        );
        ReviewSession::new(
            Screen::AssetList,
            collection,
            Arc::new(engine),
            &DeskConfig::new().with_page_size(page_size),
        )
    }

    #[test]
    fn page_select_uses_current_page() {
        let mut session = session(7, 3);
        session.set_page(1);
        session.select_page();

        assert_eq!(session.resolved_ids(), ids(&["id4", "id5", "id6"]));
        assert_eq!(session.page_check_state(), PageCheckState::All);

        session.set_page(0);
        assert_eq!(session.page_check_state(), PageCheckState::None);
        assert_eq!(session.selection_count(), 3);
    }

    #[test]
    fn filter_change_keeps_selection() {
        let mut session = session(12, 25);
        session.select("id1", true);
        session.select("id11", true);

        session.set_filter(AssetFilter::any().with_search("Asset 011"));
        assert_eq!(session.resolved_ids(), ids(&["id11"]));
        assert_eq!(session.selection_count(), 1);

        session.set_filter(AssetFilter::any());
        assert_eq!(session.resolved_ids(), ids(&["id1", "id11"]));
    }

    #[test]
    fn navigate_resets_selection_and_query() {
        let mut session = session(4, 2);
        session.select_all_matching();
        session.set_sort(SortKey::TitleAsc);
        session.set_page(1);

        session.navigate(Screen::ApprovalQueue);
        assert_eq!(session.screen(), Screen::ApprovalQueue);
        assert_eq!(session.selection_count(), 0);
        assert_eq!(session.query().scope, ViewScope::Pending);
        assert_eq!(session.query().sort, SortKey::UpdatedDesc);
        assert_eq!(session.query().page, PageRequest::new(0, 2));
    }

    #[test]
    fn toggle_flips_membership() {
        let mut session = session(2, 25);
        session.toggle("id2");
        assert!(session.is_selected(&ItemId::new("id2")));
        session.toggle("id2");
        assert!(!session.is_selected(&ItemId::new("id2")));
    }
}
