//! Selection state and operations

use desk_model::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which ids are selected, in one of two representational modes.
///
/// The enum guarantees mode exclusivity: only the active mode's set exists,
/// so switching modes always starts from an empty counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionState {
    /// Exactly these ids are selected
    Explicit { included: HashSet<ItemId> },
    /// Every id in the current view is selected except these
    AllExceptExplicit { excluded: HashSet<ItemId> },
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::Explicit {
            included: HashSet::new(),
        }
    }
}

/// Tri-state of the page header checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCheckState {
    None,
    Partial,
    All,
}

/// Selection owned by one screen session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    state: SelectionState,
}

impl SelectionModel {
    /// Create an empty explicit selection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// True when the global "select every matching item" mode is active
    #[inline]
    #[must_use]
    pub fn is_all_matching(&self) -> bool {
        matches!(self.state, SelectionState::AllExceptExplicit { .. })
    }

    /// Select or deselect one id.
    ///
    /// Ids outside the current view are accepted; they only take effect
    /// once they reappear in a view.
    pub fn select_id(&mut self, id: ItemId, selected: bool) {
        match &mut self.state {
            SelectionState::Explicit { included } => {
                if selected {
                    included.insert(id);
                } else {
                    included.remove(&id);
                }
            }
            SelectionState::AllExceptExplicit { excluded } => {
                if selected {
                    excluded.remove(&id);
                } else {
                    excluded.insert(id);
                }
            }
        }
    }

    /// Flip one id
    pub fn toggle(&mut self, id: ItemId) {
        let selected = self.is_selected(&id);
        self.select_id(id, !selected);
    }

    /// Page-scoped select-all: stays explicit and selects exactly the page
    pub fn select_page<'a>(&mut self, page: impl IntoIterator<Item = &'a ItemId>) {
        self.state = SelectionState::Explicit {
            included: page.into_iter().cloned().collect(),
        };
    }

    /// Deselect every id on the page, in either mode
    pub fn deselect_page<'a>(&mut self, page: impl IntoIterator<Item = &'a ItemId>) {
        for id in page {
            self.select_id(id.clone(), false);
        }
    }

    /// Global select-all: every matching item across all pages
    pub fn select_all_matching(&mut self) {
        self.state = SelectionState::AllExceptExplicit {
            excluded: HashSet::new(),
        };
    }

    /// Reset to an empty explicit selection
    pub fn clear_selection(&mut self) {
        self.state = SelectionState::default();
    }

    /// O(1) membership test respecting the current mode
    #[inline]
    #[must_use]
    pub fn is_selected(&self, id: &ItemId) -> bool {
        match &self.state {
            SelectionState::Explicit { included } => included.contains(id),
            SelectionState::AllExceptExplicit { excluded } => !excluded.contains(id),
        }
    }

    /// Selection count for a view of `result_view_len` ids.
    ///
    /// O(1). Exact as long as every stored id is present in the view;
    /// use [`Self::count_in`] when the view may have drifted.
    #[must_use]
    pub fn count(&self, result_view_len: usize) -> usize {
        match &self.state {
            SelectionState::Explicit { included } => included.len(),
            SelectionState::AllExceptExplicit { excluded } => {
                result_view_len.saturating_sub(excluded.len())
            }
        }
    }

    /// Exact selection count against a concrete view
    #[must_use]
    pub fn count_in(&self, result_view: &[ItemId]) -> usize {
        result_view.iter().filter(|id| self.is_selected(id)).count()
    }

    /// True when nothing in the view is selected
    #[must_use]
    pub fn is_empty_in(&self, result_view: &[ItemId]) -> bool {
        !result_view.iter().any(|id| self.is_selected(id))
    }

    /// Materialize the ids a bulk action should operate on, in view order.
    ///
    /// Stale explicit ids (no longer in the view) are dropped.
    #[must_use]
    pub fn resolved_ids(&self, result_view: &[ItemId]) -> Vec<ItemId> {
        result_view
            .iter()
            .filter(|id| self.is_selected(id))
            .cloned()
            .collect()
    }

    /// Header checkbox state for the current page
    #[must_use]
    pub fn page_check_state(&self, page: &[ItemId]) -> PageCheckState {
        let selected = self.count_in(page);
        if selected == 0 {
            PageCheckState::None
        } else if selected == page.len() {
            PageCheckState::All
        } else {
            PageCheckState::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: usize) -> Vec<ItemId> {
        (0..n).map(|i| ItemId::new(format!("id{i}"))).collect()
    }

    #[test]
    fn explicit_select_and_deselect() {
        let view = ids(5);
        let mut sel = SelectionModel::new();

        sel.select_id(view[1].clone(), true);
        sel.select_id(view[3].clone(), true);
        sel.select_id(view[3].clone(), true);
        assert_eq!(sel.count(view.len()), 2);

        sel.select_id(view[1].clone(), false);
        assert_eq!(sel.resolved_ids(&view), vec![view[3].clone()]);
    }

    #[test]
    fn all_except_deselect_adds_exclusion() {
        let view = ids(50);
        let mut sel = SelectionModel::new();
        sel.select_all_matching();
        sel.select_id(ItemId::new("id7"), false);

        let expected: HashSet<ItemId> = [ItemId::new("id7")].into_iter().collect();
        assert_eq!(
            sel.state(),
            &SelectionState::AllExceptExplicit { excluded: expected }
        );
        assert_eq!(sel.count(50), 49);
        assert!(!sel.resolved_ids(&view).contains(&ItemId::new("id7")));
    }

    #[test]
    fn all_except_reselect_removes_exclusion() {
        let mut sel = SelectionModel::new();
        sel.select_all_matching();
        sel.select_id(ItemId::new("a"), false);
        sel.select_id(ItemId::new("a"), true);
        assert_eq!(
            sel.state(),
            &SelectionState::AllExceptExplicit {
                excluded: HashSet::new()
            }
        );
    }

    #[test]
    fn select_page_stays_explicit() {
        let view = ids(30);
        let page = &view[10..20];
        let mut sel = SelectionModel::new();
        sel.select_id(view[0].clone(), true);

        sel.select_page(page);

        assert!(!sel.is_all_matching());
        assert_eq!(sel.resolved_ids(&view), page.to_vec());
        assert!(!sel.is_selected(&view[0]));
    }

    #[test]
    fn switching_modes_clears_counterpart() {
        let mut sel = SelectionModel::new();
        sel.select_id(ItemId::new("x"), true);
        sel.select_all_matching();
        assert_eq!(
            sel.state(),
            &SelectionState::AllExceptExplicit {
                excluded: HashSet::new()
            }
        );

        sel.select_id(ItemId::new("y"), false);
        sel.clear_selection();
        assert_eq!(sel.state(), &SelectionState::default());
    }

    #[test]
    fn stale_explicit_ids_are_dropped_on_resolve() {
        let view = ids(3);
        let mut sel = SelectionModel::new();
        sel.select_id(ItemId::new("gone"), true);
        sel.select_id(view[2].clone(), true);

        assert_eq!(sel.resolved_ids(&view), vec![view[2].clone()]);
        assert_eq!(sel.count_in(&view), 1);
    }

    #[test]
    fn excluded_id_does_not_rematerialize_when_it_reappears() {
        let full = ids(4);
        let narrowed = &full[..2];
        let mut sel = SelectionModel::new();
        sel.select_all_matching();
        sel.select_id(full[3].clone(), false);

        // Filter narrows, then widens again
        assert_eq!(sel.resolved_ids(narrowed).len(), 2);
        assert_eq!(sel.resolved_ids(&full), full[..3].to_vec());
    }

    #[test]
    fn resolved_ids_follow_view_order() {
        let mut view = ids(4);
        let mut sel = SelectionModel::new();
        sel.select_id(view[3].clone(), true);
        sel.select_id(view[0].clone(), true);

        view.reverse();
        assert_eq!(
            sel.resolved_ids(&view),
            vec![ItemId::new("id3"), ItemId::new("id0")]
        );
    }

    #[test]
    fn toggle_and_deselect_page() {
        let view = ids(6);
        let mut sel = SelectionModel::new();
        sel.select_all_matching();
        sel.toggle(view[0].clone());
        assert!(!sel.is_selected(&view[0]));
        sel.toggle(view[0].clone());
        assert!(sel.is_selected(&view[0]));

        sel.deselect_page(&view[..3]);
        assert_eq!(sel.count(view.len()), 3);
        assert!(sel.is_all_matching());
    }

    #[test]
    fn page_check_state_tristate() {
        let view = ids(4);
        let mut sel = SelectionModel::new();
        assert_eq!(sel.page_check_state(&view), PageCheckState::None);

        sel.select_id(view[1].clone(), true);
        assert_eq!(sel.page_check_state(&view), PageCheckState::Partial);

        sel.select_page(&view);
        assert_eq!(sel.page_check_state(&view), PageCheckState::All);
    }

    #[test]
    fn state_serializes_with_mode_tag() {
        let mut sel = SelectionModel::new();
        sel.select_all_matching();
        let json = serde_json::to_value(sel.state()).unwrap();
        assert_eq!(json["mode"], "all_except_explicit");
        assert!(json["excluded"].as_array().unwrap().is_empty());
    }
}
