//! Result view derivation (filter, sort, paginate)

use crate::asset::{Asset, MediaKind};
use desk_model::{ItemId, ReviewStatus};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

/// Which rows a screen shows before any filter applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewScope {
    /// Asset list: every row
    #[default]
    All,
    /// Approval queue: rows awaiting a reviewer decision
    Pending,
}

/// User-controlled filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetFilter {
    /// Restrict to these reviewer statuses
    pub statuses: Option<Vec<ReviewStatus>>,
    pub kind: Option<MediaKind>,
    /// Case-insensitive title substring
    pub search: Option<String>,
    /// Only rows without check results
    pub needs_check_only: bool,
}

impl AssetFilter {
    /// Match every row
    #[inline]
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// With status restriction
    #[inline]
    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<ReviewStatus>) -> Self {
        self.statuses = Some(statuses);
        self
    }

    /// With media kind restriction
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: MediaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// With title search
    #[inline]
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Only unchecked rows
    #[inline]
    #[must_use]
    pub fn needs_check_only(mut self) -> Self {
        self.needs_check_only = true;
        self
    }

    fn matches(&self, asset: &Asset) -> bool {
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&asset.status) {
                return false;
            }
        }
        if self.kind.is_some_and(|kind| kind != asset.kind) {
            return false;
        }
        if self.needs_check_only && asset.review.is_some() {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => asset
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}

/// Sort order; ties always break on id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently updated first
    #[default]
    UpdatedDesc,
    TitleAsc,
    /// Highest score first, unchecked rows last
    ScoreDesc,
}

impl SortKey {
    fn compare(self, a: &Asset, b: &Asset) -> Ordering {
        let primary = match self {
            SortKey::UpdatedDesc => b.updated_at.cmp(&a.updated_at),
            SortKey::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::ScoreDesc => {
                let key = |asset: &Asset| asset.score().map(Reverse);
                match (key(a), key(b)) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: usize,
    pub size: usize,
}

impl PageRequest {
    /// Default rows per page
    pub const DEFAULT_SIZE: usize = 25;

    /// Create page request
    #[inline]
    #[must_use]
    pub fn new(index: usize, size: usize) -> Self {
        Self { index, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// Full query state of one screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub scope: ViewScope,
    pub filter: AssetFilter,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl ViewQuery {
    /// Default query for a scope
    #[inline]
    #[must_use]
    pub fn for_scope(scope: ViewScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }
}

/// Filtered, sorted and paginated projection of the collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    /// Every matching id across all pages, in sort order
    pub matching: Vec<ItemId>,
    /// Ids on the current page
    pub page: Vec<ItemId>,
    /// Current page after clamping
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
}

impl ResultView {
    /// Number of matching ids across all pages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matching.len()
    }

    /// True when nothing matches
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matching.is_empty()
    }
}

pub(crate) fn derive<'a>(rows: impl Iterator<Item = &'a Asset>, query: &ViewQuery) -> ResultView {
    let mut matching: Vec<&Asset> = rows
        .filter(|asset| match query.scope {
            ViewScope::All => true,
            ViewScope::Pending => asset.eligibility().is_pending(),
        })
        .filter(|asset| query.filter.matches(asset))
        .collect();
    matching.sort_by(|a, b| query.sort.compare(a, b));

    let matching: Vec<ItemId> = matching.into_iter().map(|a| a.id.clone()).collect();

    let page_size = query.page.size.max(1);
    let page_count = matching.len().div_ceil(page_size);
    let page_index = query.page.index.min(page_count.saturating_sub(1));
    let start = page_index * page_size;
    let end = (start + page_size).min(matching.len());
    let page = matching.get(start..end).map(<[ItemId]>::to_vec).unwrap_or_default();

    ResultView {
        matching,
        page,
        page_index,
        page_size,
        page_count,
    }
}
