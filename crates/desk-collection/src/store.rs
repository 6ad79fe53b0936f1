//! Asset collection store
//!
//! Two containers back one logical collection: standalone assets and nested
//! version groups. Every lookup goes through [`Inner::row`] / [`Inner::row_mut`],
//! which try the standalone container first and the version index second, so
//! callers never need to know where an id lives.

use crate::asset::{Asset, VersionGroup};
use crate::error::{CollectionError, SinkError};
use crate::view::{self, ResultView, ViewQuery};
use desk_model::{EligibilityClass, ItemId, RowPatch};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where an id resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLocation {
    Standalone,
    Version { group: String },
}

/// Row counts per lifecycle stage (tab badges)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub needs_check: usize,
    pub checked: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ClassCounts {
    /// Rows still awaiting a reviewer decision
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.needs_check + self.checked
    }

    /// All rows
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.pending() + self.approved + self.rejected
    }
}

#[derive(Debug, Default)]
struct Inner {
    standalone: IndexMap<ItemId, Asset>,
    groups: IndexMap<String, VersionGroup>,
    /// version id -> (group index, version index)
    versions: HashMap<ItemId, (usize, usize)>,
}

impl Inner {
    fn contains(&self, id: &ItemId) -> bool {
        self.standalone.contains_key(id) || self.versions.contains_key(id)
    }

    fn row(&self, id: &ItemId) -> Option<&Asset> {
        if let Some(asset) = self.standalone.get(id) {
            return Some(asset);
        }
        let &(group, version) = self.versions.get(id)?;
        self.groups
            .get_index(group)
            .and_then(|(_, g)| g.versions.get(version))
    }

    fn row_mut(&mut self, id: &ItemId) -> Option<&mut Asset> {
        if self.standalone.contains_key(id) {
            return self.standalone.get_mut(id);
        }
        let &(group, version) = self.versions.get(id)?;
        self.groups
            .get_index_mut(group)
            .and_then(|(_, g)| g.versions.get_mut(version))
    }

    fn rows(&self) -> impl Iterator<Item = &Asset> {
        self.standalone
            .values()
            .chain(self.groups.values().flat_map(|g| g.versions.iter()))
    }
}

/// Canonical in-memory collection shared by both review screens
#[derive(Debug, Default)]
pub struct AssetCollection {
    inner: RwLock<Inner>,
}

impl AssetCollection {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from standalone assets and version groups
    ///
    /// # Errors
    /// Returns [`CollectionError`] on duplicate ids or group names.
    pub fn from_parts(
        assets: impl IntoIterator<Item = Asset>,
        groups: impl IntoIterator<Item = VersionGroup>,
    ) -> Result<Self, CollectionError> {
        let collection = Self::new();
        for asset in assets {
            collection.insert_asset(asset)?;
        }
        for group in groups {
            collection.insert_group(group)?;
        }
        Ok(collection)
    }

    /// Insert a standalone asset
    ///
    /// # Errors
    /// Returns [`CollectionError::DuplicateId`] if the id exists in either container.
    pub fn insert_asset(&self, asset: Asset) -> Result<(), CollectionError> {
        let mut inner = self.inner.write();
        if inner.contains(&asset.id) {
            return Err(CollectionError::DuplicateId(asset.id));
        }
        inner.standalone.insert(asset.id.clone(), asset);
        Ok(())
    }

    /// Insert a version group
    ///
    /// # Errors
    /// Returns [`CollectionError`] if the group name or any version id is taken.
    pub fn insert_group(&self, group: VersionGroup) -> Result<(), CollectionError> {
        let mut inner = self.inner.write();
        if inner.groups.contains_key(&group.name) {
            return Err(CollectionError::DuplicateGroup(group.name));
        }

        let mut seen = std::collections::HashSet::new();
        for version in &group.versions {
            if inner.contains(&version.id) || !seen.insert(&version.id) {
                return Err(CollectionError::DuplicateId(version.id.clone()));
            }
        }

        let group_index = inner.groups.len();
        for (version_index, version) in group.versions.iter().enumerate() {
            inner
                .versions
                .insert(version.id.clone(), (group_index, version_index));
        }
        inner.groups.insert(group.name.clone(), group);
        Ok(())
    }

    /// Snapshot of one row
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<Asset> {
        self.inner.read().row(id).cloned()
    }

    /// Which container an id lives in
    #[must_use]
    pub fn locate(&self, id: &ItemId) -> Option<RowLocation> {
        let inner = self.inner.read();
        if inner.standalone.contains_key(id) {
            return Some(RowLocation::Standalone);
        }
        let &(group, _) = inner.versions.get(id)?;
        inner.groups.get_index(group).map(|(name, _)| RowLocation::Version {
            group: name.clone(),
        })
    }

    /// Derived lifecycle stage of one row
    #[must_use]
    pub fn class_of(&self, id: &ItemId) -> Option<EligibilityClass> {
        self.inner.read().row(id).map(Asset::eligibility)
    }

    /// Whether one row carries check results
    #[must_use]
    pub fn is_reviewed(&self, id: &ItemId) -> Option<bool> {
        self.inner.read().row(id).map(|a| a.review.is_some())
    }

    /// Number of rows across both containers
    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        inner.standalone.len() + inner.versions.len()
    }

    /// True when both containers are empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row counts per lifecycle stage
    #[must_use]
    pub fn counts(&self) -> ClassCounts {
        let inner = self.inner.read();
        inner
            .rows()
            .fold(ClassCounts::default(), |mut counts, asset| {
                match asset.eligibility() {
                    EligibilityClass::NeedsCheck | EligibilityClass::Checking => {
                        counts.needs_check += 1;
                    }
                    EligibilityClass::Checked => counts.checked += 1,
                    EligibilityClass::Approved => counts.approved += 1,
                    EligibilityClass::Rejected => counts.rejected += 1,
                }
                counts
            })
    }

    /// Derive the current result view for a query
    #[must_use]
    pub fn view(&self, query: &ViewQuery) -> ResultView {
        let inner = self.inner.read();
        view::derive(inner.rows(), query)
    }

    /// Resolve `id` across both containers and apply `patch` under one write lock
    ///
    /// # Errors
    /// - [`SinkError::NotFound`] if the id resolves in neither container
    /// - [`SinkError::Conflict`] if the patch does not fit the row's state
    pub fn apply_patch(&self, id: &ItemId, patch: RowPatch) -> Result<(), SinkError> {
        let name = patch.name();
        let mut inner = self.inner.write();
        let row = inner
            .row_mut(id)
            .ok_or_else(|| SinkError::NotFound(id.clone()))?;

        row.apply_patch(patch)
            .map_err(|detail| SinkError::conflict(id.clone(), detail))?;

        tracing::debug!(item = %id, patch = name, "row patched");
        Ok(())
    }
}
