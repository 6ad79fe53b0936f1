//! Testing utilities for the review desk workspace
//!
//! Shared fakes, fixtures, and helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use desk_batch::{BatchEngine, CancellationToken, OracleError, ScoringOracle};
use desk_collection::{Asset, AssetCollection, MediaKind, RowMutationSink, SinkError};
use desk_ledger::{CreditLedger, LedgerError, ResourceLedger};
use desk_model::{EligibilityClass, Finding, ItemId, ReviewData, ReviewStatus, RowPatch, Severity};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn id(raw: &str) -> ItemId {
    ItemId::new(raw)
}

pub fn ids(raw: &[&str]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId::new).collect()
}

/// Oracle with scripted failures, optional latency, and a call log
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    fail_on: HashSet<ItemId>,
    delay: Option<Duration>,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Mutex<Vec<ItemId>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail scoring for `raw`
    pub fn fail_on(mut self, raw: &str) -> Self {
        self.fail_on.insert(id(raw));
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancel `token` once `calls` items have been scored
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Ids scored so far, in call order
    pub fn calls(&self) -> Vec<ItemId> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ScoringOracle for ScriptedOracle {
    async fn score(&self, id: &ItemId) -> Result<ReviewData, OracleError> {
        let made = {
            let mut calls = self.calls.lock();
            calls.push(id.clone());
            calls.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((after, token)) = &self.cancel_after {
            if made >= *after {
                token.cancel();
            }
        }

        if self.fail_on.contains(id) {
            return Err(OracleError::Unavailable(format!("no score for {id}")));
        }
        Ok(ReviewData::new(
            75,
            vec![Finding::new(Severity::Info, "logo present")],
        ))
    }
}

/// Sink wrapper that logs every `apply` call before forwarding it, with
/// scripted conflicts and an optional cancel trigger
pub struct RecordingSink {
    inner: Arc<dyn RowMutationSink>,
    conflict_on: HashSet<ItemId>,
    cancel_after: Option<(usize, CancellationToken)>,
    applied: Mutex<Vec<(ItemId, &'static str)>>,
}

impl RecordingSink {
    pub fn new(inner: Arc<dyn RowMutationSink>) -> Self {
        Self {
            inner,
            conflict_on: HashSet::new(),
            cancel_after: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Answer `apply` for `raw` with a conflict instead of forwarding
    pub fn conflict_on(mut self, raw: &str) -> Self {
        self.conflict_on.insert(id(raw));
        self
    }

    /// Cancel `token` once `calls` patches have been applied
    pub fn cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Ids passed to `apply`, in call order
    pub fn applied_ids(&self) -> Vec<ItemId> {
        self.applied.lock().iter().map(|(id, _)| id.clone()).collect()
    }

    /// Patch names passed to `apply`, in call order
    pub fn applied_ops(&self) -> Vec<&'static str> {
        self.applied.lock().iter().map(|(_, op)| *op).collect()
    }
}

#[async_trait]
impl RowMutationSink for RecordingSink {
    async fn apply(&self, id: &ItemId, patch: RowPatch) -> Result<(), SinkError> {
        let made = {
            let mut applied = self.applied.lock();
            applied.push((id.clone(), patch.name()));
            applied.len()
        };

        let result = if self.conflict_on.contains(id) {
            Err(SinkError::conflict(id.clone(), "row changed underneath"))
        } else {
            self.inner.apply(id, patch).await
        };

        if let Some((after, token)) = &self.cancel_after {
            if made >= *after {
                token.cancel();
            }
        }
        result
    }
}

/// Credit ledger that counts `consume_one` calls and can simulate a
/// concurrent session draining the balance
#[derive(Debug)]
pub struct CountingLedger {
    inner: CreditLedger,
    consume_calls: AtomicUsize,
    drain_after: Option<usize>,
}

impl CountingLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            inner: CreditLedger::new(balance),
            consume_calls: AtomicUsize::new(0),
            drain_after: None,
        }
    }

    /// Drain the remaining balance right after the `k`-th successful consume
    pub fn steal_after(mut self, k: usize) -> Self {
        self.drain_after = Some(k);
        self
    }

    pub fn consume_calls(&self) -> usize {
        self.consume_calls.load(Ordering::SeqCst)
    }
}

impl ResourceLedger for CountingLedger {
    fn available(&self) -> u64 {
        self.inner.available()
    }

    fn consume_one(&self) -> Result<(), LedgerError> {
        let call = self.consume_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.consume_one()?;
        if self.drain_after == Some(call) {
            while self.inner.consume_one().is_ok() {}
        }
        Ok(())
    }
}

/// Build an asset whose derived eligibility is `class`.
///
/// `Checking` is an engine overlay, so it maps to an unchecked asset.
pub fn asset_in(raw: &str, class: EligibilityClass) -> Asset {
    let asset = Asset::new(raw, format!("Asset {raw}"), MediaKind::Image);
    let review = || ReviewData::new(60, vec![]);
    match class {
        EligibilityClass::NeedsCheck | EligibilityClass::Checking => asset,
        EligibilityClass::Checked => asset.with_review(review()),
        EligibilityClass::Approved => asset
            .with_review(review())
            .with_status(ReviewStatus::Approved),
        EligibilityClass::Rejected => asset.with_status(ReviewStatus::Rejected),
    }
}

/// Collection of standalone assets in the given classes
pub fn collection_with(rows: &[(&str, EligibilityClass)]) -> Arc<AssetCollection> {
    let collection = AssetCollection::new();
    for (raw, class) in rows {
        collection
            .insert_asset(asset_in(raw, *class))
            .unwrap_or_else(|err| panic!("fixture insert failed: {err}"));
    }
    Arc::new(collection)
}

/// `n` unchecked assets `id1..=idn`; `id1` is the most recently updated
pub fn numbered_collection(n: usize) -> Arc<AssetCollection> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
    let collection = AssetCollection::new();
    for i in 1..=n {
        let mut asset = Asset::new(format!("id{i}"), format!("Asset {i:03}"), MediaKind::Image);
        if let Some(base) = base {
            let offset = i64::try_from(n - i).unwrap_or(i64::MAX);
            asset = asset.with_updated_at(base + ChronoDuration::minutes(offset));
        }
        collection
            .insert_asset(asset)
            .unwrap_or_else(|err| panic!("fixture insert failed: {err}"));
    }
    Arc::new(collection)
}

/// Engine over `collection` with a recording sink in front of it
pub fn recording_engine(
    collection: Arc<AssetCollection>,
    ledger: Arc<CountingLedger>,
    oracle: Arc<ScriptedOracle>,
) -> (BatchEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new(collection.clone()));
    let engine = BatchEngine::new(ledger, collection, sink.clone(), oracle);
    (engine, sink)
}
