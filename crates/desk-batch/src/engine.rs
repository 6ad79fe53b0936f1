//! Batch engine
//!
//! Runs one bulk action at a time over a list of target ids:
//! - Admission: preconditions and the credit check happen before any side effect
//! - Execution: strictly sequential, in input order, one await chain per item
//! - Cancellation: cooperative, checked between items only
//! - Observation: per-item `Checking` overlay and a live progress channel

use crate::config::EngineConfig;
use crate::error::{BatchError, FailureReason, SkipReason};
use crate::oracle::ScoringOracle;
use crate::plan::{self, BatchPlan};
use crate::run::{BatchKind, BatchProgress, BatchRun};
use dashmap::DashSet;
use desk_collection::{AssetCollection, EligibilitySource, RowMutationSink};
use desk_ledger::ResourceLedger;
use desk_model::{EligibilityClass, ItemId, RowPatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    rejection_reason: Option<String>,
    cancel: CancellationToken,
}

impl BatchOptions {
    /// Set the rejection reason (required for [`BatchKind::Reject`])
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Trimmed rejection reason, `None` if missing or blank
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }

    /// Token observed between items
    #[inline]
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Releases the single-run flag on drop
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Holds the `Checking` overlay for one item; cleared on drop, including
/// when the run future is dropped mid-await.
struct CheckingGuard<'a> {
    checking: &'a DashSet<ItemId>,
    id: ItemId,
}

impl<'a> CheckingGuard<'a> {
    fn enter(checking: &'a DashSet<ItemId>, id: &ItemId) -> Self {
        checking.insert(id.clone());
        Self {
            checking,
            id: id.clone(),
        }
    }
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.checking.remove(&self.id);
    }
}

/// Bulk action executor bound to one ledger, collection and oracle
pub struct BatchEngine {
    config: EngineConfig,
    ledger: Arc<dyn ResourceLedger>,
    source: Arc<dyn EligibilitySource>,
    sink: Arc<dyn RowMutationSink>,
    oracle: Arc<dyn ScoringOracle>,
    checking: DashSet<ItemId>,
    running: AtomicBool,
    progress: watch::Sender<Option<BatchProgress>>,
}

impl BatchEngine {
    /// Create new engine from its collaborators
    pub fn new(
        ledger: Arc<dyn ResourceLedger>,
        source: Arc<dyn EligibilitySource>,
        sink: Arc<dyn RowMutationSink>,
        oracle: Arc<dyn ScoringOracle>,
    ) -> Self {
        let (progress, _) = watch::channel(None);
        Self {
            config: EngineConfig::default(),
            ledger,
            source,
            sink,
            oracle,
            checking: DashSet::new(),
            running: AtomicBool::new(false),
            progress,
        }
    }

    /// Create engine reading from and writing to one collection
    pub fn for_collection(
        collection: Arc<AssetCollection>,
        ledger: Arc<dyn ResourceLedger>,
        oracle: Arc<dyn ScoringOracle>,
    ) -> Self {
        Self::new(ledger, collection.clone(), collection, oracle)
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A run is currently executing
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Observed lifecycle stage of `id`, with the in-flight `Checking` overlay
    #[must_use]
    pub fn status(&self, id: &ItemId) -> Option<EligibilityClass> {
        let class = self.source.eligibility(id)?;
        if self.checking.contains(id) {
            Some(EligibilityClass::Checking)
        } else {
            Some(class)
        }
    }

    /// Subscribe to live progress. `None` until the first run starts.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<BatchProgress>> {
        self.progress.subscribe()
    }

    /// Validate and classify without side effects
    ///
    /// # Errors
    /// Returns the [`BatchError`] that `run_batch` would return for the same input.
    pub fn plan(
        &self,
        ids: &[ItemId],
        kind: BatchKind,
        opts: &BatchOptions,
    ) -> Result<BatchPlan, BatchError> {
        plan::plan(
            ids,
            kind,
            opts,
            &self.config,
            self.source.as_ref(),
            self.ledger.as_ref(),
            |id| self.checking.contains(id),
        )
    }

    /// Run one bulk action to completion or cancellation.
    ///
    /// Per-item failures are recorded in the returned [`BatchRun`]; they never
    /// abort the run.
    ///
    /// # Errors
    /// Returns [`BatchError`] when a precondition fails. Nothing has been
    /// consumed or mutated in that case.
    pub async fn run_batch(
        &self,
        ids: &[ItemId],
        kind: BatchKind,
        opts: BatchOptions,
    ) -> Result<BatchRun, BatchError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::warn!(%kind, "batch rejected: run in progress");
            return Err(BatchError::RunInProgress);
        };

        let plan = match self.plan(ids, kind, &opts) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(%kind, error = %err, "batch rejected");
                return Err(err);
            }
        };

        let span = tracing::info_span!("batch_run", %kind, items = plan.targets.len());
        async move {
            tracing::info!(
                eligible = plan.eligible.len(),
                credits_needed = plan.credits_needed,
                "batch started"
            );

            let run = match kind {
                BatchKind::RunCheck => self.run_checks(plan, &opts).await,
                BatchKind::Approve | BatchKind::Reject => self.run_decisions(plan, &opts).await,
            };

            self.publish(&run, None, true);
            tracing::info!(
                succeeded = run.succeeded.len(),
                failed = run.failed.len(),
                skipped = run.skipped.len(),
                "batch finished"
            );
            Ok(run)
        }
        .instrument(span)
        .await
    }

    async fn run_checks(&self, plan: BatchPlan, opts: &BatchOptions) -> BatchRun {
        let mut run = BatchRun::new(plan.kind, plan.targets);
        for id in plan.unknown {
            tracing::debug!(%id, "unknown item");
            run.fail(id, FailureReason::NotFound);
        }
        for id in plan.already_checked {
            tracing::debug!(%id, "already checked, skipping");
            run.skip(id, SkipReason::AlreadyChecked);
        }

        let mut remaining = plan.eligible.into_iter();
        while let Some(id) = remaining.next() {
            if opts.cancel.is_cancelled() {
                Self::cancel_rest(&mut run, id, remaining.by_ref());
                break;
            }

            self.publish(&run, Some(&id), false);
            match self.check_one(&id).await {
                Ok(()) => {
                    tracing::debug!(%id, "check completed");
                    run.succeed(id);
                }
                Err(reason) => {
                    tracing::warn!(%id, %reason, "check failed");
                    run.fail(id, reason);
                }
            }
            run.advance();
        }
        run
    }

    async fn check_one(&self, id: &ItemId) -> Result<(), FailureReason> {
        let _checking = CheckingGuard::enter(&self.checking, id);
        self.ledger.consume_one()?;
        let review = self.oracle.score(id).await?;
        self.sink.apply(id, RowPatch::ReviewCompleted(review)).await?;
        Ok(())
    }

    async fn run_decisions(&self, plan: BatchPlan, opts: &BatchOptions) -> BatchRun {
        let patch = match plan.kind {
            BatchKind::Reject => RowPatch::Reject {
                reason: opts.rejection_reason().unwrap_or_default().to_owned(),
            },
            _ => RowPatch::Approve,
        };

        let mut run = BatchRun::new(plan.kind, plan.targets);
        let mut remaining = plan.eligible.into_iter();
        while let Some(id) = remaining.next() {
            if opts.cancel.is_cancelled() {
                Self::cancel_rest(&mut run, id, remaining.by_ref());
                break;
            }

            self.publish(&run, Some(&id), false);
            match self.sink.apply(&id, patch.clone()).await {
                Ok(()) => {
                    tracing::debug!(%id, op = patch.name(), "patch applied");
                    run.succeed(id);
                }
                Err(err) => {
                    tracing::warn!(%id, error = %err, "patch failed");
                    run.fail(id, err.into());
                }
            }
            run.advance();
        }
        run
    }

    fn cancel_rest(run: &mut BatchRun, first: ItemId, rest: impl Iterator<Item = ItemId>) {
        run.skip(first, SkipReason::Cancelled);
        let mut cancelled = 1_usize;
        for id in rest {
            run.skip(id, SkipReason::Cancelled);
            cancelled += 1;
        }
        tracing::info!(cancelled, "batch cancelled");
    }

    fn publish(&self, run: &BatchRun, current: Option<&ItemId>, finished: bool) {
        self.progress
            .send_replace(Some(run.progress(current, finished)));
    }
}

impl std::fmt::Debug for BatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEngine")
            .field("config", &self.config)
            .field("checking", &self.checking.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
