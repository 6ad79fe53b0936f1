//! Batch run bookkeeping, progress snapshots and summaries

use crate::error::{FailureReason, SkipReason};
use desk_model::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bulk action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Run quality checks (credit-gated)
    RunCheck,
    Approve,
    Reject,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RunCheck => "run_check",
            Self::Approve => "approve",
            Self::Reject => "reject",
        })
    }
}

/// One failed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub id: ItemId,
    pub reason: FailureReason,
}

/// One item that was not attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSkip {
    pub id: ItemId,
    pub reason: SkipReason,
}

/// One execution of a bulk action.
///
/// Every target ends in exactly one of `succeeded`, `failed` or `skipped`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRun {
    pub kind: BatchKind,
    pub target_ids: Vec<ItemId>,
    /// Items attempted so far, in processing order
    pub cursor: usize,
    pub succeeded: Vec<ItemId>,
    pub failed: Vec<ItemFailure>,
    pub skipped: Vec<ItemSkip>,
}

impl BatchRun {
    pub(crate) fn new(kind: BatchKind, target_ids: Vec<ItemId>) -> Self {
        Self {
            kind,
            target_ids,
            cursor: 0,
            succeeded: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn succeed(&mut self, id: ItemId) {
        self.succeeded.push(id);
    }

    pub(crate) fn fail(&mut self, id: ItemId, reason: FailureReason) {
        self.failed.push(ItemFailure { id, reason });
    }

    pub(crate) fn skip(&mut self, id: ItemId, reason: SkipReason) {
        self.skipped.push(ItemSkip { id, reason });
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Number of targets
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.target_ids.len()
    }

    /// Every target has an outcome
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.succeeded.len() + self.failed.len() + self.skipped.len() == self.total()
    }

    /// Ids that were skipped, in order
    #[must_use]
    pub fn skipped_ids(&self) -> Vec<&ItemId> {
        self.skipped.iter().map(|s| &s.id).collect()
    }

    /// Ids that failed, in order
    #[must_use]
    pub fn failed_ids(&self) -> Vec<&ItemId> {
        self.failed.iter().map(|f| &f.id).collect()
    }

    /// Aggregate outcome for user-facing reporting
    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        let mut failures: Vec<(&'static str, usize)> = Vec::new();
        for failure in &self.failed {
            let label = failure.reason.label();
            match failures.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => failures.push((label, 1)),
            }
        }

        let count_skips = |reason: SkipReason| {
            self.skipped.iter().filter(|s| s.reason == reason).count()
        };

        BatchSummary {
            kind: self.kind,
            succeeded: self.succeeded.len(),
            failed: self.failed.len(),
            failures,
            already_checked: count_skips(SkipReason::AlreadyChecked),
            cancelled: count_skips(SkipReason::Cancelled),
        }
    }

    pub(crate) fn progress(&self, current: Option<&ItemId>, finished: bool) -> BatchProgress {
        BatchProgress {
            kind: self.kind,
            total: self.total(),
            cursor: self.cursor,
            succeeded: self.succeeded.len(),
            failed: self.failed.len(),
            skipped: self.skipped.len(),
            current: current.cloned(),
            finished,
        }
    }
}

/// Live view of an in-flight run, published after every step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub kind: BatchKind,
    pub total: usize,
    pub cursor: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Item currently being processed
    pub current: Option<ItemId>,
    pub finished: bool,
}

impl BatchProgress {
    /// Targets with an outcome so far
    #[inline]
    #[must_use]
    pub fn settled(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Aggregate counts of a finished run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub kind: BatchKind,
    pub succeeded: usize,
    pub failed: usize,
    /// Failure counts per reason label, in first-seen order
    pub failures: Vec<(&'static str, usize)>,
    pub already_checked: usize,
    pub cancelled: usize,
}

impl BatchSummary {
    /// Toast headline, e.g. "Completed checks on 3 assets"
    #[must_use]
    pub fn headline(&self) -> String {
        let n = self.succeeded;
        let noun = if n == 1 { "asset" } else { "assets" };
        match self.kind {
            BatchKind::RunCheck => format!("Completed checks on {n} {noun}"),
            BatchKind::Approve => format!("Approved {n} {noun}"),
            BatchKind::Reject => format!("Rejected {n} {noun}"),
        }
    }

    /// No failures and nothing cancelled
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded", self.succeeded)?;

        if self.failed > 0 {
            write!(f, ", {} failed: ", self.failed)?;
            if let [(label, _)] = self.failures.as_slice() {
                f.write_str(label)?;
            } else {
                let parts: Vec<String> = self
                    .failures
                    .iter()
                    .map(|(label, count)| format!("{count} {label}"))
                    .collect();
                f.write_str(&parts.join(", "))?;
            }
        }
        if self.already_checked > 0 {
            write!(f, ", {} already checked, skipped", self.already_checked)?;
        }
        if self.cancelled > 0 {
            write!(f, ", {} cancelled", self.cancelled)?;
        }
        Ok(())
    }
}
