//! Batch planning and admission control
//!
//! Planning is pure: it reads eligibility and the credit balance, validates
//! preconditions and partitions the targets. Nothing is consumed or mutated,
//! so the same plan doubles as a UI preview ("3 checks, 1 already checked").

use crate::config::EngineConfig;
use crate::engine::BatchOptions;
use crate::error::BatchError;
use crate::run::BatchKind;
use desk_collection::EligibilitySource;
use desk_ledger::ResourceLedger;
use desk_model::ItemId;
use serde::Serialize;
use std::collections::HashSet;

/// Partitioned targets of one bulk action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub kind: BatchKind,
    /// De-duplicated targets in input order
    pub targets: Vec<ItemId>,
    /// Items that will be attempted, in input order
    pub eligible: Vec<ItemId>,
    /// Items skipped because they carry check results or are being checked
    pub already_checked: Vec<ItemId>,
    /// Items the collection does not know (checks only)
    pub unknown: Vec<ItemId>,
    pub credits_needed: u64,
    /// Balance observed at planning time (checks only)
    pub credits_available: Option<u64>,
}

impl BatchPlan {
    /// Credits left after the run if every check consumes one
    #[must_use]
    pub fn credits_after(&self) -> Option<u64> {
        self.credits_available
            .map(|available| available.saturating_sub(self.credits_needed))
    }
}

/// Validate preconditions and partition `ids`.
///
/// # Errors
/// Returns the first failing precondition, in this order:
/// empty selection, batch size limit, rejection reason, credit admission.
pub(crate) fn plan(
    ids: &[ItemId],
    kind: BatchKind,
    opts: &BatchOptions,
    config: &EngineConfig,
    source: &dyn EligibilitySource,
    ledger: &dyn ResourceLedger,
    is_checking: impl Fn(&ItemId) -> bool,
) -> Result<BatchPlan, BatchError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let targets: Vec<ItemId> = ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    if targets.is_empty() {
        return Err(BatchError::EmptySelection);
    }

    if let Some(limit) = config.max_batch_size {
        if targets.len() > limit {
            return Err(BatchError::BatchTooLarge {
                requested: targets.len(),
                limit,
            });
        }
    }

    if kind == BatchKind::Reject && opts.rejection_reason().is_none() {
        return Err(BatchError::EmptyRejectionReason);
    }

    if kind != BatchKind::RunCheck {
        return Ok(BatchPlan {
            kind,
            eligible: targets.clone(),
            targets,
            already_checked: Vec::new(),
            unknown: Vec::new(),
            credits_needed: 0,
            credits_available: None,
        });
    }

    let mut eligible = Vec::new();
    let mut already_checked = Vec::new();
    let mut unknown = Vec::new();
    for id in &targets {
        match source.has_review(id) {
            Some(false) if !is_checking(id) => eligible.push(id.clone()),
            Some(_) => already_checked.push(id.clone()),
            None => unknown.push(id.clone()),
        }
    }

    let credits_needed = eligible.len() as u64;
    let available = ledger.available();
    if credits_needed > available {
        return Err(BatchError::InsufficientResource {
            needed: credits_needed,
            available,
        });
    }

    Ok(BatchPlan {
        kind,
        targets,
        eligible,
        already_checked,
        unknown,
        credits_needed,
        credits_available: Some(available),
    })
}
