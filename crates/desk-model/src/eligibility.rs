//! Eligibility lifecycle
//!
//! `NeedsCheck -> Checking -> Checked` is driven by quality checks.
//! `NeedsCheck | Checked -> Approved | Rejected` is driven by reviewers.
//! Approved and rejected items may be flipped by a manual override.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-item review lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityClass {
    /// No check results yet
    NeedsCheck,
    /// A check is in flight
    Checking,
    /// Check results are attached
    Checked,
    /// Approved by a reviewer
    Approved,
    /// Rejected by a reviewer
    Rejected,
}

/// Illegal lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal eligibility transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: EligibilityClass,
    pub to: EligibilityClass,
}

impl EligibilityClass {
    /// All lifecycle stages, in lifecycle order
    pub const ALL: [EligibilityClass; 5] = [
        EligibilityClass::NeedsCheck,
        EligibilityClass::Checking,
        EligibilityClass::Checked,
        EligibilityClass::Approved,
        EligibilityClass::Rejected,
    ];

    /// Stages reachable from `self` in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [EligibilityClass] {
        match self {
            Self::NeedsCheck => &[Self::Checking, Self::Approved, Self::Rejected],
            Self::Checking => &[Self::Checked, Self::NeedsCheck],
            Self::Checked => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Rejected],
            Self::Rejected => &[Self::Approved],
        }
    }

    /// Validate a single transition
    ///
    /// # Errors
    /// Returns [`TransitionError`] if `to` is not reachable from `self`.
    pub fn validate_transition(self, to: EligibilityClass) -> Result<(), TransitionError> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(TransitionError { from: self, to })
        }
    }

    /// Still waiting on a reviewer decision (shown in the approval queue)
    #[inline]
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::NeedsCheck | Self::Checking | Self::Checked)
    }

    /// Short label for badges and logs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NeedsCheck => "needs check",
            Self::Checking => "checking",
            Self::Checked => "checked",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for EligibilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
