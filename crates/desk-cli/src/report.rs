//! Text and JSON rendering of runs and plans

use anyhow::Result;
use desk_batch::{BatchPlan, BatchRun};
use desk_ledger::{CreditLedger, ResourceLedger};
use serde_json::json;
use std::fmt::Write;

pub(crate) fn render_run(run: &BatchRun, ledger: &CreditLedger, json: bool) -> Result<String> {
    let summary = run.summary();
    if json {
        let value = json!({
            "headline": summary.headline(),
            "summary": summary,
            "clean": summary.is_clean(),
            "run": run,
            "credits_remaining": ledger.available(),
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    writeln!(out, "{}", summary.headline())?;
    writeln!(out, "{summary}")?;
    for failure in &run.failed {
        writeln!(out, "  failed  {}: {}", failure.id, failure.reason)?;
    }
    write!(out, "credits remaining: {}", ledger.available())?;
    Ok(out)
}

pub(crate) fn render_plan(plan: &BatchPlan, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(plan)?);
    }

    let mut out = String::new();
    writeln!(out, "action:          {}", plan.kind)?;
    writeln!(out, "targets:         {}", plan.targets.len())?;
    writeln!(out, "eligible:        {}", plan.eligible.len())?;
    writeln!(out, "already checked: {}", plan.already_checked.len())?;
    writeln!(out, "unknown:         {}", plan.unknown.len())?;
    match (plan.credits_available, plan.credits_after()) {
        (Some(available), Some(after)) => write!(
            out,
            "credits:         {} of {available} ({after} left after run)",
            plan.credits_needed
        )?,
        _ => write!(out, "credits:         not required")?,
    }
    Ok(out)
}
