//! Batch engine integration tests against an in-memory collection

use desk_batch::{
    BatchEngine, BatchError, BatchKind, BatchOptions, CancellationToken, EngineConfig,
    FailureReason, SkipReason,
};
use desk_ledger::ResourceLedger;
use desk_model::{EligibilityClass, ReviewStatus};
use desk_test_utils::{
    collection_with, id, ids, numbered_collection, recording_engine, CountingLedger,
    RecordingSink, ScriptedOracle,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use EligibilityClass::{Approved, Checked, NeedsCheck};

#[tokio::test]
async fn mixed_check_batch() {
    let collection = collection_with(&[
        ("x1", NeedsCheck),
        ("x2", Checked),
        ("x3", NeedsCheck),
        ("x4", NeedsCheck),
    ]);
    let ledger = Arc::new(CountingLedger::new(3));
    let oracle = Arc::new(ScriptedOracle::new().fail_on("x3"));
    let (engine, sink) = recording_engine(collection.clone(), ledger.clone(), oracle.clone());

    let run = engine
        .run_batch(
            &ids(&["x1", "x2", "x3", "x4"]),
            BatchKind::RunCheck,
            BatchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["x1", "x4"]));
    assert_eq!(run.failed_ids(), vec![&id("x3")]);
    assert!(matches!(run.failed[0].reason, FailureReason::OracleFailure(_)));
    assert_eq!(run.skipped_ids(), vec![&id("x2")]);
    assert_eq!(run.skipped[0].reason, SkipReason::AlreadyChecked);
    assert!(run.is_settled());

    assert_eq!(ledger.consume_calls(), 3);
    assert_eq!(oracle.calls(), ids(&["x1", "x3", "x4"]));
    assert_eq!(sink.applied_ids(), ids(&["x1", "x4"]));

    assert_eq!(engine.status(&id("x1")), Some(Checked));
    assert_eq!(engine.status(&id("x3")), Some(NeedsCheck));
    assert_eq!(
        run.summary().to_string(),
        "2 succeeded, 1 failed: check failed, 1 already checked, skipped"
    );
}

#[tokio::test]
async fn admission_rejects_whole_batch() {
    let collection = numbered_collection(5);
    let ledger = Arc::new(CountingLedger::new(4));
    let oracle = Arc::new(ScriptedOracle::new());
    let (engine, sink) = recording_engine(collection.clone(), ledger.clone(), oracle.clone());

    let targets = ids(&["id1", "id2", "id3", "id4", "id5"]);
    let err = engine
        .run_batch(&targets, BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BatchError::InsufficientResource {
            needed: 5,
            available: 4
        }
    );
    assert_eq!(ledger.consume_calls(), 0);
    assert!(oracle.calls().is_empty());
    assert!(sink.applied_ids().is_empty());
    assert_eq!(collection.counts().needs_check, 5);
}

#[tokio::test]
async fn exact_balance_drains_to_zero() {
    let collection = numbered_collection(3);
    let ledger = Arc::new(CountingLedger::new(3));
    let (engine, _) = recording_engine(collection, ledger.clone(), Arc::new(ScriptedOracle::new()));

    let run = engine
        .run_batch(
            &ids(&["id1", "id2", "id3"]),
            BatchKind::RunCheck,
            BatchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded.len(), 3);
    assert_eq!(ledger.available(), 0);
}

#[tokio::test]
async fn already_checked_items_are_not_charged() {
    let collection = collection_with(&[("a", Checked), ("b", Approved), ("c", NeedsCheck)]);
    let ledger = Arc::new(CountingLedger::new(1));
    let (engine, _) = recording_engine(collection, ledger.clone(), Arc::new(ScriptedOracle::new()));

    let run = engine
        .run_batch(&ids(&["a", "b", "c"]), BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["c"]));
    assert_eq!(run.skipped_ids(), vec![&id("a"), &id("b")]);
    assert!(run.failed.is_empty());
    assert_eq!(ledger.consume_calls(), 1);
}

#[tokio::test]
async fn applies_follow_input_order() {
    let collection = numbered_collection(6);
    let ledger = Arc::new(CountingLedger::new(10));
    let (engine, sink) = recording_engine(collection, ledger, Arc::new(ScriptedOracle::new()));

    let targets = ids(&["id4", "id1", "id6", "id2"]);
    engine
        .run_batch(&targets, BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(sink.applied_ids(), targets);
}

#[tokio::test]
async fn duplicate_targets_are_charged_once() {
    let collection = numbered_collection(2);
    let ledger = Arc::new(CountingLedger::new(2));
    let (engine, _) = recording_engine(collection, ledger.clone(), Arc::new(ScriptedOracle::new()));

    let run = engine
        .run_batch(
            &ids(&["id1", "id2", "id1"]),
            BatchKind::RunCheck,
            BatchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(run.total(), 2);
    assert_eq!(ledger.consume_calls(), 2);
}

#[tokio::test]
async fn credit_lost_to_another_session_fails_rest() {
    let collection = numbered_collection(3);
    let ledger = Arc::new(CountingLedger::new(3).steal_after(1));
    let oracle = Arc::new(ScriptedOracle::new());
    let (engine, sink) = recording_engine(collection, ledger.clone(), oracle.clone());

    let run = engine
        .run_batch(
            &ids(&["id1", "id2", "id3"]),
            BatchKind::RunCheck,
            BatchOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id1"]));
    assert_eq!(run.failed_ids(), vec![&id("id2"), &id("id3")]);
    assert!(run
        .failed
        .iter()
        .all(|f| f.reason == FailureReason::ResourceExhausted));
    assert_eq!(oracle.calls(), ids(&["id1"]));
    assert_eq!(sink.applied_ids(), ids(&["id1"]));
    assert_eq!(
        run.summary().to_string(),
        "1 succeeded, 2 failed: insufficient resource"
    );
}

#[tokio::test]
async fn unknown_ids_fail_without_charge() {
    let collection = numbered_collection(1);
    let ledger = Arc::new(CountingLedger::new(1));
    let (engine, _) = recording_engine(collection, ledger.clone(), Arc::new(ScriptedOracle::new()));

    let run = engine
        .run_batch(&ids(&["gone", "id1"]), BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id1"]));
    assert_eq!(run.failed[0].reason, FailureReason::NotFound);
    assert_eq!(ledger.consume_calls(), 1);
}

#[tokio::test]
async fn cancellation_skips_remaining_items() {
    let collection = numbered_collection(5);
    let ledger = Arc::new(CountingLedger::new(5));
    let cancel = CancellationToken::new();
    let oracle = Arc::new(ScriptedOracle::new().cancel_after(2, cancel.clone()));
    let (engine, _) = recording_engine(collection.clone(), ledger.clone(), oracle);

    let run = engine
        .run_batch(
            &ids(&["id1", "id2", "id3", "id4", "id5"]),
            BatchKind::RunCheck,
            BatchOptions::default().with_cancel(cancel),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id1", "id2"]));
    assert!(run.failed.is_empty());
    assert_eq!(run.skipped_ids(), vec![&id("id3"), &id("id4"), &id("id5")]);
    assert!(run.skipped.iter().all(|s| s.reason == SkipReason::Cancelled));
    assert_eq!(ledger.consume_calls(), 2);
    assert_eq!(collection.counts().checked, 2);
    assert_eq!(run.summary().to_string(), "2 succeeded, 3 cancelled");
}

#[tokio::test]
async fn approve_collects_failures_and_continues() {
    let collection = collection_with(&[("a", NeedsCheck), ("b", Checked)]);
    let ledger = Arc::new(CountingLedger::new(0));
    let (engine, sink) =
        recording_engine(collection.clone(), ledger.clone(), Arc::new(ScriptedOracle::new()));

    let run = engine
        .run_batch(&ids(&["a", "ghost", "b"]), BatchKind::Approve, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["a", "b"]));
    assert_eq!(run.failed[0].id, id("ghost"));
    assert_eq!(run.failed[0].reason, FailureReason::NotFound);
    assert_eq!(sink.applied_ops(), vec!["approve"; 3]);
    assert_eq!(ledger.consume_calls(), 0);
    assert_eq!(collection.get(&id("b")).unwrap().status, ReviewStatus::Approved);
    assert_eq!(run.summary().headline(), "Approved 2 assets");
}

#[tokio::test]
async fn approve_cancelled_between_items() {
    let collection = numbered_collection(4);
    let cancel = CancellationToken::new();
    let sink = Arc::new(RecordingSink::new(collection.clone()).cancel_after(1, cancel.clone()));
    let engine = BatchEngine::new(
        Arc::new(CountingLedger::new(0)),
        collection.clone(),
        sink.clone(),
        Arc::new(ScriptedOracle::new()),
    );

    let run = engine
        .run_batch(
            &ids(&["id1", "id2", "id3", "id4"]),
            BatchKind::Approve,
            BatchOptions::default().with_cancel(cancel),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id1"]));
    assert!(run.failed.is_empty());
    assert_eq!(run.skipped_ids(), vec![&id("id2"), &id("id3"), &id("id4")]);
    assert!(run.skipped.iter().all(|s| s.reason == SkipReason::Cancelled));
    assert!(run.is_settled());
    assert_eq!(sink.applied_ids(), ids(&["id1"]));
    assert_eq!(collection.counts().approved, 1);
    assert_eq!(run.summary().to_string(), "1 succeeded, 3 cancelled");
}

#[tokio::test]
async fn reject_conflict_fails_item_and_continues() {
    let collection = numbered_collection(3);
    let sink = Arc::new(RecordingSink::new(collection.clone()).conflict_on("id2"));
    let engine = BatchEngine::new(
        Arc::new(CountingLedger::new(0)),
        collection.clone(),
        sink.clone(),
        Arc::new(ScriptedOracle::new()),
    );

    let targets = ids(&["id3", "id2", "id1"]);
    let run = engine
        .run_batch(
            &targets,
            BatchKind::Reject,
            BatchOptions::default().with_reason("off brand"),
        )
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id3", "id1"]));
    assert_eq!(run.failed_ids(), vec![&id("id2")]);
    assert_eq!(
        run.failed[0].reason,
        FailureReason::MutationConflict("row changed underneath".into())
    );
    assert!(run.is_settled());
    assert_eq!(sink.applied_ids(), targets);
    assert_eq!(sink.applied_ops(), vec!["reject"; 3]);
    assert_eq!(collection.get(&id("id2")).unwrap().status, ReviewStatus::Pending);
    assert_eq!(collection.counts().rejected, 2);
    assert_eq!(run.summary().to_string(), "2 succeeded, 1 failed: conflict");
}

#[tokio::test]
async fn reject_requires_reason() {
    let collection = numbered_collection(2);
    let ledger = Arc::new(CountingLedger::new(0));
    let (engine, sink) = recording_engine(collection, ledger, Arc::new(ScriptedOracle::new()));

    let err = engine
        .run_batch(
            &ids(&["id1", "id2"]),
            BatchKind::Reject,
            BatchOptions::default().with_reason("   "),
        )
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::EmptyRejectionReason);
    assert!(sink.applied_ids().is_empty());
    assert!(!engine.is_running());
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let (engine, _) = recording_engine(
        numbered_collection(1),
        Arc::new(CountingLedger::new(1)),
        Arc::new(ScriptedOracle::new()),
    );
    let err = engine
        .run_batch(&[], BatchKind::Approve, BatchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, BatchError::EmptySelection);
}

#[tokio::test]
async fn batch_size_limit_applies_before_admission() {
    let collection = numbered_collection(3);
    let ledger = Arc::new(CountingLedger::new(0));
    let (engine, _) = recording_engine(collection, ledger, Arc::new(ScriptedOracle::new()));
    let engine = engine.with_config(EngineConfig::default().with_max_batch_size(2));

    let err = engine
        .run_batch(
            &ids(&["id1", "id2", "id3"]),
            BatchKind::RunCheck,
            BatchOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BatchError::BatchTooLarge {
            requested: 3,
            limit: 2
        }
    );
}

#[tokio::test(start_paused = true)]
async fn second_run_is_rejected_while_first_is_in_flight() {
    let collection = numbered_collection(2);
    let ledger = Arc::new(CountingLedger::new(2));
    let oracle = Arc::new(ScriptedOracle::new().with_delay(Duration::from_secs(1)));
    let (engine, _) = recording_engine(collection, ledger, oracle);

    let targets = ids(&["id1", "id2"]);
    let (first, second) = tokio::join!(
        engine.run_batch(&targets, BatchKind::RunCheck, BatchOptions::default()),
        engine.run_batch(&targets, BatchKind::Approve, BatchOptions::default()),
    );

    assert_eq!(first.unwrap().succeeded.len(), 2);
    assert_eq!(second.unwrap_err(), BatchError::RunInProgress);
    assert!(!engine.is_running());
}

#[tokio::test(start_paused = true)]
async fn progress_reports_current_item() {
    let collection = numbered_collection(2);
    let ledger = Arc::new(CountingLedger::new(2));
    let oracle = Arc::new(ScriptedOracle::new().with_delay(Duration::from_secs(1)));
    let (engine, _) = recording_engine(collection, ledger, oracle);
    let rx = engine.subscribe();

    let targets = ids(&["id1", "id2"]);
    let run = engine.run_batch(&targets, BatchKind::RunCheck, BatchOptions::default());
    let observe = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let snapshot = rx.borrow().clone().unwrap();
        assert_eq!(snapshot.current, Some(id("id2")));
        assert_eq!(snapshot.succeeded, 1);
        assert!(!snapshot.finished);
        assert_eq!(engine.status(&id("id2")), Some(EligibilityClass::Checking));
    };
    let (run, ()) = tokio::join!(run, observe);

    run.unwrap();
    let last = rx.borrow().clone().unwrap();
    assert!(last.finished);
    assert_eq!(last.settled(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropped_run_leaves_nothing_checking() {
    let collection = numbered_collection(1);
    let ledger = Arc::new(CountingLedger::new(1));
    let oracle = Arc::new(ScriptedOracle::new().with_delay(Duration::from_secs(10)));
    let (engine, _) = recording_engine(collection, ledger, oracle);

    let targets = ids(&["id1"]);
    let outcome = tokio::time::timeout(
        Duration::from_secs(1),
        engine.run_batch(&targets, BatchKind::RunCheck, BatchOptions::default()),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(engine.status(&id("id1")), Some(NeedsCheck));
    assert!(!engine.is_running());
}

#[tokio::test]
async fn plan_preview_matches_run() {
    let collection = collection_with(&[("a", NeedsCheck), ("b", Checked), ("c", NeedsCheck)]);
    let ledger = Arc::new(CountingLedger::new(5));
    let (engine, _) = recording_engine(collection, ledger, Arc::new(ScriptedOracle::new()));

    let targets = ids(&["a", "b", "c"]);
    let plan = engine
        .plan(&targets, BatchKind::RunCheck, &BatchOptions::default())
        .unwrap();
    assert_eq!(plan.credits_needed, 2);
    assert_eq!(plan.credits_after(), Some(3));

    let run = engine
        .run_batch(&targets, BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(run.succeeded, plan.eligible);
}
