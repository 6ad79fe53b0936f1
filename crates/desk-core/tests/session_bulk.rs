//! Session-level bulk action tests

use desk_batch::{BatchEngine, BatchError, BatchKind, BatchOptions, SkipReason};
use desk_collection::{AssetFilter, ViewScope};
use desk_core::{DeskConfig, ReviewSession, Screen};
use desk_model::{EligibilityClass, ItemId, ReviewStatus};
use desk_selection::SelectionState;
use desk_test_utils::{
    collection_with, id, ids, numbered_collection, CountingLedger, ScriptedOracle,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;

fn session_over(
    collection: Arc<desk_collection::AssetCollection>,
    credits: u64,
    screen: Screen,
) -> ReviewSession {
    let engine = BatchEngine::for_collection(
        collection.clone(),
        Arc::new(CountingLedger::new(credits)),
        Arc::new(ScriptedOracle::new()),
    );
    ReviewSession::new(screen, collection, Arc::new(engine), &DeskConfig::default())
}

#[test]
fn select_all_then_exclude_one() {
    let mut session = session_over(numbered_collection(50), 0, Screen::AssetList);
    session.select_all_matching();
    session.select("id7", false);

    assert_eq!(
        session.selection(),
        &SelectionState::AllExceptExplicit {
            excluded: HashSet::from([id("id7")])
        }
    );
    assert_eq!(session.selection_count(), 49);
    assert!(!session.resolved_ids().contains(&id("id7")));
}

#[tokio::test]
async fn completed_run_clears_selection() {
    let collection = numbered_collection(30);
    let mut session = session_over(collection.clone(), 100, Screen::AssetList);
    session.select_all_matching();
    session.select("id3", false);

    let run = session
        .run_bulk(BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(run.succeeded.len(), 29);
    assert_eq!(session.selection_count(), 0);
    assert_eq!(collection.counts().checked, 29);
    assert_eq!(session.status(&id("id3")), Some(EligibilityClass::NeedsCheck));
    assert_eq!(run.summary().headline(), "Completed checks on 29 assets");
}

#[tokio::test]
async fn precondition_failure_keeps_selection() {
    let mut session = session_over(numbered_collection(5), 2, Screen::AssetList);
    session.select_page();

    let err = session
        .run_bulk(BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap_err();

    assert_eq!(
        err.as_batch(),
        Some(&BatchError::InsufficientResource {
            needed: 5,
            available: 2
        })
    );
    assert_eq!(session.selection_count(), 5);
}

#[tokio::test]
async fn filtered_out_selection_is_not_acted_on() {
    let collection = numbered_collection(4);
    let mut session = session_over(collection.clone(), 0, Screen::AssetList);
    session.select("id1", true);
    session.select("id4", true);
    session.set_filter(AssetFilter::any().with_search("004"));

    let run = session
        .run_bulk(BatchKind::Approve, BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(run.succeeded, ids(&["id4"]));
    assert_eq!(
        collection.get(&ItemId::new("id1")).unwrap().status,
        ReviewStatus::Pending
    );
}

#[tokio::test]
async fn approval_queue_reject_with_reason() {
    let collection = collection_with(&[
        ("a", EligibilityClass::Checked),
        ("b", EligibilityClass::Approved),
        ("c", EligibilityClass::NeedsCheck),
    ]);
    let mut session = session_over(collection.clone(), 0, Screen::ApprovalQueue);
    assert_eq!(session.query().scope, ViewScope::Pending);

    session.select_all_matching();
    assert_eq!(session.selection_count(), 2);

    let err = session
        .run_bulk(BatchKind::Reject, BatchOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.as_batch(), Some(&BatchError::EmptyRejectionReason));

    let run = session
        .run_bulk(BatchKind::Reject, BatchOptions::default().with_reason("wrong palette"))
        .await
        .unwrap();
    assert_eq!(run.succeeded.len(), 2);
    assert!(session.view().is_empty());

    let rejected = collection.get(&id("a")).unwrap();
    assert_eq!(rejected.status, ReviewStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("wrong palette"));
}

#[tokio::test]
async fn plan_bulk_previews_skips() {
    let collection = collection_with(&[
        ("a", EligibilityClass::Checked),
        ("c", EligibilityClass::NeedsCheck),
    ]);
    let mut session = session_over(collection, 3, Screen::AssetList);
    session.select_all_matching();

    let plan = session
        .plan_bulk(BatchKind::RunCheck, &BatchOptions::default())
        .unwrap();
    assert_eq!(plan.eligible, ids(&["c"]));
    assert_eq!(plan.already_checked, ids(&["a"]));

    let run = session
        .run_bulk(BatchKind::RunCheck, BatchOptions::default())
        .await
        .unwrap();
    assert_eq!(run.skipped[0].reason, SkipReason::AlreadyChecked);
}
