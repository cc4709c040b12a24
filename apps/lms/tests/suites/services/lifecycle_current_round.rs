// Current-round resolution and self-heal of multiple active rounds.

use lms::db::txn::with_txn;
use lms::entities::rounds::RoundStatus as DbRoundStatus;
use lms::repos::rounds::{self, RoundStatus};
use lms::services::lifecycle::RoundLifecycle;
use lms::AppError;

use crate::support::build_test_state;
use crate::support::factory::{count_active_rounds, insert_raw_round};

#[tokio::test]
async fn no_active_round_is_none() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            insert_raw_round(txn, None, 1, 1, DbRoundStatus::Pending).await?;
            assert_eq!(RoundLifecycle.current_round(txn).await?, None);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn stale_round_from_older_cycle_is_demoted() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            insert_raw_round(txn, Some(5), 1, 3, DbRoundStatus::Active).await?;
            insert_raw_round(txn, Some(9), 2, 1, DbRoundStatus::Active).await?;

            let current = RoundLifecycle
                .current_round(txn)
                .await?
                .expect("a current round");
            assert_eq!(current.id, 9);
            assert_eq!(current.cycle_number, 2);

            let stale = rounds::require_round(txn, 5).await?;
            assert_eq!(stale.status, RoundStatus::Completed);
            assert!(stale.completed_at.is_some());
            assert_eq!(count_active_rounds(txn).await?, 1);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn old_cycle_with_higher_id_still_loses() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            // A cycle-1 row re-inserted after cycle 2 began gets the larger id.
            insert_raw_round(txn, Some(20), 2, 1, DbRoundStatus::Active).await?;
            insert_raw_round(txn, Some(31), 1, 6, DbRoundStatus::Active).await?;

            let current = RoundLifecycle.current_round(txn).await?.expect("current");
            assert_eq!(current.id, 20);
            assert_eq!(
                rounds::require_round(txn, 31).await?.status,
                RoundStatus::Completed
            );
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn cycles_1_2_2_3_resolve_to_cycle_3_and_demote_the_rest() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let c1 = insert_raw_round(txn, None, 1, 4, DbRoundStatus::Active).await?;
            let c2a = insert_raw_round(txn, None, 2, 2, DbRoundStatus::Active).await?;
            let c3 = insert_raw_round(txn, None, 3, 1, DbRoundStatus::Active).await?;
            let c2b = insert_raw_round(txn, None, 2, 3, DbRoundStatus::Active).await?;

            let current = RoundLifecycle.current_round(txn).await?.expect("current");
            assert_eq!(current.id, c3.id);
            for id in [c1.id, c2a.id, c2b.id] {
                assert_eq!(
                    rounds::require_round(txn, id).await?.status,
                    RoundStatus::Completed
                );
            }
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn same_cycle_tie_breaks_on_higher_id() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let older = insert_raw_round(txn, None, 2, 1, DbRoundStatus::Active).await?;
            let newer = insert_raw_round(txn, None, 2, 2, DbRoundStatus::Active).await?;

            let current = RoundLifecycle.current_round(txn).await?.expect("current");
            assert_eq!(current.id, newer.id);
            assert_eq!(
                rounds::require_round(txn, older.id).await?.status,
                RoundStatus::Completed
            );
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn self_heal_is_idempotent() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            insert_raw_round(txn, None, 1, 1, DbRoundStatus::Active).await?;
            insert_raw_round(txn, None, 1, 2, DbRoundStatus::Active).await?;
            insert_raw_round(txn, None, 2, 1, DbRoundStatus::Active).await?;

            let first = RoundLifecycle.current_round(txn).await?;
            let history_after_first = RoundLifecycle.round_history(txn, None).await?;

            let second = RoundLifecycle.current_round(txn).await?;
            let history_after_second = RoundLifecycle.round_history(txn, None).await?;

            assert!(first.is_some());
            assert_eq!(first, second);
            assert_eq!(history_after_first, history_after_second);
            assert_eq!(count_active_rounds(txn).await?, 1);
            Ok::<_, AppError>(())
        })
    })
    .await
}
