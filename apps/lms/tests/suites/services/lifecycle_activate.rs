// Activation keeps at most one round active.

use lms::db::txn::with_txn;
use lms::entities::rounds::RoundStatus as DbRoundStatus;
use lms::errors::ErrorCode;
use lms::repos::fixtures::NewFixture;
use lms::repos::rounds::{self, RoundStatus};
use lms::services::lifecycle::{NewRound, RoundLifecycle};
use lms::AppError;

use crate::support::build_test_state;
use crate::support::factory::{count_active_rounds, insert_raw_round, open_round};

#[tokio::test]
async fn create_next_round_numbers_rounds_within_the_cycle() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let lifecycle = RoundLifecycle;
            let first = lifecycle
                .create_next_round(
                    txn,
                    NewRound {
                        first_kickoff_at: None,
                        fixtures: vec![NewFixture::new("Arsenal", "Chelsea")],
                    },
                )
                .await?;
            assert_eq!((first.cycle_number, first.round_number), (1, 1));
            assert_eq!(first.status, RoundStatus::Pending);

            let second = lifecycle.create_next_round(txn, NewRound::default()).await?;
            assert_eq!((second.cycle_number, second.round_number), (1, 2));
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn first_kickoff_defaults_to_earliest_fixture() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let early = time::macros::datetime!(2026-08-15 11:30 UTC);
            let late = time::macros::datetime!(2026-08-15 14:00 UTC);
            let round = RoundLifecycle
                .create_next_round(
                    txn,
                    NewRound {
                        first_kickoff_at: None,
                        fixtures: vec![
                            NewFixture::new("Everton", "Fulham").with_kickoff(late),
                            NewFixture::new("Leeds", "Burnley").with_kickoff(early),
                        ],
                    },
                )
                .await?;
            assert_eq!(round.first_kickoff_at, Some(early));
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn activating_completes_the_previous_round() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (first, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let (second, _) = open_round(txn, &[("Spurs", "Wolves")]).await?;

            assert_eq!(second.status, RoundStatus::Active);
            assert!(second.activated_at.is_some());
            assert_eq!(
                rounds::require_round(txn, first.id).await?.status,
                RoundStatus::Completed
            );
            assert_eq!(count_active_rounds(txn).await?, 1);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn activation_demotes_every_active_round_even_in_the_same_cycle() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            insert_raw_round(txn, None, 1, 1, DbRoundStatus::Active).await?;
            insert_raw_round(txn, None, 1, 2, DbRoundStatus::Active).await?;
            let target = insert_raw_round(txn, None, 1, 3, DbRoundStatus::Pending).await?;

            RoundLifecycle.activate(txn, target.id).await?;
            assert_eq!(count_active_rounds(txn).await?, 1);
            let current = RoundLifecycle.current_round(txn).await?.expect("current");
            assert_eq!(current.id, target.id);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn active_and_completed_rounds_cannot_be_activated() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (first, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;

            let err = RoundLifecycle.activate(txn, first.id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidTransition);

            open_round(txn, &[("Spurs", "Wolves")]).await?;
            let err = RoundLifecycle.activate(txn, first.id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidTransition);
            assert_eq!(count_active_rounds(txn).await?, 1);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn rounds_from_an_older_cycle_are_not_activated() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let leftover = insert_raw_round(txn, None, 1, 5, DbRoundStatus::Pending).await?;
            insert_raw_round(txn, None, 2, 1, DbRoundStatus::Active).await?;

            let err = RoundLifecycle.activate(txn, leftover.id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidTransition);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_round_is_not_found() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let err = RoundLifecycle.activate(txn, 4242).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::RoundNotFound);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn history_is_ordered_by_cycle_then_round() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            insert_raw_round(txn, None, 2, 1, DbRoundStatus::Pending).await?;
            insert_raw_round(txn, None, 1, 2, DbRoundStatus::Completed).await?;
            insert_raw_round(txn, None, 1, 1, DbRoundStatus::Completed).await?;

            let history = RoundLifecycle.round_history(txn, None).await?;
            let keys: Vec<(i32, i32)> = history
                .iter()
                .map(|r| (r.cycle_number, r.round_number))
                .collect();
            assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);

            let cycle_one = RoundLifecycle.round_history(txn, Some(1)).await?;
            assert_eq!(cycle_one.len(), 2);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_round_number_is_a_conflict() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            rounds::create_round(txn, 1, 1, None).await?;
            // Last statement: on Postgres the failed insert aborts the transaction.
            let err: AppError = rounds::create_round(txn, 1, 1, None)
                .await
                .unwrap_err()
                .into();
            assert_eq!(err.code(), ErrorCode::DuplicateRound);
            Ok::<_, AppError>(())
        })
    })
    .await
}
