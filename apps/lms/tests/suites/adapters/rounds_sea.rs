use lms::adapters::rounds_sea::{self, RoundCreate};
use lms::db::txn::with_txn;
use lms::entities::rounds::RoundStatus;
use lms::errors::ErrorCode;
use lms::AppError;

use crate::support::build_test_state;

fn round(cycle_number: i32, round_number: i32) -> RoundCreate {
    RoundCreate {
        cycle_number,
        round_number,
        first_kickoff_at: None,
    }
}

#[tokio::test]
async fn create_round_starts_pending() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let created = rounds_sea::create_round(txn, round(1, 1)).await?;
            assert!(created.id > 0);
            assert_eq!(created.status, RoundStatus::Pending);
            assert_eq!(created.activated_at, None);
            assert_eq!(created.completed_at, None);

            let found = rounds_sea::find_by_id(txn, created.id).await?;
            assert_eq!(found.map(|r| r.id), Some(created.id));
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn cycle_and_round_numbers_aggregate() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            assert_eq!(rounds_sea::latest_cycle_number(txn).await?, None);
            assert_eq!(rounds_sea::max_round_number(txn, 1).await?, None);

            rounds_sea::create_round(txn, round(1, 1)).await?;
            rounds_sea::create_round(txn, round(1, 2)).await?;
            rounds_sea::create_round(txn, round(2, 1)).await?;

            assert_eq!(rounds_sea::latest_cycle_number(txn).await?, Some(2));
            assert_eq!(rounds_sea::max_round_number(txn, 1).await?, Some(2));
            assert_eq!(rounds_sea::max_round_number(txn, 2).await?, Some(1));
            assert_eq!(rounds_sea::max_round_number(txn, 3).await?, None);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn history_orders_by_cycle_then_round() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            rounds_sea::create_round(txn, round(2, 1)).await?;
            rounds_sea::create_round(txn, round(1, 2)).await?;
            rounds_sea::create_round(txn, round(1, 1)).await?;

            let all: Vec<(i32, i32)> = rounds_sea::find_history(txn, None)
                .await?
                .iter()
                .map(|r| (r.cycle_number, r.round_number))
                .collect();
            assert_eq!(all, vec![(1, 1), (1, 2), (2, 1)]);

            let second = rounds_sea::find_history(txn, Some(2)).await?;
            assert_eq!(second.len(), 1);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn missing_round_maps_to_round_not_found() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let err: AppError = rounds_sea::require_round(txn, 424_242)
                .await
                .unwrap_err()
                .into();
            assert_eq!(err.code(), ErrorCode::RoundNotFound);
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
            rounds_sea::create_round(txn, round(1, 1)).await?;
            let err: AppError = rounds_sea::create_round(txn, round(1, 1))
                .await
                .unwrap_err()
                .into();
            assert_eq!(err.code(), ErrorCode::DuplicateRound);
            Ok::<_, AppError>(())
        })
    })
    .await
}
