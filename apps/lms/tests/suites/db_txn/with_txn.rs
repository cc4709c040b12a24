// Rollback policy: the common test init installs RollbackOnOk, so nothing
// written through `with_txn` survives the call.

use lms::adapters::players_sea;
use lms::db::require_db;
use lms::db::txn::with_txn;
use lms::db::txn_policy::{current, TxnPolicy};
use lms::entities::players::PlayerStatus;
use lms::repos::players;
use lms::AppError;
use lms_test_support::unique_helpers::unique_player_name;
use tracing::debug;

use crate::support::build_test_state;

#[tokio::test]
async fn rollback_policy_discards_successful_writes() -> Result<(), AppError> {
    assert_eq!(current(), TxnPolicy::RollbackOnOk);

    let state = build_test_state().await?;
    let before = players_sea::count_by_status(require_db(&state)?, PlayerStatus::Active).await?;

    let name = unique_player_name("txn");
    let created = with_txn(None, &state, |txn| {
        Box::pin(async move {
            let player = players::create_player(txn, &name, None).await?;
            debug!(player_id = player.id, "inserted player inside txn");
            Ok::<_, AppError>(player.id)
        })
    })
    .await?;
    assert!(created > 0);

    let after = players_sea::count_by_status(require_db(&state)?, PlayerStatus::Active).await?;
    assert_eq!(after, before, "row should not persist after rollback-on-ok");
    Ok(())
}

#[tokio::test]
async fn closure_error_rolls_back_and_surfaces() -> Result<(), AppError> {
    let state = build_test_state().await?;
    let before = players_sea::count_by_status(require_db(&state)?, PlayerStatus::Active).await?;

    let name = unique_player_name("txn");
    let result = with_txn(None, &state, |txn| {
        Box::pin(async move {
            players::create_player(txn, &name, None).await?;
            Err::<(), _>(AppError::internal("forced failure"))
        })
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.detail(), "forced failure");
    let after = players_sea::count_by_status(require_db(&state)?, PlayerStatus::Active).await?;
    assert_eq!(after, before);
    Ok(())
}

#[tokio::test]
async fn state_without_db_is_unavailable() -> Result<(), AppError> {
    let state = lms::state::app_state::AppState::new_without_db(Default::default());

    let err = with_txn(None, &state, |_txn| {
        Box::pin(async move { Ok::<_, AppError>(()) })
    })
    .await
    .unwrap_err();
    assert_eq!(err.code(), lms::ErrorCode::DbUnavailable);
    Ok(())
}
