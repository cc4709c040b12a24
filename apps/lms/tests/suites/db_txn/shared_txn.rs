// A SharedTxn spans several `with_txn` calls; the test owns its end.

use lms::adapters::players_sea;
use lms::db::require_db;
use lms::db::txn::with_txn;
use lms::entities::players::PlayerStatus;
use lms::repos::players;
use lms::AppError;
use lms_test_support::unique_helpers::unique_player_name;

use crate::support::{build_test_state, shared_txn};

#[tokio::test]
async fn shared_txn_spans_calls_until_rolled_back() -> Result<(), AppError> {
    let state = build_test_state().await?;
    let db = require_db(&state)?;
    let before = players_sea::count_by_status(db, PlayerStatus::Active).await?;

    let shared = shared_txn::open(db).await;

    let name = unique_player_name("shared");
    let player_id = with_txn(Some(&shared), &state, |txn| {
        Box::pin(async move {
            let player = players::create_player(txn, &name, None).await?;
            Ok::<_, AppError>(player.id)
        })
    })
    .await?;

    // Still visible on the same transaction: with_txn did not end it.
    let seen = with_txn(Some(&shared), &state, |txn| {
        Box::pin(async move { Ok::<_, AppError>(players::find_by_id(txn, player_id).await?) })
    })
    .await?;
    assert_eq!(seen.map(|p| p.id), Some(player_id));

    shared_txn::rollback(shared).await?;

    let after = players_sea::count_by_status(db, PlayerStatus::Active).await?;
    assert_eq!(after, before);
    Ok(())
}
