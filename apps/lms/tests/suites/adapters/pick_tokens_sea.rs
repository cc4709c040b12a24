use lms::adapters::pick_tokens_sea::{self, PickTokenCreate, PickTokenRotate};
use lms::adapters::players_sea::{self, PlayerCreate};
use lms::adapters::rounds_sea::{self, RoundCreate};
use lms::db::txn::with_txn;
use lms::errors::ErrorCode;
use lms::AppError;
use lms_test_support::unique_helpers::unique_player_name;
use sea_orm::DatabaseTransaction;
use time::{Duration, OffsetDateTime};

use crate::support::build_test_state;

/// A player and a round to hang tokens on.
async fn seed(txn: &DatabaseTransaction) -> Result<(i64, i64), AppError> {
    let player = players_sea::create_player(
        txn,
        PlayerCreate {
            name: unique_player_name("tok"),
            contact: None,
        },
    )
    .await?;
    let round = rounds_sea::create_round(
        txn,
        RoundCreate {
            cycle_number: 1,
            round_number: 1,
            first_kickoff_at: None,
        },
    )
    .await?;
    Ok((player.id, round.id))
}

fn new_token(player_id: i64, round_id: i64, token: &str) -> PickTokenCreate {
    PickTokenCreate {
        player_id,
        round_id,
        token: token.to_string(),
        expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
    }
}

#[tokio::test]
async fn tokens_are_found_by_string_and_owner() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (player_id, round_id) = seed(txn).await?;
            let created =
                pick_tokens_sea::create_token(txn, new_token(player_id, round_id, "tok-a")).await?;
            assert_eq!(created.used_at, None);

            let by_string = pick_tokens_sea::find_by_token(txn, "tok-a").await?;
            assert_eq!(by_string.map(|t| t.id), Some(created.id));
            let by_owner = pick_tokens_sea::find_by_player_and_round(txn, player_id, round_id).await?;
            assert_eq!(by_owner.map(|t| t.id), Some(created.id));
            assert!(pick_tokens_sea::find_by_token(txn, "tok-b").await?.is_none());
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn used_tokens_stay_used() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (player_id, round_id) = seed(txn).await?;
            let created =
                pick_tokens_sea::create_token(txn, new_token(player_id, round_id, "tok-a")).await?;

            let now = OffsetDateTime::now_utc();
            assert_eq!(pick_tokens_sea::mark_used(txn, created.id, now).await?, 1);
            assert_eq!(pick_tokens_sea::mark_used(txn, created.id, now).await?, 0);

            let err: AppError = pick_tokens_sea::rotate_token(
                txn,
                PickTokenRotate {
                    id: created.id,
                    token: "tok-b".to_string(),
                    expires_at: now + Duration::hours(1),
                },
            )
            .await
            .unwrap_err()
            .into();
            assert_eq!(err.code(), ErrorCode::TokenNotFound);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn rotation_replaces_the_token_string() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (player_id, round_id) = seed(txn).await?;
            let created =
                pick_tokens_sea::create_token(txn, new_token(player_id, round_id, "tok-a")).await?;

            let rotated = pick_tokens_sea::rotate_token(
                txn,
                PickTokenRotate {
                    id: created.id,
                    token: "tok-b".to_string(),
                    expires_at: OffsetDateTime::now_utc() + Duration::hours(2),
                },
            )
            .await?;
            assert_eq!(rotated.id, created.id);
            assert_eq!(rotated.token, "tok-b");
            assert!(pick_tokens_sea::find_by_token(txn, "tok-a").await?.is_none());
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn second_token_for_same_round_is_a_conflict() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let (player_id, round_id) = seed(txn).await?;
            pick_tokens_sea::create_token(txn, new_token(player_id, round_id, "tok-a")).await?;

            let err: AppError =
                pick_tokens_sea::create_token(txn, new_token(player_id, round_id, "tok-b"))
                    .await
                    .unwrap_err()
                    .into();
            assert_eq!(err.code(), ErrorCode::AlreadyHasToken);
            Ok::<_, AppError>(())
        })
    })
    .await
}
