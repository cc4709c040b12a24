// Pick token issuance against the current round.

use lms::db::txn::with_txn;
use lms::errors::ErrorCode;
use lms::repos::{pick_tokens, players};
use lms::services::tokens::{PickTokenIssuer, TokenIssue};
use lms::utils::token_code::TOKEN_LEN;
use lms::AppError;
use time::{Duration, OffsetDateTime};

use crate::support::build_test_state;
use crate::support::factory::{create_players, open_round, submit};

fn issuer() -> PickTokenIssuer {
    PickTokenIssuer::new(Duration::hours(24))
}

#[tokio::test]
async fn live_token_is_reused() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let (round, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;

            let first = issuer().issue(txn, ps[0].id).await?;
            assert!(first.is_minted());
            assert_eq!(first.token().round_id, round.id);
            assert_eq!(first.token().player_id, ps[0].id);
            assert_eq!(first.token().token.len(), TOKEN_LEN);

            let second = issuer().issue(txn, ps[0].id).await?;
            assert!(matches!(second, TokenIssue::Reused(_)));
            assert_eq!(second.token().token, first.token().token);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn expired_token_is_rotated() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let short = PickTokenIssuer::new(Duration::hours(1));
            let now = OffsetDateTime::now_utc();

            let old = short
                .issue_at(txn, ps[0].id, now - Duration::hours(2))
                .await?
                .into_token();
            let fresh = short.issue_at(txn, ps[0].id, now).await?;

            assert!(fresh.is_minted());
            assert_eq!(fresh.token().id, old.id);
            assert_ne!(fresh.token().token, old.token);
            assert!(!fresh.token().is_expired(now));
            assert!(pick_tokens::find_by_token(txn, &old.token).await?.is_none());
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn no_open_round_means_no_token() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let err = issuer().issue(txn, ps[0].id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::NoActiveRound);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn players_who_picked_get_no_token() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            submit(txn, ps[0].id, "Arsenal").await?;

            let err = issuer().issue(txn, ps[0].id).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::AlreadyPicked);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn only_active_players_get_tokens() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 2).await?;
            let (round, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            players::eliminate(txn, &[ps[0].id], round.id).await?;
            players::mark_winner(txn, ps[1].id).await?;

            for p in &ps {
                let err = issuer().issue(txn, p.id).await.unwrap_err();
                assert_eq!(err.code(), ErrorCode::PlayerNotActive);
            }

            let err = issuer().issue(txn, 9_999).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::PlayerNotFound);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn tokens_follow_the_current_round() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let (first, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let old = issuer().issue(txn, ps[0].id).await?.into_token();
            assert_eq!(old.round_id, first.id);

            let (second, _) = open_round(txn, &[("Spurs", "Wolves")]).await?;
            let new = issuer().issue(txn, ps[0].id).await?;
            assert!(new.is_minted());
            assert_eq!(new.token().round_id, second.id);
            assert_ne!(new.token().id, old.id);
            Ok::<_, AppError>(())
        })
    })
    .await
}
