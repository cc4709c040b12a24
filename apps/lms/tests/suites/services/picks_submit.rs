// Pick submission: token checks, selection rules and the deadline.

use std::collections::BTreeMap;

use lms::db::txn::with_txn;
use lms::domain::FixtureOutcome;
use lms::errors::ErrorCode;
use lms::repos::picks::{self, PickOutcome};
use lms::repos::{pick_tokens, players};
use lms::services::elimination::EliminationEngine;
use lms::services::picks::PickService;
use lms::services::tokens::PickTokenIssuer;
use lms::AppError;
use time::{Duration, OffsetDateTime};

use crate::support::build_test_state;
use crate::support::factory::{create_players, open_round, open_round_with_kickoff, submit};

fn issuer() -> PickTokenIssuer {
    PickTokenIssuer::new(Duration::hours(24))
}

#[tokio::test]
async fn pick_is_recorded_and_token_consumed() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let (round, fx) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let token = issuer().issue(txn, ps[0].id).await?.into_token();

            let pick = PickService.submit_pick(txn, &token.token, "  arsenal ").await?;
            assert_eq!(pick.player_id, ps[0].id);
            assert_eq!(pick.round_id, round.id);
            assert_eq!(pick.fixture_id, fx[0].id);
            assert_eq!(pick.selection, "Arsenal");
            assert_eq!(pick.outcome, PickOutcome::Pending);

            let stored = pick_tokens::require_by_token(txn, &token.token).await?;
            assert!(stored.is_used());
            assert_eq!(picks::count_by_round(txn, round.id).await?, 1);

            let err = PickService
                .submit_pick(txn, &token.token, "Chelsea")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::AlreadyPicked);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn unknown_and_expired_tokens_are_rejected() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            open_round(txn, &[("Arsenal", "Chelsea")]).await?;

            let err = PickService
                .submit_pick(txn, "no-such-token", "Arsenal")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::TokenNotFound);

            let now = OffsetDateTime::now_utc();
            let token = issuer().issue_at(txn, ps[0].id, now).await?.into_token();
            let err = PickService
                .submit_pick_at(txn, &token.token, "Arsenal", now + Duration::hours(25))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::TokenExpired);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn token_for_superseded_round_is_stale() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let token = issuer().issue(txn, ps[0].id).await?.into_token();
            open_round(txn, &[("Spurs", "Wolves")]).await?;

            let err = PickService
                .submit_pick(txn, &token.token, "Spurs")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::TokenStale);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn selection_must_play_in_the_round() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let token = issuer().issue(txn, ps[0].id).await?.into_token();

            for bad in ["Liverpool", "", "   "] {
                let err = PickService
                    .submit_pick(txn, &token.token, bad)
                    .await
                    .unwrap_err();
                assert_eq!(err.code(), ErrorCode::InvalidSelection);
            }

            // A rejected selection leaves the token usable.
            PickService.submit_pick(txn, &token.token, "Chelsea").await?;
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn team_cannot_be_picked_twice_in_a_cycle() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 2).await?;
            let (round, fx) = open_round(txn, &[("Arsenal", "Chelsea"), ("Spurs", "Wolves")]).await?;
            submit(txn, ps[0].id, "Arsenal").await?;
            submit(txn, ps[1].id, "Spurs").await?;
            let results = BTreeMap::from([
                (fx[0].id, FixtureOutcome::Winner("Arsenal".into())),
                (fx[1].id, FixtureOutcome::Winner("Spurs".into())),
            ]);
            EliminationEngine.finalize_round(txn, round.id, &results).await?;

            open_round(txn, &[("Arsenal", "Leeds")]).await?;
            let token = issuer().issue(txn, ps[0].id).await?.into_token();
            let err = PickService
                .submit_pick(txn, &token.token, "ARSENAL")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::SelectionReused);

            let pick = PickService.submit_pick(txn, &token.token, "Leeds").await?;
            assert_eq!(pick.selection, "Leeds");
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn picks_close_at_first_kickoff() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let now = OffsetDateTime::now_utc();
            let kickoff = now + Duration::hours(2);
            open_round_with_kickoff(txn, Some(kickoff), &[("Arsenal", "Chelsea")]).await?;
            let token = issuer().issue_at(txn, ps[0].id, now).await?.into_token();

            let err = PickService
                .submit_pick_at(txn, &token.token, "Arsenal", kickoff + Duration::minutes(1))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::DeadlinePassed);

            PickService
                .submit_pick_at(txn, &token.token, "Arsenal", kickoff - Duration::minutes(1))
                .await?;
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn eliminated_player_cannot_spend_a_token() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let ps = create_players(txn, 1).await?;
            let (round, _) = open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            let token = issuer().issue(txn, ps[0].id).await?.into_token();
            players::eliminate(txn, &[ps[0].id], round.id).await?;

            let err = PickService
                .submit_pick(txn, &token.token, "Arsenal")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::PlayerNotActive);
            Ok::<_, AppError>(())
        })
    })
    .await
}
