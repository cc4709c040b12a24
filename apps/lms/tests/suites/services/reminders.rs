// Reminder scheduling for players yet to pick.

use lms::db::txn::with_txn;
use lms::errors::ErrorCode;
use lms::repos::reminders;
use lms::services::reminders::ReminderScheduler;
use lms::AppError;
use time::{Duration, OffsetDateTime};

use crate::support::build_test_state;
use crate::support::factory::{create_players, open_round, open_round_with_kickoff, submit};

fn scheduler() -> ReminderScheduler {
    ReminderScheduler::new(vec![Duration::hours(24), Duration::hours(1)])
}

#[tokio::test]
async fn schedules_once_per_player_and_offset() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let now = OffsetDateTime::now_utc();
            let kickoff = now + Duration::hours(48);
            let ps = create_players(txn, 3).await?;
            let (round, _) =
                open_round_with_kickoff(txn, Some(kickoff), &[("Arsenal", "Chelsea")]).await?;
            submit(txn, ps[0].id, "Arsenal").await?;

            let created = scheduler().schedule_for_current_round(txn, now).await?;
            assert_eq!(created.len(), 4);
            assert!(created.iter().all(|r| r.player_id != ps[0].id));
            assert!(created.iter().all(|r| r.round_id == round.id));

            let again = scheduler().schedule_for_current_round(txn, now).await?;
            assert!(again.is_empty());
            assert_eq!(reminders::find_all_by_round(txn, round.id).await?.len(), 4);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn past_send_times_are_skipped() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let now = OffsetDateTime::now_utc();
            let kickoff = now + Duration::hours(3);
            create_players(txn, 2).await?;
            open_round_with_kickoff(txn, Some(kickoff), &[("Arsenal", "Chelsea")]).await?;

            let created = scheduler().schedule_for_current_round(txn, now).await?;
            assert_eq!(created.len(), 2);
            assert!(created.iter().all(|r| r.offset == Duration::hours(1)));
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn nothing_to_schedule_without_a_deadline() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let now = OffsetDateTime::now_utc();
            create_players(txn, 2).await?;
            assert!(scheduler().schedule_for_current_round(txn, now).await?.is_empty());

            open_round(txn, &[("Arsenal", "Chelsea")]).await?;
            assert!(scheduler().schedule_for_current_round(txn, now).await?.is_empty());
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn due_reminders_skip_players_who_picked_or_were_sent() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let now = OffsetDateTime::now_utc();
            let kickoff = now + Duration::hours(48);
            let ps = create_players(txn, 2).await?;
            open_round_with_kickoff(txn, Some(kickoff), &[("Arsenal", "Chelsea")]).await?;
            scheduler().schedule_for_current_round(txn, now).await?;

            assert!(scheduler().due_reminders(txn, now).await?.is_empty());

            let later = kickoff - Duration::hours(23);
            let due = scheduler().due_reminders(txn, later).await?;
            assert_eq!(due.len(), 2);
            assert!(due.iter().all(|r| r.offset == Duration::hours(24)));

            submit(txn, ps[0].id, "Arsenal").await?;
            let due = scheduler().due_reminders(txn, later).await?;
            assert_eq!(due.len(), 1);
            assert_eq!(due[0].player_id, ps[1].id);

            let sent = scheduler().mark_sent(txn, due[0].id, later).await?;
            assert!(sent.sent_at.is_some());
            assert!(scheduler().due_reminders(txn, later).await?.is_empty());

            let resent = scheduler()
                .mark_sent(txn, due[0].id, later + Duration::hours(1))
                .await?;
            assert_eq!(resent.sent_at, sent.sent_at);
            Ok::<_, AppError>(())
        })
    })
    .await
}

#[tokio::test]
async fn marking_unknown_reminder_fails() -> Result<(), AppError> {
    let state = build_test_state().await?;

    with_txn(None, &state, |txn| {
        Box::pin(async move {
            let err = scheduler()
                .mark_sent(txn, 9_999, OffsetDateTime::now_utc())
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::ReminderNotFound);
            Ok::<_, AppError>(())
        })
    })
    .await
}
