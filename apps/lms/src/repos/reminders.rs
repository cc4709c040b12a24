//! Reminder schedule storage.

use sea_orm::ConnectionTrait;
use time::{Duration, OffsetDateTime};

use crate::adapters::reminders_sea as reminders_adapter;
use crate::entities::reminder_schedules;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub player_id: i64,
    pub round_id: i64,
    /// Lead time before the round's first kickoff.
    pub offset: Duration,
    pub scheduled_at: OffsetDateTime,
    pub sent_at: Option<OffsetDateTime>,
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<Reminder>, DomainError> {
    let reminders = reminders_adapter::find_all_by_round(conn, round_id).await?;
    Ok(reminders.into_iter().map(Reminder::from).collect())
}

pub async fn create_reminder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
    offset: Duration,
    scheduled_at: OffsetDateTime,
) -> Result<Reminder, DomainError> {
    let dto = reminders_adapter::ReminderCreate {
        player_id,
        round_id,
        offset_minutes: offset.whole_minutes() as i32,
        scheduled_at,
    };
    Ok(Reminder::from(
        reminders_adapter::create_reminder(conn, dto).await?,
    ))
}

pub async fn find_due<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    now: OffsetDateTime,
) -> Result<Vec<Reminder>, DomainError> {
    let reminders = reminders_adapter::find_due(conn, round_id, now).await?;
    Ok(reminders.into_iter().map(Reminder::from).collect())
}

pub async fn mark_sent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reminder_id: i64,
    sent_at: OffsetDateTime,
) -> Result<Reminder, DomainError> {
    Ok(Reminder::from(
        reminders_adapter::mark_sent(conn, reminder_id, sent_at).await?,
    ))
}

pub(crate) async fn delete_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, DomainError> {
    Ok(reminders_adapter::delete_all(conn).await?)
}

impl From<reminder_schedules::Model> for Reminder {
    fn from(model: reminder_schedules::Model) -> Self {
        Self {
            id: model.id,
            player_id: model.player_id,
            round_id: model.round_id,
            offset: Duration::minutes(i64::from(model.offset_minutes)),
            scheduled_at: model.scheduled_at,
            sent_at: model.sent_at,
        }
    }
}
