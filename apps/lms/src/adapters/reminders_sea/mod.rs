//! SeaORM adapter for reminder schedules.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::reminder_schedules;
use crate::infra::db_errors::not_found_err;

pub mod dto;

pub use dto::ReminderCreate;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reminder_id: i64,
) -> Result<Option<reminder_schedules::Model>, sea_orm::DbErr> {
    reminder_schedules::Entity::find_by_id(reminder_id)
        .one(conn)
        .await
}

pub async fn require_reminder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reminder_id: i64,
) -> Result<reminder_schedules::Model, sea_orm::DbErr> {
    find_by_id(conn, reminder_id)
        .await?
        .ok_or_else(|| not_found_err("reminder", reminder_id))
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<reminder_schedules::Model>, sea_orm::DbErr> {
    reminder_schedules::Entity::find()
        .filter(reminder_schedules::Column::RoundId.eq(round_id))
        .order_by_asc(reminder_schedules::Column::ScheduledAt)
        .order_by_asc(reminder_schedules::Column::Id)
        .all(conn)
        .await
}

pub async fn create_reminder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ReminderCreate,
) -> Result<reminder_schedules::Model, sea_orm::DbErr> {
    let reminder = reminder_schedules::ActiveModel {
        id: NotSet,
        player_id: Set(dto.player_id),
        round_id: Set(dto.round_id),
        offset_minutes: Set(dto.offset_minutes),
        scheduled_at: Set(dto.scheduled_at),
        sent_at: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
    };
    reminder.insert(conn).await
}

/// Unsent reminders for `round_id` scheduled at or before `now`.
pub async fn find_due<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    now: OffsetDateTime,
) -> Result<Vec<reminder_schedules::Model>, sea_orm::DbErr> {
    reminder_schedules::Entity::find()
        .filter(reminder_schedules::Column::RoundId.eq(round_id))
        .filter(reminder_schedules::Column::SentAt.is_null())
        .filter(reminder_schedules::Column::ScheduledAt.lte(now))
        .order_by_asc(reminder_schedules::Column::ScheduledAt)
        .order_by_asc(reminder_schedules::Column::Id)
        .all(conn)
        .await
}

/// Idempotent: an already-sent reminder keeps its first `sent_at`.
pub async fn mark_sent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    reminder_id: i64,
    sent_at: OffsetDateTime,
) -> Result<reminder_schedules::Model, sea_orm::DbErr> {
    reminder_schedules::Entity::update_many()
        .col_expr(reminder_schedules::Column::SentAt, Expr::value(Some(sent_at)))
        .filter(reminder_schedules::Column::Id.eq(reminder_id))
        .filter(reminder_schedules::Column::SentAt.is_null())
        .exec(conn)
        .await?;
    require_reminder(conn, reminder_id).await
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    let result = reminder_schedules::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}
