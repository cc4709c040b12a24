//! The only code that reads rounds by status or writes `rounds.status`.

use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use time::OffsetDateTime;

use crate::entities::competition;
use crate::entities::rounds::{self, RoundStatus};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::rounds::Round;

const COMPETITION_ID: i32 = 1;

fn status_expr(status: RoundStatus) -> SimpleExpr {
    Expr::val(status).as_enum(Alias::new("round_status"))
}

/// Bump the competition row. Row lock on Postgres, write lock on SQLite:
/// a second lifecycle writer waits here until the first commits.
pub(super) async fn lock_competition<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<(), DomainError> {
    let result = competition::Entity::update_many()
        .col_expr(
            competition::Column::LockVersion,
            Expr::col(competition::Column::LockVersion).add(1),
        )
        .filter(competition::Column::Id.eq(COMPETITION_ID))
        .exec(conn)
        .await?;
    if result.rows_affected != 1 {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            "competition row is missing",
        ));
    }
    Ok(())
}

/// Every round flagged active, in id order. May hold more than one.
pub(super) async fn find_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Round>, DomainError> {
    let active = rounds::Entity::find()
        .filter(rounds::Column::Status.eq(RoundStatus::Active))
        .order_by_asc(rounds::Column::Id)
        .all(conn)
        .await?;
    Ok(active.into_iter().map(Round::from).collect())
}

/// Highest cycle with a round that has left `pending`.
pub(super) async fn latest_played_cycle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Option<i32>, DomainError> {
    let latest = rounds::Entity::find()
        .select_only()
        .column_as(Expr::col(rounds::Column::CycleNumber).max(), "max_cycle")
        .filter(rounds::Column::Status.ne(RoundStatus::Pending))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await?;
    Ok(latest.flatten())
}

/// active -> completed for each id. Rounds in any other state are untouched.
pub(super) async fn mark_completed<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_ids: &[i64],
) -> Result<u64, DomainError> {
    if round_ids.is_empty() {
        return Ok(0);
    }
    let now = OffsetDateTime::now_utc();
    let result = rounds::Entity::update_many()
        .col_expr(rounds::Column::Status, status_expr(RoundStatus::Completed))
        .col_expr(rounds::Column::CompletedAt, Expr::value(Some(now)))
        .col_expr(rounds::Column::UpdatedAt, Expr::value(now))
        .filter(rounds::Column::Id.is_in(round_ids.iter().copied()))
        .filter(rounds::Column::Status.eq(RoundStatus::Active))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// pending -> active. Returns rows changed: 0 if the round was not pending.
pub(super) async fn mark_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<u64, DomainError> {
    let now = OffsetDateTime::now_utc();
    let result = rounds::Entity::update_many()
        .col_expr(rounds::Column::Status, status_expr(RoundStatus::Active))
        .col_expr(rounds::Column::ActivatedAt, Expr::value(Some(now)))
        .col_expr(rounds::Column::UpdatedAt, Expr::value(now))
        .filter(rounds::Column::Id.eq(round_id))
        .filter(rounds::Column::Status.eq(RoundStatus::Pending))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
