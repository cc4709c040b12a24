//! SeaORM adapter for the round store.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::rounds::{self, RoundStatus};
use crate::infra::db_errors::not_found_err;

pub mod dto;

pub use dto::RoundCreate;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Option<rounds::Model>, sea_orm::DbErr> {
    rounds::Entity::find_by_id(round_id).one(conn).await
}

pub async fn require_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<rounds::Model, sea_orm::DbErr> {
    find_by_id(conn, round_id)
        .await?
        .ok_or_else(|| not_found_err("round", round_id))
}

/// Rounds ordered by (cycle_number, round_number), optionally for one cycle.
pub async fn find_history<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: Option<i32>,
) -> Result<Vec<rounds::Model>, sea_orm::DbErr> {
    let mut query = rounds::Entity::find();
    if let Some(cycle) = cycle_number {
        query = query.filter(rounds::Column::CycleNumber.eq(cycle));
    }
    query
        .order_by_asc(rounds::Column::CycleNumber)
        .order_by_asc(rounds::Column::RoundNumber)
        .all(conn)
        .await
}

/// Highest cycle number present in the store.
pub async fn latest_cycle_number<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Option<i32>, sea_orm::DbErr> {
    rounds::Entity::find()
        .select_only()
        .column_as(Expr::col(rounds::Column::CycleNumber).max(), "max_cycle")
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await
        .map(Option::flatten)
}

pub async fn max_round_number<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cycle_number: i32,
) -> Result<Option<i32>, sea_orm::DbErr> {
    rounds::Entity::find()
        .select_only()
        .column_as(Expr::col(rounds::Column::RoundNumber).max(), "max_round")
        .filter(rounds::Column::CycleNumber.eq(cycle_number))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await
        .map(Option::flatten)
}

pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoundCreate,
) -> Result<rounds::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let round = rounds::ActiveModel {
        id: NotSet,
        cycle_number: Set(dto.cycle_number),
        round_number: Set(dto.round_number),
        status: Set(RoundStatus::Pending),
        first_kickoff_at: Set(dto.first_kickoff_at),
        created_at: Set(now),
        updated_at: Set(now),
        activated_at: Set(None),
        completed_at: Set(None),
    };
    round.insert(conn).await
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    let result = rounds::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}
