//! SeaORM adapter for picks.

use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use crate::entities::picks::{self, PickOutcome};
use crate::entities::rounds;

pub mod dto;

pub use dto::{PickCreate, PickSetOutcome};

pub async fn create_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickCreate,
) -> Result<picks::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let pick = picks::ActiveModel {
        id: NotSet,
        player_id: Set(dto.player_id),
        round_id: Set(dto.round_id),
        fixture_id: Set(dto.fixture_id),
        selection: Set(dto.selection),
        outcome: Set(PickOutcome::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };
    pick.insert(conn).await
}

pub async fn find_by_player_and_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
) -> Result<Option<picks::Model>, sea_orm::DbErr> {
    picks::Entity::find()
        .filter(picks::Column::PlayerId.eq(player_id))
        .filter(picks::Column::RoundId.eq(round_id))
        .one(conn)
        .await
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<picks::Model>, sea_orm::DbErr> {
    picks::Entity::find()
        .filter(picks::Column::RoundId.eq(round_id))
        .order_by_asc(picks::Column::Id)
        .all(conn)
        .await
}

pub async fn count_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    picks::Entity::find()
        .filter(picks::Column::RoundId.eq(round_id))
        .count(conn)
        .await
}

/// Selections a player made in other rounds of `cycle_number`.
pub async fn selections_in_cycle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    cycle_number: i32,
    excluding_round_id: i64,
) -> Result<Vec<String>, sea_orm::DbErr> {
    picks::Entity::find()
        .select_only()
        .column(picks::Column::Selection)
        .join(JoinType::InnerJoin, picks::Relation::Round.def())
        .filter(picks::Column::PlayerId.eq(player_id))
        .filter(picks::Column::RoundId.ne(excluding_round_id))
        .filter(rounds::Column::CycleNumber.eq(cycle_number))
        .order_by_asc(picks::Column::Id)
        .into_tuple::<String>()
        .all(conn)
        .await
}

pub async fn set_outcome<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickSetOutcome,
) -> Result<u64, sea_orm::DbErr> {
    let result = picks::Entity::update_many()
        .col_expr(
            picks::Column::Outcome,
            Expr::val(dto.outcome).as_enum(Alias::new("pick_outcome")),
        )
        .col_expr(
            picks::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(picks::Column::Id.eq(dto.pick_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    let result = picks::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}
