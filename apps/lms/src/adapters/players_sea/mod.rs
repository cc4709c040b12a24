//! SeaORM adapter for the player registry.

use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::players::{self, PlayerStatus};
use crate::infra::db_errors::not_found_err;

pub mod dto;

pub use dto::PlayerCreate;

fn status_expr(status: PlayerStatus) -> sea_orm::sea_query::SimpleExpr {
    Expr::val(status).as_enum(Alias::new("player_status"))
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<players::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let player = players::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        contact: Set(dto.contact),
        status: Set(PlayerStatus::Active),
        eliminated_round_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    player.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<players::Model>, sea_orm::DbErr> {
    players::Entity::find_by_id(player_id).one(conn).await
}

pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<players::Model, sea_orm::DbErr> {
    find_by_id(conn, player_id)
        .await?
        .ok_or_else(|| not_found_err("player", player_id))
}

pub async fn list_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: PlayerStatus,
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::Status.eq(status))
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await
}

pub async fn ids_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: PlayerStatus,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .filter(players::Column::Status.eq(status))
        .order_by_asc(players::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

pub async fn count_by_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: PlayerStatus,
) -> Result<u64, sea_orm::DbErr> {
    players::Entity::find()
        .filter(players::Column::Status.eq(status))
        .count(conn)
        .await
}

/// Eliminate the given players if they are still active. Returns rows changed.
pub async fn eliminate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_ids: &[i64],
    round_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    if player_ids.is_empty() {
        return Ok(0);
    }
    let result = players::Entity::update_many()
        .col_expr(players::Column::Status, status_expr(PlayerStatus::Eliminated))
        .col_expr(players::Column::EliminatedRoundId, Expr::value(round_id))
        .col_expr(
            players::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(players::Column::Id.is_in(player_ids.iter().copied()))
        .filter(players::Column::Status.eq(PlayerStatus::Active))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Set the players to active and clear their elimination round.
pub async fn reinstate<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_ids: &[i64],
) -> Result<u64, sea_orm::DbErr> {
    if player_ids.is_empty() {
        return Ok(0);
    }
    let result = players::Entity::update_many()
        .col_expr(players::Column::Status, status_expr(PlayerStatus::Active))
        .col_expr(
            players::Column::EliminatedRoundId,
            Expr::value(Option::<i64>::None),
        )
        .col_expr(
            players::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(players::Column::Id.is_in(player_ids.iter().copied()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Ids of eliminated players knocked out in one of `round_ids`.
pub async fn eliminated_in_rounds<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_ids: &[i64],
) -> Result<Vec<i64>, sea_orm::DbErr> {
    if round_ids.is_empty() {
        return Ok(Vec::new());
    }
    players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .filter(players::Column::Status.eq(PlayerStatus::Eliminated))
        .filter(players::Column::EliminatedRoundId.is_in(round_ids.iter().copied()))
        .order_by_asc(players::Column::Id)
        .into_tuple::<i64>()
        .all(conn)
        .await
}

pub async fn mark_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<players::Model, sea_orm::DbErr> {
    let result = players::Entity::update_many()
        .col_expr(players::Column::Status, status_expr(PlayerStatus::Winner))
        .col_expr(
            players::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(players::Column::Id.eq(player_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(not_found_err("player", player_id));
    }
    require_player(conn, player_id).await
}
