//! SeaORM adapter for pick tokens.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set,
};

use crate::entities::pick_tokens;
use crate::infra::db_errors::not_found_err;

pub mod dto;

pub use dto::{PickTokenCreate, PickTokenRotate};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token_id: i64,
) -> Result<Option<pick_tokens::Model>, sea_orm::DbErr> {
    pick_tokens::Entity::find_by_id(token_id).one(conn).await
}

pub async fn find_by_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token: &str,
) -> Result<Option<pick_tokens::Model>, sea_orm::DbErr> {
    pick_tokens::Entity::find()
        .filter(pick_tokens::Column::Token.eq(token))
        .one(conn)
        .await
}

pub async fn find_by_player_and_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
) -> Result<Option<pick_tokens::Model>, sea_orm::DbErr> {
    pick_tokens::Entity::find()
        .filter(pick_tokens::Column::PlayerId.eq(player_id))
        .filter(pick_tokens::Column::RoundId.eq(round_id))
        .one(conn)
        .await
}

pub async fn create_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickTokenCreate,
) -> Result<pick_tokens::Model, sea_orm::DbErr> {
    let token = pick_tokens::ActiveModel {
        id: NotSet,
        player_id: Set(dto.player_id),
        round_id: Set(dto.round_id),
        token: Set(dto.token),
        expires_at: Set(dto.expires_at),
        used_at: Set(None),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    token.insert(conn).await
}

/// Only unused tokens rotate.
pub async fn rotate_token<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PickTokenRotate,
) -> Result<pick_tokens::Model, sea_orm::DbErr> {
    let result = pick_tokens::Entity::update_many()
        .col_expr(pick_tokens::Column::Token, Expr::value(dto.token))
        .col_expr(pick_tokens::Column::ExpiresAt, Expr::value(dto.expires_at))
        .col_expr(
            pick_tokens::Column::CreatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .filter(pick_tokens::Column::Id.eq(dto.id))
        .filter(pick_tokens::Column::UsedAt.is_null())
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(not_found_err("pick_token", dto.id));
    }
    find_by_id(conn, dto.id)
        .await?
        .ok_or_else(|| not_found_err("pick_token", dto.id))
}

/// Consume a token. Returns rows changed: 0 when it was already used.
pub async fn mark_used<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    token_id: i64,
    used_at: time::OffsetDateTime,
) -> Result<u64, sea_orm::DbErr> {
    let result = pick_tokens::Entity::update_many()
        .col_expr(pick_tokens::Column::UsedAt, Expr::value(Some(used_at)))
        .filter(pick_tokens::Column::Id.eq(token_id))
        .filter(pick_tokens::Column::UsedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    let result = pick_tokens::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}
