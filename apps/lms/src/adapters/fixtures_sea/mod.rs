//! SeaORM adapter for round fixtures.

use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::fixtures;
use crate::infra::db_errors::not_found_err;

pub mod dto;

pub use dto::{FixtureCreate, FixtureSetResult};

pub async fn create_fixture<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: FixtureCreate,
) -> Result<fixtures::Model, sea_orm::DbErr> {
    let fixture = fixtures::ActiveModel {
        id: NotSet,
        round_id: Set(dto.round_id),
        home_team: Set(dto.home_team),
        away_team: Set(dto.away_team),
        kickoff_at: Set(dto.kickoff_at),
        result: Set(None),
        result_recorded_at: Set(None),
        created_at: Set(time::OffsetDateTime::now_utc()),
    };
    fixture.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fixture_id: i64,
) -> Result<Option<fixtures::Model>, sea_orm::DbErr> {
    fixtures::Entity::find_by_id(fixture_id).one(conn).await
}

pub async fn require_fixture<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    fixture_id: i64,
) -> Result<fixtures::Model, sea_orm::DbErr> {
    find_by_id(conn, fixture_id)
        .await?
        .ok_or_else(|| not_found_err("fixture", fixture_id))
}

pub async fn find_all_by_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<fixtures::Model>, sea_orm::DbErr> {
    fixtures::Entity::find()
        .filter(fixtures::Column::RoundId.eq(round_id))
        .order_by_asc(fixtures::Column::Id)
        .all(conn)
        .await
}

pub async fn set_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: FixtureSetResult,
) -> Result<fixtures::Model, sea_orm::DbErr> {
    let result = fixtures::Entity::update_many()
        .col_expr(
            fixtures::Column::Result,
            Expr::val(dto.result).as_enum(Alias::new("fixture_result")),
        )
        .col_expr(
            fixtures::Column::ResultRecordedAt,
            Expr::value(Some(time::OffsetDateTime::now_utc())),
        )
        .filter(fixtures::Column::Id.eq(dto.fixture_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(not_found_err("fixture", dto.fixture_id));
    }
    require_fixture(conn, dto.fixture_id).await
}

pub async fn delete_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    let result = fixtures::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}
