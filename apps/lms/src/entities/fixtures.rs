use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fixture_result")]
pub enum FixtureResult {
    #[sea_orm(string_value = "HOME_WIN")]
    HomeWin,
    #[sea_orm(string_value = "AWAY_WIN")]
    AwayWin,
    #[sea_orm(string_value = "DRAW")]
    Draw,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fixtures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "round_id")]
    pub round_id: i64,
    #[sea_orm(column_name = "home_team")]
    pub home_team: String,
    #[sea_orm(column_name = "away_team")]
    pub away_team: String,
    #[sea_orm(column_name = "kickoff_at")]
    pub kickoff_at: Option<OffsetDateTime>,
    pub result: Option<FixtureResult>,
    #[sea_orm(column_name = "result_recorded_at")]
    pub result_recorded_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id"
    )]
    Round,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
