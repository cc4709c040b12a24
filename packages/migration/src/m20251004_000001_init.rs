use sea_orm::Statement;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::extension::postgres::Type as PgType;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Competition {
    Table,
    Id,
    LockVersion,
}

#[derive(Iden)]
enum Rounds {
    Table,
    Id,
    CycleNumber,
    RoundNumber,
    Status,
    FirstKickoffAt,
    CreatedAt,
    UpdatedAt,
    ActivatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    Name,
    Contact,
    Status,
    EliminatedRoundId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Fixtures {
    Table,
    Id,
    RoundId,
    HomeTeam,
    AwayTeam,
    KickoffAt,
    Result,
    ResultRecordedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Picks {
    Table,
    Id,
    PlayerId,
    RoundId,
    FixtureId,
    Selection,
    Outcome,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PickTokens {
    Table,
    Id,
    PlayerId,
    RoundId,
    Token,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

#[derive(Iden)]
enum ReminderSchedules {
    Table,
    Id,
    PlayerId,
    RoundId,
    OffsetMinutes,
    ScheduledAt,
    SentAt,
    CreatedAt,
}

#[derive(Iden)]
enum RoundStatusEnum {
    #[iden = "round_status"]
    Type,
}

#[derive(Iden)]
enum PlayerStatusEnum {
    #[iden = "player_status"]
    Type,
}

#[derive(Iden)]
enum FixtureResultEnum {
    #[iden = "fixture_result"]
    Type,
}

#[derive(Iden)]
enum PickOutcomeEnum {
    #[iden = "pick_outcome"]
    Type,
}

const ROUND_STATUS_VALUES: [&str; 3] = ["PENDING", "ACTIVE", "COMPLETED"];
const PLAYER_STATUS_VALUES: [&str; 3] = ["ACTIVE", "ELIMINATED", "WINNER"];
const FIXTURE_RESULT_VALUES: [&str; 3] = ["HOME_WIN", "AWAY_WIN", "DRAW"];
const PICK_OUTCOME_VALUES: [&str; 3] = ["PENDING", "WON", "LOST"];

async fn pg_enum_exists(manager: &SchemaManager<'_>, enum_name: &str) -> Result<bool, DbErr> {
    let result = manager
        .get_connection()
        .query_one(Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1 FROM pg_type WHERE typname = $1",
            [enum_name.into()],
        ))
        .await?;
    Ok(result.is_some())
}

async fn create_pg_enum<T>(
    manager: &SchemaManager<'_>,
    name: T,
    type_name: &str,
    values: [&'static str; 3],
) -> Result<(), DbErr>
where
    T: IntoIden,
{
    if pg_enum_exists(manager, type_name).await? {
        return Ok(());
    }
    manager
        .create_type(PgType::create().as_enum(name).values(values).to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enum types exist only on Postgres; SQLite stores TEXT guarded by CHECK constraints
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => {
                create_pg_enum(manager, RoundStatusEnum::Type, "round_status", ROUND_STATUS_VALUES)
                    .await?;
                create_pg_enum(
                    manager,
                    PlayerStatusEnum::Type,
                    "player_status",
                    PLAYER_STATUS_VALUES,
                )
                .await?;
                create_pg_enum(
                    manager,
                    FixtureResultEnum::Type,
                    "fixture_result",
                    FIXTURE_RESULT_VALUES,
                )
                .await?;
                create_pg_enum(manager, PickOutcomeEnum::Type, "pick_outcome", PICK_OUTCOME_VALUES)
                    .await?;
            }
            sea_orm::DatabaseBackend::Sqlite => {}
            _ => {
                return Err(DbErr::Custom("Unsupported database backend".into()));
            }
        }

        // competition: singleton row serializing lifecycle writers
        manager
            .create_table(
                Table::create()
                    .table(Competition::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Competition::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Competition::LockVersion)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Competition::Table)
                    .columns([Competition::Id, Competition::LockVersion])
                    .values([1.into(), 0.into()])
                    .map_err(|e| DbErr::Custom(format!("competition seed: {e}")))?
                    .to_owned(),
            )
            .await?;

        // rounds
        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rounds::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Rounds::CycleNumber).integer().not_null())
                    .col(ColumnDef::new(Rounds::RoundNumber).integer().not_null())
                    .col(
                        ColumnDef::new(Rounds::Status)
                            .custom(RoundStatusEnum::Type)
                            .not_null()
                            .default("PENDING")
                            .check(Expr::col(Rounds::Status).is_in(ROUND_STATUS_VALUES)),
                    )
                    .col(
                        ColumnDef::new(Rounds::FirstKickoffAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::ActivatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rounds::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_rounds_cycle_round")
                    .table(Rounds::Table)
                    .col(Rounds::CycleNumber)
                    .col(Rounds::RoundNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_rounds_status")
                    .table(Rounds::Table)
                    .col(Rounds::Status)
                    .to_owned(),
            )
            .await?;

        // players
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::Contact).string().null())
                    .col(
                        ColumnDef::new(Players::Status)
                            .custom(PlayerStatusEnum::Type)
                            .not_null()
                            .default("ACTIVE")
                            .check(Expr::col(Players::Status).is_in(PLAYER_STATUS_VALUES)),
                    )
                    .col(
                        ColumnDef::new(Players::EliminatedRoundId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_eliminated_round_id")
                            .from(Players::Table, Players::EliminatedRoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_players_status")
                    .table(Players::Table)
                    .col(Players::Status)
                    .to_owned(),
            )
            .await?;

        // fixtures
        manager
            .create_table(
                Table::create()
                    .table(Fixtures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fixtures::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Fixtures::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(Fixtures::HomeTeam).string().not_null())
                    .col(ColumnDef::new(Fixtures::AwayTeam).string().not_null())
                    .col(
                        ColumnDef::new(Fixtures::KickoffAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Fixtures::Result)
                            .custom(FixtureResultEnum::Type)
                            .null()
                            .check(Expr::col(Fixtures::Result).is_in(FIXTURE_RESULT_VALUES)),
                    )
                    .col(
                        ColumnDef::new(Fixtures::ResultRecordedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Fixtures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_fixtures_round_id")
                            .from(Fixtures::Table, Fixtures::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_fixtures_round_id")
                    .table(Fixtures::Table)
                    .col(Fixtures::RoundId)
                    .to_owned(),
            )
            .await?;

        // picks
        manager
            .create_table(
                Table::create()
                    .table(Picks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Picks::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Picks::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(Picks::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(Picks::FixtureId).big_integer().not_null())
                    .col(ColumnDef::new(Picks::Selection).string().not_null())
                    .col(
                        ColumnDef::new(Picks::Outcome)
                            .custom(PickOutcomeEnum::Type)
                            .not_null()
                            .default("PENDING")
                            .check(Expr::col(Picks::Outcome).is_in(PICK_OUTCOME_VALUES)),
                    )
                    .col(
                        ColumnDef::new(Picks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Picks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_picks_player_id")
                            .from(Picks::Table, Picks::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_picks_round_id")
                            .from(Picks::Table, Picks::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_picks_fixture_id")
                            .from(Picks::Table, Picks::FixtureId)
                            .to(Fixtures::Table, Fixtures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_picks_player_round")
                    .table(Picks::Table)
                    .col(Picks::PlayerId)
                    .col(Picks::RoundId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_picks_round_id")
                    .table(Picks::Table)
                    .col(Picks::RoundId)
                    .to_owned(),
            )
            .await?;

        // pick_tokens
        manager
            .create_table(
                Table::create()
                    .table(PickTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PickTokens::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(PickTokens::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(PickTokens::RoundId).big_integer().not_null())
                    .col(ColumnDef::new(PickTokens::Token).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PickTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickTokens::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PickTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pick_tokens_player_id")
                            .from(PickTokens::Table, PickTokens::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pick_tokens_round_id")
                            .from(PickTokens::Table, PickTokens::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_pick_tokens_player_round")
                    .table(PickTokens::Table)
                    .col(PickTokens::PlayerId)
                    .col(PickTokens::RoundId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_pick_tokens_token")
                    .table(PickTokens::Table)
                    .col(PickTokens::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // reminder_schedules
        manager
            .create_table(
                Table::create()
                    .table(ReminderSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReminderSchedules::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::RoundId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::OffsetMinutes)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::SentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReminderSchedules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reminder_schedules_player_id")
                            .from(ReminderSchedules::Table, ReminderSchedules::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reminder_schedules_round_id")
                            .from(ReminderSchedules::Table, ReminderSchedules::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_reminder_schedules_player_round_offset")
                    .table(ReminderSchedules::Table)
                    .col(ReminderSchedules::PlayerId)
                    .col(ReminderSchedules::RoundId)
                    .col(ReminderSchedules::OffsetMinutes)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_reminder_schedules_scheduled_at")
                    .table(ReminderSchedules::Table)
                    .col(ReminderSchedules::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation; indexes go with their tables
        manager
            .drop_table(
                Table::drop()
                    .table(ReminderSchedules::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(PickTokens::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Picks::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Fixtures::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Players::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rounds::Table).if_exists().to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Competition::Table).if_exists().to_owned())
            .await?;

        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => {
                manager
                    .drop_type(
                        PgType::drop()
                            .name(PickOutcomeEnum::Type)
                            .if_exists()
                            .to_owned(),
                    )
                    .await?;

                manager
                    .drop_type(
                        PgType::drop()
                            .name(FixtureResultEnum::Type)
                            .if_exists()
                            .to_owned(),
                    )
                    .await?;

                manager
                    .drop_type(
                        PgType::drop()
                            .name(PlayerStatusEnum::Type)
                            .if_exists()
                            .to_owned(),
                    )
                    .await?;

                manager
                    .drop_type(
                        PgType::drop()
                            .name(RoundStatusEnum::Type)
                            .if_exists()
                            .to_owned(),
                    )
                    .await?;
            }
            sea_orm::DatabaseBackend::Sqlite => {}
            _ => {
                return Err(DbErr::Custom("Unsupported database backend".into()));
            }
        }

        Ok(())
    }
}
