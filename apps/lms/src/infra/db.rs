use db_infra::config::db::{DbKind, RuntimeEnv};
use db_infra::{build_runtime_pool, orchestrate_migration, orchestrate_migration_internal};
use migration::MigrationCommand;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::error::AppError;

/// Connect the application pool and bring the schema up to date.
///
/// In-memory SQLite has no second connection to migrate through, so the
/// runtime pool migrates itself; other engines migrate via the owner pool first.
pub async fn bootstrap_db(env: RuntimeEnv, db_kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let pool = match db_kind {
        DbKind::SqliteMemory => {
            let pool = build_runtime_pool(env, db_kind).await?;
            orchestrate_migration_internal(&pool, env, db_kind, MigrationCommand::Up).await?;
            pool
        }
        DbKind::Postgres | DbKind::SqliteFile => {
            orchestrate_migration(env, db_kind, MigrationCommand::Up).await?;
            build_runtime_pool(env, db_kind).await?
        }
    };

    info!(env = ?env, db_kind = ?db_kind, "database ready");
    Ok(pool)
}
