use std::future::Future;
use std::time::{Duration, Instant};

use migration::{migrate, MigrationCommand, Migrator, MigratorTrait};
use rand::Rng;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::{debug, info, trace, warn};

use crate::config::db::{
    build_connection_settings, build_session_statements, make_conn_spec, sqlite_lock_path,
    validate_db_config, DbKind, DbOwner, DbSettings, PoolPurpose, RuntimeEnv,
};
use crate::error::DbInfraError;
use crate::infra::db::locking::{BootstrapLock, InMemoryLock, PgAdvisoryLock, SqliteFileLock};

const MIGRATION_BODY_TIMEOUT: Duration = Duration::from_secs(120);

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "connection retry succeeded");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts,
                    interval_ms,
                    error = %e,
                    "connection attempt failed"
                );
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
        }
    }
}

async fn connect_with(
    db_kind: DbKind,
    url: &str,
    min_connections: u32,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DatabaseConnection, DbInfraError> {
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.min_connections(min_connections)
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .sqlx_logging(false);

    let connect = || {
        let opt = opt.clone();
        async move {
            Database::connect(opt)
                .await
                .map_err(|e| DbInfraError::Connect {
                    message: format!("failed to connect to {}: {e}", sanitize_db_url(url)),
                })
        }
    };

    // Only a remote server is worth retrying; SQLite either opens or it doesn't.
    if db_kind == DbKind::Postgres {
        retry_connection(connect, 5, 500).await
    } else {
        connect().await
    }
}

/// Single-connection pool with owner credentials, used for migrations and advisory locks.
pub async fn build_admin_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = make_conn_spec(env, db_kind, DbOwner::Owner)?;
    let settings = build_connection_settings(env, db_kind, PoolPurpose::Migration)?;
    connect_with(
        db_kind,
        &url,
        settings.min_connections,
        settings.max_connections,
        settings.acquire_timeout,
    )
    .await
}

/// Application pool with session settings applied.
pub async fn build_runtime_pool(
    env: RuntimeEnv,
    db_kind: DbKind,
) -> Result<DatabaseConnection, DbInfraError> {
    let url = make_conn_spec(env, db_kind, DbOwner::App)?;
    let settings = build_connection_settings(env, db_kind, PoolPurpose::Runtime)?;
    let pool = connect_with(
        db_kind,
        &url,
        settings.min_connections,
        settings.max_connections,
        settings.acquire_timeout,
    )
    .await?;
    apply_db_settings(&pool, &settings.db_settings, db_kind).await?;
    Ok(pool)
}

/// Mask the password in a connection string.
/// Used for lock keys and logging.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth, host)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    match auth.rfind(':') {
        Some(colon) if auth[..colon].contains("://") => {
            format!("{}:***@{}", &auth[..colon], host)
        }
        _ => url.to_string(),
    }
}

async fn schema_is_current(conn: &DatabaseConnection) -> Result<bool, DbInfraError> {
    let expected: Vec<String> = Migrator::migrations()
        .iter()
        .map(|m| m.name().to_string())
        .collect();

    let applied = match Migrator::get_applied_migrations(conn).await {
        Ok(migrations) => migrations,
        Err(DbErr::Exec(_)) => {
            trace!(fastpath = "miss", reason = "migration_table_missing");
            return Ok(false);
        }
        Err(e) => {
            return Err(DbInfraError::migration(format!(
                "failed to read applied migrations: {e}"
            )))
        }
    };

    let current = applied.len() == expected.len()
        && applied.last().map(|m| m.name()) == expected.last().map(String::as_str);
    trace!(
        fastpath = if current { "hit" } else { "miss" },
        applied = applied.len(),
        expected = expected.len()
    );
    Ok(current)
}

pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    validate_db_config(env, db_kind)?;
    let admin_pool = build_admin_pool(env, db_kind).await?;
    orchestrate_migration_internal(&admin_pool, env, db_kind, command).await
}

/// Run `command` on an existing pool under the engine's bootstrap lock.
/// In-memory SQLite must use this with the application pool itself.
pub async fn orchestrate_migration_internal(
    pool: &DatabaseConnection,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    info!(env = ?env, db_kind = ?db_kind, command = ?command, "migrate=start");

    if command == MigrationCommand::Status {
        migrate(pool, command)
            .await
            .map_err(|e| DbInfraError::migration(format!("status failed: {e}")))?;
        info!("migrate=done");
        return Ok(());
    }

    let result = match db_kind {
        DbKind::Postgres => {
            let url = make_conn_spec(env, db_kind, DbOwner::Owner)?;
            let key = format!("lms:migrate:{:?}:{}", db_kind, sanitize_db_url(&url));
            let lock = PgAdvisoryLock::new(pool.clone(), &key);
            migrate_with_lock(pool, lock, env, db_kind, command).await
        }
        DbKind::SqliteFile => {
            let lock = SqliteFileLock::new(&sqlite_lock_path(db_kind, env)?);
            migrate_with_lock(pool, lock, env, db_kind, command).await
        }
        DbKind::SqliteMemory => migrate_with_lock(pool, InMemoryLock, env, db_kind, command).await,
    };

    if let Err(e) = &result {
        let msg = e.message();
        if msg.contains("database is locked") || msg.contains("SQLITE_BUSY") {
            warn!(error = %e, "sqlite busy during migration");
        }
    }

    info!("migrate=done");
    result
}

async fn migrate_with_lock<L>(
    pool: &DatabaseConnection,
    mut lock: L,
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError>
where
    L: BootstrapLock,
{
    let connection_settings = build_connection_settings(env, db_kind, PoolPurpose::Migration)?;
    let lock_acquire_ms = std::env::var("LMS_MIGRATE_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(match env {
            RuntimeEnv::Test => 3000,
            RuntimeEnv::Prod => 900,
        });

    let start = Instant::now();
    let mut attempts: u32 = 0;
    let guard = loop {
        attempts += 1;

        if command == MigrationCommand::Up && schema_is_current(pool).await? {
            info!("migrate=skipped up_to_date=true");
            return Ok(());
        }

        if let Some(guard) = lock.try_acquire().await? {
            debug!(
                attempts,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "migration lock acquired"
            );
            break guard;
        }

        if start.elapsed() >= Duration::from_millis(lock_acquire_ms) {
            return Err(DbInfraError::migration(format!(
                "migration lock acquisition timeout after {:?} ({attempts} attempts)",
                start.elapsed()
            )));
        }

        let base_delay_ms = (5u64 << attempts.saturating_sub(1).min(4)).min(80);
        let delay_ms = base_delay_ms + rand::rng().random_range(0..4);
        trace!(lock = "backoff", attempts, delay_ms);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    };

    let result = run_under_guard(pool, db_kind, command, &connection_settings.db_settings).await;

    if let Err(release_err) = guard.release().await {
        warn!(error = %release_err, "failed to release migration guard");
    }
    result
}

async fn run_under_guard(
    pool: &DatabaseConnection,
    db_kind: DbKind,
    command: MigrationCommand,
    db_settings: &DbSettings,
) -> Result<(), DbInfraError> {
    let start = Instant::now();

    if db_kind == DbKind::SqliteFile {
        setup_sqlite_file_prerequisites(pool).await?;
    }
    apply_db_settings(pool, db_settings, db_kind).await?;

    match tokio::time::timeout(MIGRATION_BODY_TIMEOUT, migrate(pool, command)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(DbInfraError::migration(format!(
                "migration execution failed: {e}"
            )))
        }
        Err(_) => {
            return Err(DbInfraError::migration(format!(
                "migration body timed out after {}ms",
                MIGRATION_BODY_TIMEOUT.as_millis()
            )))
        }
    }

    let expected = Migrator::migrations().len();
    let applied = migration::count_applied_migrations(pool)
        .await
        .map_err(|e| DbInfraError::migration(format!("post-check failed: {e}")))?;

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        expected,
        applied,
        "migrator ran"
    );

    match command {
        MigrationCommand::Reset if applied != 0 => Err(DbInfraError::migration(format!(
            "reset should leave 0 migrations applied, found {applied}"
        ))),
        MigrationCommand::Up | MigrationCommand::Fresh | MigrationCommand::Refresh
            if applied != expected =>
        {
            Err(DbInfraError::migration(format!(
                "expected {expected} migrations applied, found {applied}"
            )))
        }
        _ => Ok(()),
    }
}

async fn apply_db_settings(
    pool: &DatabaseConnection,
    settings: &DbSettings,
    db_kind: DbKind,
) -> Result<(), DbInfraError> {
    let backend = sea_orm::DatabaseBackend::from(db_kind);
    for stmt in build_session_statements(db_kind, settings) {
        pool.execute(Statement::from_string(backend, stmt))
            .await
            .map_err(|e| DbInfraError::config(format!("failed to apply db settings: {e}")))?;
    }
    Ok(())
}

async fn setup_sqlite_file_prerequisites(pool: &DatabaseConnection) -> Result<(), DbInfraError> {
    for pragma in ["PRAGMA journal_mode = WAL;", "PRAGMA synchronous = NORMAL;"] {
        pool.execute(Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            pragma,
        ))
        .await
        .map_err(|e| DbInfraError::config(format!("failed to run '{pragma}': {e}")))?;
    }
    Ok(())
}
