use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DbInfraError;

/// Runtime environment the database belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    /// Test databases must be named with a `_test` suffix.
    Test,
}

/// Storage engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl FromStr for DbKind {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(DbKind::Postgres),
            "sqlite-file" | "sqlite_file" => Ok(DbKind::SqliteFile),
            "sqlite-memory" | "sqlite_memory" | "memory" => Ok(DbKind::SqliteMemory),
            other => Err(DbInfraError::config(format!(
                "unknown database kind '{other}' (expected postgres | sqlite-file | sqlite-memory)"
            ))),
        }
    }
}

impl From<DbKind> for sea_orm::DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => sea_orm::DatabaseBackend::Postgres,
            DbKind::SqliteFile | DbKind::SqliteMemory => sea_orm::DatabaseBackend::Sqlite,
        }
    }
}

/// Which credentials to connect with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (limited permissions)
    App,
    /// Owner-level access (schema changes)
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolPurpose {
    Runtime,
    Migration,
}

/// Per-session settings applied after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub application_name: String,
    pub statement_timeout_ms: u64,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub db_settings: DbSettings,
}

/// Reject combinations that make no sense before anything connects.
pub fn validate_db_config(env: RuntimeEnv, db_kind: DbKind) -> Result<(), DbInfraError> {
    if env == RuntimeEnv::Prod && db_kind == DbKind::SqliteMemory {
        return Err(DbInfraError::config(
            "in-memory SQLite is only available in the test environment",
        ));
    }
    Ok(())
}

/// Build the connection string for the given environment, engine and owner.
pub fn make_conn_spec(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    validate_db_config(env, db_kind)?;
    match db_kind {
        DbKind::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = db_name(env)?;
            let (username, password) = credentials(owner)?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbKind::SqliteFile => {
            let path = sqlite_db_path(env)?;
            Ok(format!("sqlite://{}?mode=rwc", path.display()))
        }
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

pub fn build_connection_settings(
    env: RuntimeEnv,
    db_kind: DbKind,
    purpose: PoolPurpose,
) -> Result<ConnectionSettings, DbInfraError> {
    validate_db_config(env, db_kind)?;

    // In-memory SQLite lives inside one connection; a second one would see an empty database.
    let (min_connections, max_connections) = match (db_kind, purpose) {
        (DbKind::SqliteMemory, _) | (_, PoolPurpose::Migration) => (1, 1),
        (DbKind::SqliteFile, PoolPurpose::Runtime) => (1, 4),
        (DbKind::Postgres, PoolPurpose::Runtime) => (2, 16),
    };

    let statement_timeout_ms = match purpose {
        PoolPurpose::Runtime => 5_000,
        PoolPurpose::Migration => 120_000,
    };

    Ok(ConnectionSettings {
        min_connections,
        max_connections,
        acquire_timeout: Duration::from_secs(match env {
            RuntimeEnv::Test => 2,
            RuntimeEnv::Prod => 5,
        }),
        db_settings: DbSettings {
            application_name: format!("lms-{}", purpose_label(purpose)),
            statement_timeout_ms,
            busy_timeout_ms: 5_000,
        },
    })
}

fn purpose_label(purpose: PoolPurpose) -> &'static str {
    match purpose {
        PoolPurpose::Runtime => "runtime",
        PoolPurpose::Migration => "migration",
    }
}

pub fn build_session_statements(db_kind: DbKind, settings: &DbSettings) -> Vec<String> {
    match db_kind {
        DbKind::Postgres => vec![
            format!("SET application_name = '{}'", settings.application_name),
            "SET TIME ZONE 'UTC'".to_string(),
            format!("SET statement_timeout = {}", settings.statement_timeout_ms),
        ],
        DbKind::SqliteFile | DbKind::SqliteMemory => vec![
            "PRAGMA foreign_keys = ON".to_string(),
            format!("PRAGMA busy_timeout = {}", settings.busy_timeout_ms),
        ],
    }
}

/// Location of the SQLite database file for an environment.
pub fn sqlite_db_path(env: RuntimeEnv) -> Result<PathBuf, DbInfraError> {
    let dir = env::var("LMS_SQLITE_DIR").unwrap_or_else(|_| "./data".to_string());
    if dir.trim().is_empty() {
        return Err(DbInfraError::config("LMS_SQLITE_DIR must not be empty"));
    }
    let file = match env {
        RuntimeEnv::Prod => "lms.db",
        RuntimeEnv::Test => "lms_test.db",
    };
    Ok(PathBuf::from(dir).join(file))
}

/// Lock file guarding migrations of a SQLite file database.
pub fn sqlite_lock_path(db_kind: DbKind, env: RuntimeEnv) -> Result<PathBuf, DbInfraError> {
    if db_kind != DbKind::SqliteFile {
        return Err(DbInfraError::config(format!(
            "lock files only apply to sqlite-file databases, got {db_kind:?}"
        )));
    }
    let mut path = sqlite_db_path(env)?;
    path.set_extension("migrate.lock");
    Ok(path)
}

fn db_name(env: RuntimeEnv) -> Result<String, DbInfraError> {
    match env {
        RuntimeEnv::Prod => must_var("PROD_DB"),
        RuntimeEnv::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test environment requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((must_var("LMS_OWNER_USER")?, must_var("LMS_OWNER_PASSWORD")?)),
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
