use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::DbInfraError;

pub fn pg_lock_id(key: &str) -> i64 {
    xxh3_64(key.as_bytes()) as i64
}

/// A held bootstrap lock. Must be released explicitly so Postgres unlock errors surface.
pub enum Guard {
    /// Advisory lock held on the (single-connection) admin pool session.
    Postgres {
        admin_pool: DatabaseConnection,
        lock_key: i64,
    },
    /// OS-level exclusive lock; dropping the file releases it.
    SqliteFile { file: File, lock_path: PathBuf },
    InMemory,
}

impl Guard {
    pub async fn release(self) -> Result<(), DbInfraError> {
        match self {
            Guard::Postgres {
                admin_pool,
                lock_key,
            } => {
                let stmt = Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    "SELECT pg_advisory_unlock($1) AS unlocked",
                    [lock_key.into()],
                );
                let row = admin_pool
                    .query_one(stmt)
                    .await
                    .map_err(|e| DbInfraError::config(format!("advisory unlock failed: {e}")))?;
                let unlocked = match row {
                    Some(row) => row.try_get::<bool>("", "unlocked").unwrap_or(false),
                    None => false,
                };
                if !unlocked {
                    warn!(lock_key, "advisory lock unlock returned false");
                }
                Ok(())
            }
            Guard::SqliteFile { file, lock_path } => {
                if let Err(e) = fs4::fs_std::FileExt::unlock(&file) {
                    debug!(error = %e, lock_path = %lock_path.display(), "sqlite file unlock error");
                }
                debug!(lock_path = %lock_path.display(), "sqlite file lock released");
                Ok(())
            }
            Guard::InMemory => Ok(()),
        }
    }
}

/// Non-blocking acquisition of a process-wide migration lock.
#[async_trait]
pub trait BootstrapLock {
    /// `Ok(None)` means another process holds the lock.
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError>;
}

/// Postgres session advisory lock. The admin pool must be min=max=1 so
/// lock and unlock run on the same session.
pub struct PgAdvisoryLock {
    admin_pool: DatabaseConnection,
    lock_key: i64,
}

impl PgAdvisoryLock {
    pub fn new(admin_pool: DatabaseConnection, key: &str) -> Self {
        Self {
            admin_pool,
            lock_key: pg_lock_id(key),
        }
    }
}

#[async_trait]
impl BootstrapLock for PgAdvisoryLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT pg_try_advisory_lock($1) AS locked",
            [self.lock_key.into()],
        );
        let row = self
            .admin_pool
            .query_one(stmt)
            .await
            .map_err(|e| DbInfraError::config(format!("failed to acquire advisory lock: {e}")))?
            .ok_or_else(|| DbInfraError::config("pg_try_advisory_lock returned no row"))?;
        let locked: bool = row
            .try_get("", "locked")
            .map_err(|e| DbInfraError::config(format!("failed to read lock result: {e}")))?;

        Ok(locked.then(|| Guard::Postgres {
            admin_pool: self.admin_pool.clone(),
            lock_key: self.lock_key,
        }))
    }
}

/// Exclusive lock on `<db>.migrate.lock`, shared by every process using the same file.
pub struct SqliteFileLock {
    lock_path: PathBuf,
}

impl SqliteFileLock {
    pub fn new(lock_path: &Path) -> Self {
        Self {
            lock_path: lock_path.to_path_buf(),
        }
    }
}

#[async_trait]
impl BootstrapLock for SqliteFileLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        use fs4::fs_std::FileExt;

        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbInfraError::config(format!("failed to create lock directory: {e}"))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| DbInfraError::config(format!("failed to open lock file: {e}")))?;

        match file.try_lock_exclusive() {
            Ok(true) => {
                debug!(lock_path = %self.lock_path.display(), "sqlite file lock acquired");
                Ok(Some(Guard::SqliteFile {
                    file,
                    lock_path: self.lock_path.clone(),
                }))
            }
            Ok(false) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(DbInfraError::config(format!(
                "failed to acquire sqlite file lock: {e}"
            ))),
        }
    }
}

/// In-memory databases live in one process; nothing to coordinate.
pub struct InMemoryLock;

#[async_trait]
impl BootstrapLock for InMemoryLock {
    async fn try_acquire(&mut self) -> Result<Option<Guard>, DbInfraError> {
        Ok(Some(Guard::InMemory))
    }
}
