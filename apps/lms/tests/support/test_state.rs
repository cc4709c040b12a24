use std::env;
use std::env::VarError;
use std::str::FromStr;

use lms::config::competition::CompetitionConfig;
use lms::config::db::{DbKind, RuntimeEnv};
use lms::infra::state::{build_state, StateBuilder};
use lms::state::app_state::AppState;
use lms::AppError;

fn read_env_db_kind() -> Result<Option<String>, AppError> {
    match env::var("LMS_TEST_DB_KIND") {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(err) => Err(AppError::config(format!(
            "failed to read LMS_TEST_DB_KIND: {err}"
        ))),
    }
}

/// `LMS_TEST_DB_KIND`, defaulting to in-memory SQLite so suites run without a server.
pub fn resolve_test_db_kind() -> Result<DbKind, AppError> {
    let resolved = match read_env_db_kind()? {
        Some(ref raw) => DbKind::from_str(raw.as_str()).map_err(AppError::from)?,
        None => DbKind::SqliteMemory,
    };
    Ok(resolved)
}

pub fn test_state_builder() -> Result<StateBuilder, AppError> {
    let db_kind = resolve_test_db_kind()?;
    Ok(build_state()
        .with_env(RuntimeEnv::Test)
        .with_db(db_kind)
        .with_config(CompetitionConfig::default()))
}

pub async fn build_test_state() -> Result<AppState, AppError> {
    test_state_builder()?.build().await
}
