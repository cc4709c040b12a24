use db_infra::config::db::{DbKind, RuntimeEnv};

use crate::config::competition::CompetitionConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for [`AppState`], used by hosts and tests alike.
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    config: Option<CompetitionConfig>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Prod,
            db_kind: None,
            config: None,
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, db_kind: DbKind) -> Self {
        self.db_kind = Some(db_kind);
        self
    }

    /// Override the environment-derived competition settings.
    pub fn with_config(mut self, config: CompetitionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let config = match self.config {
            Some(config) => config,
            None => CompetitionConfig::from_env()?,
        };
        match self.db_kind {
            Some(db_kind) => {
                let conn = bootstrap_db(self.env, db_kind).await?;
                Ok(AppState::new(conn, config))
            }
            None => Ok(AppState::new_without_db(config)),
        }
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
