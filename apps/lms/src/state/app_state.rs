use sea_orm::DatabaseConnection;

use crate::config::competition::CompetitionConfig;

/// Process-wide handles shared by every operation.
#[derive(Clone)]
pub struct AppState {
    db: Option<DatabaseConnection>,
    pub config: CompetitionConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: CompetitionConfig) -> Self {
        Self {
            db: Some(db),
            config,
        }
    }

    pub fn new_without_db(config: CompetitionConfig) -> Self {
        Self { db: None, config }
    }

    pub fn db(&self) -> Option<&DatabaseConnection> {
        self.db.as_ref()
    }
}
