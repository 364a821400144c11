use std::sync::{Arc, MutexGuard};

use diesel::sqlite::SqliteConnection;

use crate::{
    auth::jwt::JwtService,
    config::AppConfig,
    db::Database,
    error::AppResult,
};

#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub config: Arc<AppConfig>,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(database: Arc<Database>, config: AppConfig, jwt: JwtService) -> Self {
        Self {
            database,
            config: Arc::new(config),
            jwt,
        }
    }

    /// Locks the shared connection for the rest of the request.
    pub fn db(&self) -> AppResult<MutexGuard<'_, SqliteConnection>> {
        Ok(self.database.handle()?.lock())
    }
}
