pub mod middleware;
pub mod routes;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Settings;
use crate::services::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub settings: Arc<Settings>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: Settings, clock: Arc<dyn Clock>) -> Self {
        AppState {
            pool,
            settings: Arc::new(settings),
            clock,
        }
    }
}
