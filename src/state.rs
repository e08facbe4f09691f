use std::sync::Arc;

use sqlx::SqlitePool;

use crate::feed::CourseFeed;
use crate::services::FreshnessGate;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub feed: Arc<dyn CourseFeed>,
    pub gate: FreshnessGate,
}
