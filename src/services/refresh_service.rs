use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::feed::CourseFeed;

/// Pulls the full dataset from the feed and swaps it into the store.
pub struct RefreshService {
    db: SqlitePool,
    feed: Arc<dyn CourseFeed>,
}

#[derive(Debug, Serialize)]
pub struct RefreshStats {
    pub fetched: usize,
    pub inserted: usize,
}

impl RefreshService {
    pub fn new(db: SqlitePool, feed: Arc<dyn CourseFeed>) -> Self {
        Self { db, feed }
    }

    /// Fetches, parses, and replaces the whole collection. Replace means
    /// replace: rows created or edited since the last refresh are dropped
    /// along with everything else. All-or-nothing; a failure at any step
    /// leaves the existing rows untouched.
    pub async fn refresh(&self) -> Result<RefreshStats, AppError> {
        info!("Starting course refresh...");

        let courses = self.feed.fetch_courses().await?;
        let fetched = courses.len();

        let inserted = repository::replace_all(&self.db, &courses).await?;

        info!("Refresh completed: fetched {}, inserted {}", fetched, inserted);
        Ok(RefreshStats { fetched, inserted })
    }
}
