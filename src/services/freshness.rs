use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::feed::CourseFeed;
use crate::services::refresh_service::RefreshService;

/// Per-request guard that keeps the collection populated. Expired rows are
/// swept first; if the collection then turns out empty, a refresh runs
/// synchronously before the request proceeds.
#[derive(Clone)]
pub struct FreshnessGate {
    db: SqlitePool,
    feed: Arc<dyn CourseFeed>,
    ttl: Duration,
    refresh_lock: Arc<Mutex<()>>,
}

impl FreshnessGate {
    pub fn new(db: SqlitePool, feed: Arc<dyn CourseFeed>, ttl: Duration) -> Self {
        Self {
            db,
            feed,
            ttl,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Never fails: a broken store or feed is logged and the request goes on,
    /// possibly against an empty collection.
    pub async fn ensure_fresh(&self) {
        if let Err(err) = self.check_and_refresh().await {
            warn!("freshness check failed: {}", err);
        }
    }

    async fn check_and_refresh(&self) -> Result<(), AppError> {
        let purged = repository::purge_expired(&self.db, self.ttl).await?;
        if purged > 0 {
            info!("purged {} expired courses", purged);
        }

        if repository::count_courses(&self.db).await? > 0 {
            debug!("collection populated, no refresh needed");
            return Ok(());
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have finished refreshing while we waited.
        if repository::count_courses(&self.db).await? > 0 {
            return Ok(());
        }

        info!("collection empty, refreshing from feed");
        let stats = RefreshService::new(self.db.clone(), self.feed.clone())
            .refresh()
            .await?;
        info!("refresh inserted {} courses", stats.inserted);
        Ok(())
    }
}
