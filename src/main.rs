use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_api::db::repository;
use course_api::feed::{CourseFeed, FeedConfig, HttpCourseFeed};
use course_api::routes::router;
use course_api::services::FreshnessGate;
use course_api::state::AppState;

const DEFAULT_TTL_SECS: u64 = 600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_api=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://courses.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_lazy(&database_url)?;

    // A broken store is logged, not fatal: the API keeps serving in a
    // degraded state and every request simply sees errors or empty data.
    match sqlx::migrate!("./migrations").run(&pool).await {
        Ok(_) => match repository::count_courses(&pool).await {
            Ok(count) => info!("connected to store, {} courses present", count),
            Err(err) => error!("store reachable but count failed: {}", err),
        },
        Err(err) => error!("failed to prepare store, continuing degraded: {}", err),
    }

    let config = FeedConfig::new_from_env()?;
    let feed: Arc<dyn CourseFeed> = Arc::new(HttpCourseFeed::new(config)?);

    let ttl_secs = std::env::var("DATA_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TTL_SECS);

    let gate = FreshnessGate::new(pool.clone(), feed.clone(), Duration::from_secs(ttl_secs));
    let state = AppState {
        db: pool,
        feed,
        gate,
    };

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
