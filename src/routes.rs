use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Course, NewCourse, UpdateCourseRequest};
use crate::services::{RefreshService, RefreshStats};
use crate::state::AppState;

fn default_page() -> u32 {
    1
}

fn default_items_per_page() -> u32 {
    10
}

#[derive(Deserialize)]
struct ListQuery {
    search: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_items_per_page")]
    items_per_page: u32,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", put(update_course).delete(delete_course))
        .route("/refresh", post(refresh_now))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Course Management API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "courses": "/courses",
            "course": "/courses/{course_id}",
            "refresh": "/refresh",
            "health": "/health"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    state.gate.ensure_fresh().await;

    if params.page == 0 {
        return Err(AppError::BadRequest("page must be >= 1".to_string()));
    }
    if !(1..=100).contains(&params.items_per_page) {
        return Err(AppError::BadRequest(
            "items_per_page must be between 1 and 100".to_string(),
        ));
    }

    let limit = i64::from(params.items_per_page);
    let offset = i64::from(params.page - 1) * limit;

    let courses =
        repository::list_courses(&state.db, params.search.as_deref(), limit, offset).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourse>,
) -> Result<Json<Course>, AppError> {
    state.gate.ensure_fresh().await;

    let course = repository::insert_course(&state.db, req)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Duplicate;
                }
            }
            AppError::Database(e)
        })?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    state.gate.ensure_fresh().await;

    let course = repository::update_course(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.gate.ensure_fresh().await;

    let deleted = repository::delete_course(&state.db, &id).await?;
    if deleted {
        Ok(Json(DeleteResponse { success: true }))
    } else {
        Err(AppError::NotFound)
    }
}

/// Forces a full refresh regardless of collection state. Unlike the gate,
/// failures surface to the caller here.
async fn refresh_now(State(state): State<AppState>) -> Result<Json<RefreshStats>, AppError> {
    let service = RefreshService::new(state.db.clone(), state.feed.clone());
    let stats = service.refresh().await?;
    Ok(Json(stats))
}
