pub mod dto;

use std::env;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::AppError;
use crate::models::NewCourse;

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub url: String,
}

impl FeedConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let url = env::var("COURSE_FEED_URL")
            .map_err(|_| AppError::BadRequest("COURSE_FEED_URL is not set".to_string()))?;
        Ok(Self { url })
    }
}

/// Source of the full course dataset. The HTTP implementation talks to the
/// real CSV endpoint; tests substitute their own.
#[async_trait]
pub trait CourseFeed: Send + Sync {
    async fn fetch_courses(&self) -> Result<Vec<NewCourse>, AppError>;
}

pub struct HttpCourseFeed {
    client: Client,
    config: FeedConfig,
}

impl HttpCourseFeed {
    pub fn new(config: FeedConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Feed(format!("failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CourseFeed for HttpCourseFeed {
    async fn fetch_courses(&self) -> Result<Vec<NewCourse>, AppError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| AppError::Feed(format!("feed request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Feed(format!(
                "feed returned status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Feed(format!("failed to read feed body: {}", e)))?;

        dto::parse_csv(&body)
    }
}
