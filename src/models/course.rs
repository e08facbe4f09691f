use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as it appears on the API surface. The store keeps the feed's
/// PascalCase column names; the mapping lives in `db::repository`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub university: String,
    pub city: String,
    pub country: String,
    pub course_name: String,
    pub course_description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub price: f64,
    pub currency: String,
}

/// A course without a store-assigned id. Produced by the feed during refresh
/// and accepted as the POST /courses request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub university: String,
    pub city: String,
    pub country: String,
    pub course_name: String,
    pub course_description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub price: f64,
    pub currency: String,
}

/// Partial update: only fields present in the body are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourseRequest {
    pub university: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub course_name: Option<String>,
    pub course_description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
}
