use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::NewCourse;

/// Date format used by the feed's StartDate/EndDate columns.
pub const FEED_DATE_FORMAT: &str = "%Y-%m-%d";

/// One CSV row as delivered by the feed, under its own header names.
#[derive(Debug, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "CourseName")]
    pub course_name: String,
    #[serde(rename = "CourseDescription")]
    pub course_description: String,
    #[serde(rename = "StartDate")]
    pub start_date: String,
    #[serde(rename = "EndDate")]
    pub end_date: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
}

impl TryFrom<FeedRecord> for NewCourse {
    type Error = AppError;

    fn try_from(record: FeedRecord) -> Result<Self, Self::Error> {
        let start_date = parse_feed_date(&record.start_date)?;
        let end_date = parse_feed_date(&record.end_date)?;

        Ok(NewCourse {
            university: record.university,
            city: record.city,
            country: record.country,
            course_name: record.course_name,
            course_description: record.course_description,
            start_date,
            end_date,
            price: record.price,
            currency: record.currency,
        })
    }
}

fn parse_feed_date(value: &str) -> Result<chrono::DateTime<chrono::Utc>, AppError> {
    let date = NaiveDate::parse_from_str(value, FEED_DATE_FORMAT)
        .map_err(|e| AppError::Feed(format!("invalid feed date {:?}: {}", value, e)))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Parses a full CSV payload. Any malformed row or unparseable date fails
/// the whole batch; refresh is all-or-nothing.
pub fn parse_csv(body: &str) -> Result<Vec<NewCourse>, AppError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut courses = Vec::new();
    for result in reader.deserialize() {
        let record: FeedRecord =
            result.map_err(|e| AppError::Feed(format!("malformed feed row: {}", e)))?;
        courses.push(record.try_into()?);
    }
    Ok(courses)
}
