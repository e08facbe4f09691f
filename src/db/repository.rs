use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, NewCourse, UpdateCourseRequest};

/// Row shape of the `courses` table. Columns keep the upstream feed's
/// PascalCase names; this struct is the single place where they are mapped
/// to and from the API's snake_case fields.
#[derive(Debug, Clone, FromRow)]
pub struct StoredCourse {
    pub id: String,
    #[sqlx(rename = "University")]
    pub university: String,
    #[sqlx(rename = "City")]
    pub city: String,
    #[sqlx(rename = "Country")]
    pub country: String,
    #[sqlx(rename = "CourseName")]
    pub course_name: String,
    #[sqlx(rename = "CourseDescription")]
    pub course_description: String,
    #[sqlx(rename = "StartDate")]
    pub start_date: DateTime<Utc>,
    #[sqlx(rename = "EndDate")]
    pub end_date: DateTime<Utc>,
    #[sqlx(rename = "Price")]
    pub price: f64,
    #[sqlx(rename = "Currency")]
    pub currency: String,
    pub inserted_at: i64,
}

impl From<StoredCourse> for Course {
    fn from(row: StoredCourse) -> Self {
        Course {
            id: row.id,
            university: row.university,
            city: row.city,
            country: row.country,
            course_name: row.course_name,
            course_description: row.course_description,
            start_date: row.start_date,
            end_date: row.end_date,
            price: row.price,
            currency: row.currency,
        }
    }
}

const SELECT_COLUMNS: &str = "id, University, City, Country, CourseName, \
     CourseDescription, StartDate, EndDate, Price, Currency, inserted_at";

pub async fn count_courses(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await
}

/// Deletes rows older than `ttl`, returning how many were removed.
/// Stands in for a store-level TTL index on `inserted_at`.
pub async fn purge_expired(db: &SqlitePool, ttl: Duration) -> Result<u64, sqlx::Error> {
    let cutoff = Utc::now().timestamp() - ttl.as_secs() as i64;
    let result = sqlx::query("DELETE FROM courses WHERE inserted_at <= ?1")
        .bind(cutoff)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_courses(
    db: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    let rows = match search {
        Some(term) => {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM courses \
                 WHERE University LIKE '%' || ?1 || '%' \
                    OR City LIKE '%' || ?1 || '%' \
                    OR Country LIKE '%' || ?1 || '%' \
                    OR CourseName LIKE '%' || ?1 || '%' \
                    OR CourseDescription LIKE '%' || ?1 || '%' \
                 ORDER BY rowid LIMIT ?2 OFFSET ?3"
            );
            sqlx::query_as::<_, StoredCourse>(&sql)
                .bind(term)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {SELECT_COLUMNS} FROM courses ORDER BY rowid LIMIT ?1 OFFSET ?2"
            );
            sqlx::query_as::<_, StoredCourse>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await?
        }
    };
    Ok(rows.into_iter().map(Course::from).collect())
}

pub async fn find_course_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM courses WHERE id = ?1");
    let row = sqlx::query_as::<_, StoredCourse>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(Course::from))
}

pub async fn insert_course(db: &SqlitePool, req: NewCourse) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let inserted_at = Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO courses \
            (id, University, City, Country, CourseName, CourseDescription, \
            StartDate, EndDate, Price, Currency, inserted_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&id)
    .bind(&req.university)
    .bind(&req.city)
    .bind(&req.country)
    .bind(&req.course_name)
    .bind(&req.course_description)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.price)
    .bind(&req.currency)
    .bind(inserted_at)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        university: req.university,
        city: req.city,
        country: req.country,
        course_name: req.course_name,
        course_description: req.course_description,
        start_date: req.start_date,
        end_date: req.end_date,
        price: req.price,
        currency: req.currency,
    })
}

pub async fn update_course(
    db: &SqlitePool,
    id: &str,
    req: UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut current = match find_course_by_id(db, id).await? {
        Some(c) => c,
        None => return Ok(None),
    };

    if let Some(university) = req.university {
        current.university = university;
    }
    if let Some(city) = req.city {
        current.city = city;
    }
    if let Some(country) = req.country {
        current.country = country;
    }
    if let Some(course_name) = req.course_name {
        current.course_name = course_name;
    }
    if let Some(course_description) = req.course_description {
        current.course_description = course_description;
    }
    if let Some(start_date) = req.start_date {
        current.start_date = start_date;
    }
    if let Some(end_date) = req.end_date {
        current.end_date = end_date;
    }
    if let Some(price) = req.price {
        current.price = price;
    }
    if let Some(currency) = req.currency {
        current.currency = currency;
    }

    sqlx::query(
        "UPDATE courses \
         SET University = ?1, City = ?2, Country = ?3, CourseName = ?4, \
             CourseDescription = ?5, StartDate = ?6, EndDate = ?7, \
             Price = ?8, Currency = ?9 \
         WHERE id = ?10",
    )
    .bind(&current.university)
    .bind(&current.city)
    .bind(&current.country)
    .bind(&current.course_name)
    .bind(&current.course_description)
    .bind(current.start_date)
    .bind(current.end_date)
    .bind(current.price)
    .bind(&current.currency)
    .bind(id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replaces the entire collection in one transaction: every existing row is
/// deleted, then the new set is inserted. On any failure nothing changes.
pub async fn replace_all(db: &SqlitePool, courses: &[NewCourse]) -> Result<usize, sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM courses").execute(&mut *tx).await?;

    let inserted_at = Utc::now().timestamp();
    for course in courses {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO courses \
                (id, University, City, Country, CourseName, CourseDescription, \
                StartDate, EndDate, Price, Currency, inserted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&id)
        .bind(&course.university)
        .bind(&course.city)
        .bind(&course.country)
        .bind(&course.course_name)
        .bind(&course.course_description)
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(course.price)
        .bind(&course.currency)
        .bind(inserted_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(courses.len())
}
