use std::time::Duration;

use chrono::{TimeZone, Utc};
use course_api::db::repository;
use course_api::models::{NewCourse, UpdateCourseRequest};
use sqlx::SqlitePool;

async fn setup_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

fn sample_course(name: &str) -> NewCourse {
    NewCourse {
        university: "Oxford".to_string(),
        city: "Oxford".to_string(),
        country: "United Kingdom".to_string(),
        course_name: name.to_string(),
        course_description: "An introductory course".to_string(),
        start_date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
        price: 1500.50,
        currency: "GBP".to_string(),
    }
}

#[tokio::test]
async fn insert_then_find_preserves_all_fields() {
    let db = setup_db().await;

    let created = repository::insert_course(&db, sample_course("Algorithms"))
        .await
        .expect("insert failed");

    let found = repository::find_course_by_id(&db, &created.id)
        .await
        .expect("find failed")
        .expect("course not found");

    assert_eq!(found, created);
    assert_eq!(found.university, "Oxford");
    assert_eq!(found.city, "Oxford");
    assert_eq!(found.country, "United Kingdom");
    assert_eq!(found.course_name, "Algorithms");
    assert_eq!(found.course_description, "An introductory course");
    assert_eq!(found.start_date, Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
    assert_eq!(found.end_date, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
    assert_eq!(found.price, 1500.50);
    assert_eq!(found.currency, "GBP");
}

#[tokio::test]
async fn pagination_returns_first_page_in_insertion_order() {
    let db = setup_db().await;

    let batch: Vec<NewCourse> = (0..100)
        .map(|i| sample_course(&format!("Course {:03}", i)))
        .collect();
    let inserted = repository::replace_all(&db, &batch).await.expect("replace failed");
    assert_eq!(inserted, 100);

    let page1 = repository::list_courses(&db, None, 10, 0)
        .await
        .expect("list failed");
    assert_eq!(page1.len(), 10);
    for (i, course) in page1.iter().enumerate() {
        assert_eq!(course.course_name, format!("Course {:03}", i));
    }

    let page3 = repository::list_courses(&db, None, 10, 20)
        .await
        .expect("list failed");
    assert_eq!(page3[0].course_name, "Course 020");
}

#[tokio::test]
async fn search_matches_any_of_the_five_text_fields() {
    let db = setup_db().await;

    let mut course = sample_course("Distributed Systems");
    course.university = "Aalto University".to_string();
    course.city = "Helsinki".to_string();
    course.country = "Finland".to_string();
    course.course_description = "Consensus and replication".to_string();
    repository::insert_course(&db, course).await.expect("insert failed");

    // One term per searchable field, deliberately cased differently.
    for term in ["aalto", "HELSINKI", "finLAND", "distributed", "consensus"] {
        let hits = repository::list_courses(&db, Some(term), 10, 0)
            .await
            .expect("list failed");
        assert_eq!(hits.len(), 1, "term {:?} should match", term);
    }

    let misses = repository::list_courses(&db, Some("underwater basket weaving"), 10, 0)
        .await
        .expect("list failed");
    assert!(misses.is_empty());
}

#[tokio::test]
async fn update_changes_only_the_given_fields() {
    let db = setup_db().await;

    let created = repository::insert_course(&db, sample_course("Databases"))
        .await
        .expect("insert failed");

    let patch = UpdateCourseRequest {
        city: Some("London".to_string()),
        price: Some(999.0),
        ..Default::default()
    };
    let updated = repository::update_course(&db, &created.id, patch)
        .await
        .expect("update failed")
        .expect("course not found");

    assert_eq!(updated.city, "London");
    assert_eq!(updated.price, 999.0);
    assert_eq!(updated.university, created.university);
    assert_eq!(updated.course_name, created.course_name);
    assert_eq!(updated.course_description, created.course_description);
    assert_eq!(updated.start_date, created.start_date);
    assert_eq!(updated.end_date, created.end_date);
    assert_eq!(updated.currency, created.currency);

    let reread = repository::find_course_by_id(&db, &created.id)
        .await
        .expect("find failed")
        .expect("course not found");
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn update_missing_course_returns_none() {
    let db = setup_db().await;

    let patch = UpdateCourseRequest {
        city: Some("Nowhere".to_string()),
        ..Default::default()
    };
    let result = repository::update_course(&db, "no-such-id", patch)
        .await
        .expect("update failed");
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_course_and_reports_missing_ids() {
    let db = setup_db().await;

    let created = repository::insert_course(&db, sample_course("Compilers"))
        .await
        .expect("insert failed");

    assert!(!repository::delete_course(&db, "no-such-id").await.expect("delete failed"));

    assert!(repository::delete_course(&db, &created.id).await.expect("delete failed"));
    let gone = repository::find_course_by_id(&db, &created.id)
        .await
        .expect("find failed");
    assert!(gone.is_none());
}

#[tokio::test]
async fn purge_expired_removes_only_aged_rows() {
    let db = setup_db().await;

    repository::insert_course(&db, sample_course("Fresh Course"))
        .await
        .expect("insert failed");

    // Row inserted 700 s ago, past the 600 s window.
    let stale_inserted_at = Utc::now().timestamp() - 700;
    sqlx::query(
        "INSERT INTO courses \
            (id, University, City, Country, CourseName, CourseDescription, \
            StartDate, EndDate, Price, Currency, inserted_at) \
         VALUES ('stale-id', 'Old U', 'Old Town', 'Oldland', 'Stale Course', \
            'Expired data', '2023-01-01T00:00:00Z', '2023-06-01T00:00:00Z', \
            100.0, 'EUR', ?1)",
    )
    .bind(stale_inserted_at)
    .execute(&db)
    .await
    .expect("raw insert failed");

    let purged = repository::purge_expired(&db, Duration::from_secs(600))
        .await
        .expect("purge failed");
    assert_eq!(purged, 1);

    let remaining = repository::list_courses(&db, None, 10, 0)
        .await
        .expect("list failed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].course_name, "Fresh Course");
}
