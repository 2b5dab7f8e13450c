//! Integration tests for the transactional course store.
//!
//! Exercises the facade against a real (in-memory) SQLite database:
//! commit/read round-trips, cascade delete, progress clamping, notes
//! semantics, reorder validation, and defensive order resolution.

use assert_matches::assert_matches;
use sqlx::SqlitePool;

use coursehub_core::ingest::{NewCourse, NewVideo};
use coursehub_db::repositories::CourseRepo;
use coursehub_db::{CourseStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_course(name: &str) -> NewCourse {
    NewCourse::new(name.to_string(), String::new())
}

fn new_video(name: &str) -> NewVideo {
    NewVideo::new(name.to_string(), name.as_bytes().to_vec())
}

async fn seed_course(store: &CourseStore, name: &str, videos: &[&str]) -> String {
    let course = new_course(name);
    let videos: Vec<NewVideo> = videos.iter().map(|v| new_video(v)).collect();
    store
        .commit_course(course, videos)
        .await
        .expect("seed commit failed")
}

async fn video_row_count(pool: &SqlitePool) -> i64 {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Commit / read round-trips
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_commit_and_load_roundtrip(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    let course_id = seed_course(&store, "Rust 101", &["intro.mp4", "lesson2.mp4"]).await;

    let graphs = store.load_all().await.unwrap();
    assert_eq!(graphs.len(), 1);

    let graph = &graphs[0];
    assert_eq!(graph.course.id, course_id);
    assert_eq!(graph.course.name, "Rust 101");
    assert_eq!(graph.videos.len(), 2);
    assert_eq!(graph.videos[0].name, "intro.mp4");
    assert_eq!(graph.videos[1].name, "lesson2.mp4");
    assert_eq!(graph.videos[0].payload, b"intro.mp4");
    assert_eq!(graph.videos[0].progress, 0.0);
    assert!(!graph.videos[0].watched);
    assert_eq!(graph.videos[0].notes, "");
    assert_eq!(graph.videos[0].duration_secs, 0.0);
    assert!(graph.videos[0].thumbnail.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_append_extends_order_at_the_end(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    let course_id = seed_course(&store, "Course", &["a.mp4"]).await;

    store
        .append_videos(&course_id, vec![new_video("b.mp4"), new_video("c.mp4")])
        .await
        .unwrap();

    let graphs = store.load_all().await.unwrap();
    let names: Vec<_> = graphs[0].videos.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_append_to_missing_course_fails(pool: SqlitePool) {
    let store = CourseStore::new(pool.clone());
    let result = store
        .append_videos(&"nope".to_string(), vec![new_video("a.mp4")])
        .await;

    assert_matches!(result, Err(StoreError::NotFound { entity: "course", .. }));
    assert_eq!(video_row_count(&pool).await, 0, "aborted append leaves no rows");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_order_entries_without_records_are_dropped(pool: SqlitePool) {
    let store = CourseStore::new(pool.clone());
    let course_id = seed_course(&store, "Course", &["a.mp4", "b.mp4"]).await;

    // Corrupt the order with an id that resolves to nothing.
    let graphs = store.load_all().await.unwrap();
    let mut order = graphs[0].course.video_order.0.clone();
    order.push("ghost-id".to_string());
    CourseRepo::set_video_order(&pool, &course_id, &order)
        .await
        .unwrap();

    let graphs = store.load_all().await.unwrap();
    assert_eq!(graphs[0].videos.len(), 2, "ghost entry resolved defensively");
}

// ---------------------------------------------------------------------------
// Progress and notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_progress_is_clamped(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4"]).await;
    let video_id = store.load_all().await.unwrap()[0].videos[0].id.clone();

    store.update_progress(&video_id, 150.0, false).await.unwrap();
    assert_eq!(store.load_all().await.unwrap()[0].videos[0].progress, 100.0);

    store.update_progress(&video_id, -5.0, false).await.unwrap();
    assert_eq!(store.load_all().await.unwrap()[0].videos[0].progress, 0.0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_progress_on_missing_video_is_a_noop(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    // Progress pings race deletions; this must not error.
    store
        .update_progress(&"missing".to_string(), 50.0, false)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_watched_flag_follows_override(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4"]).await;
    let video_id = store.load_all().await.unwrap()[0].videos[0].id.clone();

    store.update_progress(&video_id, 96.0, true).await.unwrap();
    let video = &store.load_all().await.unwrap()[0].videos[0];
    assert_eq!(video.progress, 96.0);
    assert!(video.watched);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notes_roundtrip(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4"]).await;
    let video_id = store.load_all().await.unwrap()[0].videos[0].id.clone();

    store.save_notes(&video_id, "hello").await.unwrap();
    assert_eq!(store.load_all().await.unwrap()[0].videos[0].notes, "hello");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notes_on_missing_video_fail_and_change_nothing(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4"]).await;

    let result = store.save_notes(&"missing".to_string(), "hello").await;
    assert_matches!(result, Err(StoreError::NotFound { entity: "video", .. }));

    assert_eq!(store.load_all().await.unwrap()[0].videos[0].notes, "");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duration_recorded_lazily(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4"]).await;
    let video_id = store.load_all().await.unwrap()[0].videos[0].id.clone();

    store.set_duration(&video_id, 731.5).await.unwrap();
    assert_eq!(
        store.load_all().await.unwrap()[0].videos[0].duration_secs,
        731.5
    );
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_course_cascades_atomically(pool: SqlitePool) {
    let store = CourseStore::new(pool.clone());
    let kept = seed_course(&store, "Kept", &["k.mp4"]).await;
    let doomed = seed_course(&store, "Doomed", &["d1.mp4", "d2.mp4"]).await;

    let removed = store.delete_course(&doomed).await.unwrap();
    assert_eq!(removed.len(), 2);

    let graphs = store.load_all().await.unwrap();
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0].course.id, kept);
    // No orphaned video rows survive.
    assert_eq!(video_row_count(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_course_fails(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    let result = store.delete_course(&"missing".to_string()).await;
    assert_matches!(result, Err(StoreError::NotFound { entity: "course", .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_video_rewrites_order(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    seed_course(&store, "Course", &["a.mp4", "b.mp4", "c.mp4"]).await;
    let middle = store.load_all().await.unwrap()[0].videos[1].id.clone();

    store.delete_video(&middle).await.unwrap();

    let graphs = store.load_all().await.unwrap();
    let names: Vec<_> = graphs[0].videos.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["a.mp4", "c.mp4"]);
    assert!(!graphs[0].course.video_order.0.contains(&middle));
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_is_applied_verbatim(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    let course_id = seed_course(&store, "Course", &["a.mp4", "b.mp4", "c.mp4"]).await;

    let mut order = store.load_all().await.unwrap()[0].course.video_order.0.clone();
    order.reverse();
    store.reorder(&course_id, order.clone()).await.unwrap();

    let graphs = store.load_all().await.unwrap();
    let ids: Vec<_> = graphs[0].videos.iter().map(|v| v.id.clone()).collect();
    assert_eq!(ids, order);
    let names: Vec<_> = graphs[0].videos.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["c.mp4", "b.mp4", "a.mp4"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reorder_rejects_non_permutations(pool: SqlitePool) {
    let store = CourseStore::new(pool);
    let course_id = seed_course(&store, "Course", &["a.mp4", "b.mp4"]).await;
    let original = store.load_all().await.unwrap()[0].course.video_order.0.clone();

    // Dropping an entry.
    let dropped = vec![original[0].clone()];
    assert_matches!(
        store.reorder(&course_id, dropped).await,
        Err(StoreError::Validation(_))
    );

    // Duplicating an entry.
    let duplicated = vec![original[0].clone(), original[0].clone()];
    assert_matches!(
        store.reorder(&course_id, duplicated).await,
        Err(StoreError::Validation(_))
    );

    // Smuggling in a foreign id.
    let foreign = vec![original[0].clone(), "ghost".to_string()];
    assert_matches!(
        store.reorder(&course_id, foreign).await,
        Err(StoreError::Validation(_))
    );

    // Order unchanged after every rejection.
    assert_eq!(
        store.load_all().await.unwrap()[0].course.video_order.0,
        original
    );
}
