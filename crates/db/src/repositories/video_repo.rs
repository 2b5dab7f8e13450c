//! Repository for the `videos` table.

use sqlx::SqliteExecutor;

use coursehub_core::types::{DbId, Timestamp};

use crate::models::video::{CreateVideo, Video};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, course_id, name, payload, duration_secs, progress, watched, notes, thumbnail, created_at";

/// Provides CRUD and targeted field mutation for video records.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video record with zeroed progress state.
    pub async fn insert(
        executor: impl SqliteExecutor<'_>,
        input: &CreateVideo,
        created_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO videos (id, course_id, name, payload, duration_secs, progress, watched, notes, created_at)
             VALUES (?, ?, ?, ?, 0, 0, 0, '', ?)",
        )
        .bind(&input.id)
        .bind(&input.course_id)
        .bind(&input.name)
        .bind(&input.payload)
        .bind(created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Find a video by id.
    pub async fn find_by_id(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = ?");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every video owned by a course.
    pub async fn list_by_course(
        executor: impl SqliteExecutor<'_>,
        course_id: &DbId,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE course_id = ?");
        sqlx::query_as::<_, Video>(&query)
            .bind(course_id)
            .fetch_all(executor)
            .await
    }

    /// Names of every video owned by a course (duplicate-detection input).
    pub async fn names_by_course(
        executor: impl SqliteExecutor<'_>,
        course_id: &DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM videos WHERE course_id = ?")
            .bind(course_id)
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Set progress and the watched flag. Returns `false` when the video
    /// does not exist.
    pub async fn set_progress(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
        progress: f64,
        watched: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE videos SET progress = ?, watched = ? WHERE id = ?")
            .bind(progress)
            .bind(watched)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the notes text. Returns `false` when the video does
    /// not exist.
    pub async fn set_notes(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
        notes: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE videos SET notes = ? WHERE id = ?")
            .bind(notes)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the lazily-derived duration.
    pub async fn set_duration(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
        duration_secs: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE videos SET duration_secs = ? WHERE id = ?")
            .bind(duration_secs)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cache a derived thumbnail image.
    pub async fn set_thumbnail(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
        thumbnail: &[u8],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE videos SET thumbnail = ? WHERE id = ?")
            .bind(thumbnail)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one video row. Returns `true` if a row was removed.
    pub async fn delete(executor: impl SqliteExecutor<'_>, id: &DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every video owned by a course, returning the removed ids so
    /// the caller can release their handles.
    pub async fn delete_by_course(
        executor: impl SqliteExecutor<'_>,
        course_id: &DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("DELETE FROM videos WHERE course_id = ? RETURNING id")
                .bind(course_id)
                .fetch_all(executor)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
