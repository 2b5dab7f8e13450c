//! Repository for the `courses` table.

use sqlx::types::Json;
use sqlx::SqliteExecutor;

use coursehub_core::types::DbId;

use crate::models::course::{Course, CreateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, video_order";

/// Provides CRUD operations for course metadata.
pub struct CourseRepo;

impl CourseRepo {
    /// Upsert course metadata together with its video order.
    ///
    /// A conflicting id updates name, description, and order in place;
    /// `created_at` stays immutable.
    pub async fn upsert(
        executor: impl SqliteExecutor<'_>,
        input: &CreateCourse,
        video_order: &[DbId],
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (id, name, description, created_at, video_order)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                video_order = excluded.video_order
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.created_at)
            .bind(Json(video_order.to_vec()))
            .fetch_one(executor)
            .await
    }

    /// Find a course by id.
    pub async fn find_by_id(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = ?");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all courses, oldest first.
    pub async fn list_all(executor: impl SqliteExecutor<'_>) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Course>(&query).fetch_all(executor).await
    }

    /// Replace a course's video order. Returns `false` if the course does
    /// not exist.
    pub async fn set_video_order(
        executor: impl SqliteExecutor<'_>,
        id: &DbId,
        video_order: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE courses SET video_order = ? WHERE id = ?")
            .bind(Json(video_order.to_vec()))
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a course row. Returns `true` if a row was removed.
    pub async fn delete(executor: impl SqliteExecutor<'_>, id: &DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
