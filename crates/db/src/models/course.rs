//! Course entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use coursehub_core::types::{DbId, Timestamp};

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    /// Ordered video ids; every entry references an owned video.
    pub video_order: Json<Vec<DbId>>,
}

/// DTO for creating a new course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}
