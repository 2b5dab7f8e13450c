//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use coursehub_core::types::{DbId, Timestamp};

/// A row from the `videos` table, payload included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    /// Owning course; set once at creation, never reassigned.
    pub course_id: DbId,
    /// Original file name; duplicate detection key (case-insensitive).
    pub name: String,
    #[serde(skip_serializing)]
    pub payload: Vec<u8>,
    /// Seconds; 0 until derived at first playback.
    pub duration_secs: f64,
    /// Always within `[0, 100]`.
    pub progress: f64,
    pub watched: bool,
    pub notes: String,
    #[serde(skip_serializing)]
    pub thumbnail: Option<Vec<u8>>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new video into a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideo {
    pub id: DbId,
    pub course_id: DbId,
    pub name: String,
    pub payload: Vec<u8>,
}
