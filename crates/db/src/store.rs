//! The transactional store facade.
//!
//! One logical writer per course: concurrent commits against the same
//! course serialize on the underlying SQLite transaction, not here.
//! Every multi-step write runs inside a single transaction; any failing
//! step aborts the whole unit and surfaces [`StoreError::Database`].

use std::collections::HashMap;

use sqlx::SqlitePool;

use coursehub_core::ingest::{CourseMutation, NewCourse, NewVideo};
use coursehub_core::types::{clamp_progress, DbId};

use crate::models::course::{Course, CreateCourse};
use crate::models::video::{CreateVideo, Video};
use crate::repositories::{CourseRepo, VideoRepo};
use crate::StoreError;

/// A course with its `video_order` resolved to actual records.
#[derive(Debug)]
pub struct CourseGraph {
    pub course: Course,
    /// Videos in playback order. Order entries that resolve to no record
    /// are dropped rather than raised.
    pub videos: Vec<Video>,
}

/// Async facade over the two collections.
#[derive(Debug, Clone)]
pub struct CourseStore {
    pool: SqlitePool,
}

impl CourseStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Commit a course mutation as one durable unit.
    ///
    /// Returns the id of the affected course.
    pub async fn apply_mutation(&self, mutation: CourseMutation) -> Result<DbId, StoreError> {
        match mutation {
            CourseMutation::CreateCourse { course, videos } => {
                self.commit_course(course, videos).await
            }
            CourseMutation::AppendVideos { course_id, videos } => {
                self.append_videos(&course_id, videos).await
            }
        }
    }

    /// Upsert course metadata and insert all supplied videos atomically:
    /// either every row is visible afterward or none are.
    pub async fn commit_course(
        &self,
        course: NewCourse,
        videos: Vec<NewVideo>,
    ) -> Result<DbId, StoreError> {
        let video_count = videos.len();
        let order: Vec<DbId> = videos.iter().map(|v| v.id.clone()).collect();
        let input = CreateCourse {
            id: course.id.clone(),
            name: course.name,
            description: course.description,
            created_at: course.created_at,
        };

        let mut tx = self.pool.begin().await?;
        CourseRepo::upsert(&mut *tx, &input, &order).await?;
        for video in videos {
            let create = CreateVideo {
                id: video.id,
                course_id: course.id.clone(),
                name: video.name,
                payload: video.payload,
            };
            VideoRepo::insert(&mut *tx, &create, input.created_at).await?;
        }
        tx.commit().await?;

        tracing::info!(course_id = %course.id, videos = video_count, "committed course");
        Ok(course.id)
    }

    /// Append videos to the end of an existing course's order, atomically
    /// with the order rewrite.
    pub async fn append_videos(
        &self,
        course_id: &DbId,
        videos: Vec<NewVideo>,
    ) -> Result<DbId, StoreError> {
        let appended = videos.len();
        let now = chrono::Utc::now();

        let mut tx = self.pool.begin().await?;
        let course = CourseRepo::find_by_id(&mut *tx, course_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "course",
                id: course_id.clone(),
            })?;

        let mut order = course.video_order.0;
        for video in videos {
            order.push(video.id.clone());
            let create = CreateVideo {
                id: video.id,
                course_id: course_id.clone(),
                name: video.name,
                payload: video.payload,
            };
            VideoRepo::insert(&mut *tx, &create, now).await?;
        }
        CourseRepo::set_video_order(&mut *tx, course_id, &order).await?;
        tx.commit().await?;

        tracing::info!(course_id = %course_id, videos = appended, "appended videos");
        Ok(course_id.clone())
    }

    /// The sole bulk read: every course with its videos resolved and
    /// ordered per `video_order`.
    pub async fn load_all(&self) -> Result<Vec<CourseGraph>, StoreError> {
        let courses = CourseRepo::list_all(&self.pool).await?;

        let mut graphs = Vec::with_capacity(courses.len());
        for course in courses {
            let videos = VideoRepo::list_by_course(&self.pool, &course.id).await?;
            let mut by_id: HashMap<DbId, Video> =
                videos.into_iter().map(|v| (v.id.clone(), v)).collect();
            let resolved: Vec<Video> = course
                .video_order
                .0
                .iter()
                .filter_map(|id| by_id.remove(id))
                .collect();
            graphs.push(CourseGraph {
                course,
                videos: resolved,
            });
        }
        Ok(graphs)
    }

    /// Clamp and store playback progress. Missing ids are a tolerated
    /// no-op: progress pings race deletions by design.
    pub async fn update_progress(
        &self,
        video_id: &DbId,
        progress: f64,
        watched: bool,
    ) -> Result<(), StoreError> {
        let clamped = clamp_progress(progress);
        let updated = VideoRepo::set_progress(&self.pool, video_id, clamped, watched).await?;
        if !updated {
            tracing::debug!(video_id = %video_id, "progress update for missing video ignored");
        }
        Ok(())
    }

    /// Overwrite the notes on one video. A missing save target is a
    /// genuine desync and fails with [`StoreError::NotFound`].
    pub async fn save_notes(&self, video_id: &DbId, notes: &str) -> Result<(), StoreError> {
        let updated = VideoRepo::set_notes(&self.pool, video_id, notes).await?;
        if !updated {
            return Err(StoreError::NotFound {
                entity: "video",
                id: video_id.clone(),
            });
        }
        Ok(())
    }

    /// Record the duration derived at first playback. Tolerant of
    /// missing ids, like progress.
    pub async fn set_duration(&self, video_id: &DbId, duration_secs: f64) -> Result<(), StoreError> {
        VideoRepo::set_duration(&self.pool, video_id, duration_secs.max(0.0)).await?;
        Ok(())
    }

    /// Cache a derived thumbnail. Tolerant of missing ids; thumbnailing
    /// is cosmetic.
    pub async fn set_thumbnail(&self, video_id: &DbId, image: &[u8]) -> Result<(), StoreError> {
        VideoRepo::set_thumbnail(&self.pool, video_id, image).await?;
        Ok(())
    }

    /// Delete a course and every owned video atomically. Returns the
    /// removed video ids so the caller can release their handles.
    pub async fn delete_course(&self, course_id: &DbId) -> Result<Vec<DbId>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed_videos = VideoRepo::delete_by_course(&mut *tx, course_id).await?;
        let removed = CourseRepo::delete(&mut *tx, course_id).await?;
        if !removed {
            return Err(StoreError::NotFound {
                entity: "course",
                id: course_id.clone(),
            });
        }
        tx.commit().await?;

        tracing::info!(course_id = %course_id, videos = removed_videos.len(), "deleted course");
        Ok(removed_videos)
    }

    /// Delete one video and rewrite the owning course's order to exclude
    /// it, in one transaction.
    pub async fn delete_video(&self, video_id: &DbId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let video = VideoRepo::find_by_id(&mut *tx, video_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "video",
                id: video_id.clone(),
            })?;

        VideoRepo::delete(&mut *tx, video_id).await?;

        if let Some(course) = CourseRepo::find_by_id(&mut *tx, &video.course_id).await? {
            let order: Vec<DbId> = course
                .video_order
                .0
                .into_iter()
                .filter(|id| id != video_id)
                .collect();
            CourseRepo::set_video_order(&mut *tx, &course.id, &order).await?;
        }
        tx.commit().await?;

        tracing::info!(video_id = %video_id, course_id = %video.course_id, "deleted video");
        Ok(())
    }

    /// Replace a course's video order.
    ///
    /// The supplied order must be a true permutation of the current one;
    /// anything that drops, adds, or duplicates entries fails with
    /// [`StoreError::Validation`].
    pub async fn reorder(&self, course_id: &DbId, new_order: Vec<DbId>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let course = CourseRepo::find_by_id(&mut *tx, course_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "course",
                id: course_id.clone(),
            })?;

        let mut current = course.video_order.0.clone();
        let mut proposed = new_order.clone();
        current.sort();
        proposed.sort();
        if current != proposed {
            return Err(StoreError::Validation(format!(
                "new order for course {course_id} is not a permutation of the existing {} videos",
                current.len()
            )));
        }

        CourseRepo::set_video_order(&mut *tx, course_id, &new_order).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Total payload bytes currently stored. Best-effort input to the
    /// storage estimate.
    pub async fn payload_bytes(&self) -> Result<u64, StoreError> {
        let row: (i64,) =
            sqlx::query_as("SELECT COALESCE(SUM(LENGTH(payload)), 0) FROM videos")
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 as u64)
    }
}
