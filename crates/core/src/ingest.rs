//! Ingestion planning: candidate videos, course mutations, duplicate
//! detection, and course-title fallback. Pure logic — no DB, no I/O.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{new_id, DbId, Timestamp};

/// A freshly-minted video record ready to be committed to a course.
///
/// Progress starts at 0, watched at false, notes empty; duration is
/// derived lazily at first playback.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub id: DbId,
    /// Original file name; the key used for duplicate detection.
    pub name: String,
    pub payload: Vec<u8>,
}

impl NewVideo {
    pub fn new(name: String, payload: Vec<u8>) -> Self {
        Self {
            id: new_id(),
            name,
            payload,
        }
    }
}

/// Course metadata synthesized for a create mutation.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}

impl NewCourse {
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: new_id(),
            name,
            description,
            created_at: chrono::Utc::now(),
        }
    }
}

/// The net effect of one ingestion batch on the store.
#[derive(Debug)]
pub enum CourseMutation {
    /// Synthesize a new course with an initial video set.
    CreateCourse {
        course: NewCourse,
        videos: Vec<NewVideo>,
    },
    /// Append videos to the end of an existing course's order.
    AppendVideos {
        course_id: DbId,
        videos: Vec<NewVideo>,
    },
}

impl CourseMutation {
    pub fn videos(&self) -> &[NewVideo] {
        match self {
            Self::CreateCourse { videos, .. } => videos,
            Self::AppendVideos { videos, .. } => videos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.videos().is_empty()
    }
}

/// Name collisions against an existing course, surfaced as a structured
/// decision request rather than silently proceeding.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateWarning {
    /// Candidate names already present in the target course
    /// (case-insensitive match, original casing reported).
    pub duplicate_names: Vec<String>,
    /// How many candidates survive if duplicates are dropped.
    pub non_duplicate_count: usize,
}

/// Split candidates into (surviving, warning) against the target course's
/// existing video names.
///
/// Returns `None` for the warning when no candidate name collides; the
/// caller may then commit without an external decision.
pub fn screen_duplicates(
    candidates: Vec<NewVideo>,
    existing_names: &[String],
) -> (Vec<NewVideo>, Option<DuplicateWarning>) {
    let existing: HashSet<String> = existing_names.iter().map(|n| n.to_lowercase()).collect();

    let mut duplicate_names = Vec::new();
    let mut surviving = Vec::new();
    for candidate in candidates {
        if existing.contains(&candidate.name.to_lowercase()) {
            duplicate_names.push(candidate.name);
        } else {
            surviving.push(candidate);
        }
    }

    if duplicate_names.is_empty() {
        return (surviving, None);
    }
    let warning = DuplicateWarning {
        duplicate_names,
        non_duplicate_count: surviving.len(),
    };
    (surviving, Some(warning))
}

/// Resolve a course title: explicit title, then archive stem, then a
/// date-stamped default.
pub fn resolve_course_title(
    explicit: Option<&str>,
    archive_name: Option<&str>,
    now: Timestamp,
) -> String {
    if let Some(title) = explicit {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }
    if let Some(name) = archive_name {
        return archive_stem(name);
    }
    format!("Course - {}", now.format("%Y-%m-%d"))
}

/// Strip a trailing `.zip` (case-insensitive) from an archive file name.
fn archive_stem(name: &str) -> String {
    if name.to_lowercase().ends_with(".zip") {
        name[..name.len() - 4].to_string()
    } else {
        name.to_string()
    }
}
