/// All primary keys are opaque TEXT UUIDs (SQLite has no native uuid type).
pub type DbId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Progress percentage at or above which a video counts as watched.
pub const WATCHED_THRESHOLD: f64 = 95.0;

/// Mint a fresh opaque id.
pub fn new_id() -> DbId {
    uuid::Uuid::new_v4().to_string()
}

/// Clamp a progress value to the valid `[0, 100]` range.
pub fn clamp_progress(progress: f64) -> f64 {
    progress.clamp(0.0, 100.0)
}

/// Whether a progress value crosses the watch-completion threshold.
pub fn is_watched(progress: f64) -> bool {
    progress >= WATCHED_THRESHOLD
}
