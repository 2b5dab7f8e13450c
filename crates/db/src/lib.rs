//! SQLite persistence for the CourseHub library.
//!
//! Two collections — course metadata and video records (payload included)
//! — joined by `videos.course_id`, with `courses.video_order` defining
//! playback order. All multi-step writes run inside one transaction.

pub mod models;
pub mod repositories;
pub mod store;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use coursehub_core::types::DbId;

pub use store::{CourseGraph, CourseStore};

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Targeted mutation on a record whose absence is semantically
    /// meaningful (e.g. a notes save racing a deletion is a desync
    /// worth surfacing).
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The underlying transactional store failed; the caller retries the
    /// whole logical operation, not individual steps.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Open (creating if missing) a pooled connection to the library database.
pub async fn create_pool(database_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity check.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
