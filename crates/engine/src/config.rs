//! Engine configuration loaded from environment variables.

use std::path::PathBuf;

/// Configuration for a [`crate::Library`].
///
/// All fields have defaults suitable for local use; override via
/// environment variables.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Path of the SQLite database file (default: `coursehub.db`).
    pub database_path: PathBuf,
    /// Budget for materializing a single archive entry into memory,
    /// in bytes (default: 1 GiB).
    pub max_entry_bytes: u64,
    /// Position of the sampled thumbnail frame as a fraction of total
    /// duration (default: `0.1`).
    pub thumbnail_seek_fraction: f64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("coursehub.db"),
            max_entry_bytes: 1024 * 1024 * 1024,
            thumbnail_seek_fraction: coursehub_core::thumbnail::DEFAULT_SEEK_FRACTION,
        }
    }
}

impl LibraryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                             | Default        |
    /// |-------------------------------------|----------------|
    /// | `COURSEHUB_DATABASE_PATH`           | `coursehub.db` |
    /// | `COURSEHUB_MAX_ENTRY_BYTES`         | `1073741824`   |
    /// | `COURSEHUB_THUMBNAIL_SEEK_FRACTION` | `0.1`          |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let database_path = std::env::var("COURSEHUB_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_entry_bytes = std::env::var("COURSEHUB_MAX_ENTRY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_entry_bytes);

        let thumbnail_seek_fraction = std::env::var("COURSEHUB_THUMBNAIL_SEEK_FRACTION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.thumbnail_seek_fraction);

        Self {
            database_path,
            max_entry_bytes,
            thumbnail_seek_fraction,
        }
    }
}
