//! Classification of raw upload inputs.
//!
//! Upload batches arrive as opaque file-like inputs carrying a name, a
//! size, and an optional declared media type. Before any extraction runs,
//! each input is tagged with a closed [`InputKind`] so the dispatch policy
//! is testable in isolation from decoding.

use serde::{Deserialize, Serialize};

/// Archive file name suffix recognized by the pipeline.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Declared media type prefix identifying direct video inputs.
pub const VIDEO_MEDIA_TYPE_PREFIX: &str = "video/";

/// A raw file-like input submitted in an upload batch.
#[derive(Debug, Clone)]
pub struct RawInput {
    /// Original file name (e.g. "lesson1.mp4", "course.zip").
    pub name: String,
    /// Size in bytes as declared by the input source.
    pub size: u64,
    /// Declared media type, if any (e.g. "video/mp4").
    pub media_type: Option<String>,
    /// Raw content.
    pub bytes: Vec<u8>,
}

/// The closed classification an input receives before any branching logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// A compressed archive to be decoded entry by entry.
    Archive,
    /// A directly-selected video file.
    Media,
    /// Anything else; silently dropped by the pipeline.
    Unrecognized,
}

/// Classify an input from its name and declared media type.
///
/// A `.zip` suffix (case-insensitive) wins over a declared media type;
/// otherwise a `video/` media type marks direct media.
pub fn classify(name: &str, media_type: Option<&str>) -> InputKind {
    if name.to_lowercase().ends_with(ARCHIVE_SUFFIX) {
        InputKind::Archive
    } else if media_type
        .map(|t| t.starts_with(VIDEO_MEDIA_TYPE_PREFIX))
        .unwrap_or(false)
    {
        InputKind::Media
    } else {
        InputKind::Unrecognized
    }
}

impl RawInput {
    pub fn kind(&self) -> InputKind {
        classify(&self.name, self.media_type.as_deref())
    }
}
