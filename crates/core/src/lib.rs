//! Pure domain logic for the CourseHub library engine.
//!
//! No database access and no orchestration here. This crate provides:
//!
//! - Id/timestamp types and the watch-completion threshold.
//! - The error taxonomy shared by ingestion and storage callers.
//! - Classification of raw upload inputs (archive / media / unrecognized).
//! - ZIP archive decoding filtered to playable video entries.
//! - Ingestion planning: candidate videos, course mutations, duplicate
//!   detection, and course-title fallback.
//! - FFmpeg/FFprobe command utilities and best-effort thumbnail extraction.
//! - The revocable blob-handle registry used by playback surfaces.

pub mod archive;
pub mod classify;
pub mod error;
pub mod ffmpeg;
pub mod handles;
pub mod ingest;
pub mod thumbnail;
pub mod types;

pub use error::CoreError;
pub use handles::{BlobHandle, BlobHandleRegistry};
pub use types::{DbId, Timestamp};
