//! Two-phase ingestion: propose, then commit.
//!
//! Proposal classifies and decodes an upload batch without touching the
//! store; name collisions against an existing course surface as a
//! [`DuplicateWarning`] on the affected batch. Commit requires an explicit
//! [`BatchDecision::Proceed`] for every warned batch — declining (or
//! saying nothing) leaves the store byte-for-byte unchanged for that
//! batch. This is the one suspension point that waits on external input
//! rather than I/O.

use serde::Serialize;

use coursehub_core::classify::RawInput;
use coursehub_core::ingest::{CourseMutation, DuplicateWarning};
use coursehub_core::types::DbId;
use coursehub_db::StoreError;

/// Where an ingestion batch is headed.
#[derive(Debug, Clone)]
pub enum IngestTarget {
    /// Synthesize a new course per contributing input set.
    NewCourse,
    /// Append to an existing course.
    Existing(DbId),
}

/// One user-initiated upload: any mix of archives and direct media.
#[derive(Debug)]
pub struct IngestRequest {
    pub target: IngestTarget,
    pub inputs: Vec<RawInput>,
    /// Explicit course title for new-course targets.
    pub title: Option<String>,
    pub description: Option<String>,
}

/// The input set a batch was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchSource {
    /// One uploaded archive; its basename doubles as the fallback title.
    Archive { file_name: String },
    /// All directly-selected media files in the upload, pooled into a
    /// single batch so N files become one course, never N courses.
    DirectSelection,
}

/// A planned, not-yet-committed batch.
#[derive(Debug)]
pub struct ProposedBatch {
    pub source: BatchSource,
    /// Net store effect once duplicates are removed.
    pub mutation: CourseMutation,
    /// Present when candidate names collide with the target course;
    /// commit then requires an explicit decision.
    pub warning: Option<DuplicateWarning>,
}

impl ProposedBatch {
    /// Whether committing this batch needs an external decision first.
    pub fn needs_decision(&self) -> bool {
        self.warning.is_some()
    }
}

/// Per-input diagnostics collected during proposal. None of these abort
/// sibling inputs in the same upload.
#[derive(Debug, Clone, Serialize)]
pub enum InputReport {
    /// Archive structure unreadable; that archive contributed nothing.
    CorruptArchive { file_name: String, detail: String },
    /// An entry exceeded the in-memory materialization budget; the whole
    /// archive is abandoned and the user should extract and upload the
    /// files individually.
    EntryTooLarge {
        file_name: String,
        entry: String,
        size: u64,
    },
    /// Archive decoded cleanly but held no qualifying media.
    EmptyArchive { file_name: String },
}

/// Result of the proposal phase. No writes have happened yet.
#[derive(Debug)]
pub struct IngestProposal {
    pub target: IngestTarget,
    pub batches: Vec<ProposedBatch>,
    pub reports: Vec<InputReport>,
}

impl IngestProposal {
    /// Indices of batches that cannot commit without a decision.
    pub fn pending_decisions(&self) -> Vec<usize> {
        self.batches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.needs_decision())
            .map(|(i, _)| i)
            .collect()
    }
}

/// The caller's answer to a duplicate warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchDecision {
    /// Commit the surviving (non-duplicate) candidates.
    Proceed,
    /// Drop the batch with zero persisted side effects.
    Cancel,
}

/// Per-batch commit result; partial success is reported per contributing
/// input, never as one undifferentiated failure.
#[derive(Debug)]
pub enum BatchOutcome {
    CourseCreated {
        source: BatchSource,
        course_id: DbId,
        videos: usize,
    },
    VideosAppended {
        source: BatchSource,
        course_id: DbId,
        videos: usize,
    },
    /// Declined, undecided, or nothing left after removing duplicates.
    Skipped { source: BatchSource },
    /// The store transaction failed; the caller retries this batch as a
    /// whole. Siblings are unaffected.
    Failed {
        source: BatchSource,
        error: StoreError,
    },
}
