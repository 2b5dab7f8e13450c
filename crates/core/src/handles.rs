//! Revocable playable handles over binary payloads.
//!
//! A handle lets a playback surface stream a payload without copying it.
//! Handles are minted fresh on every bulk read and never deduplicated, so
//! callers release the previous read's handles before discarding it (or
//! accept bounded leakage until teardown). Deleting a video or course
//! releases all of its outstanding handles as part of the same deletion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::DbId;

/// Opaque handle identifier.
pub type HandleId = String;

/// A live reference to a payload, valid until released.
#[derive(Debug, Clone)]
pub struct BlobHandle {
    id: HandleId,
    video_id: DbId,
    payload: Arc<Vec<u8>>,
}

impl BlobHandle {
    pub fn id(&self) -> &HandleId {
        &self.id
    }

    pub fn video_id(&self) -> &DbId {
        &self.video_id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }
}

/// Registry of outstanding handles, owned by the presentation layer.
///
/// Lifecycle is "minted on course-list read, released on the next read or
/// on deletion" — not app-lifetime ambient state.
#[derive(Debug, Default)]
pub struct BlobHandleRegistry {
    inner: Mutex<HashMap<HandleId, DbId>>,
}

impl BlobHandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<HandleId, DbId>> {
        self.inner.lock().expect("handle registry lock poisoned")
    }

    /// Mint a fresh handle for a payload. Every call returns a distinct
    /// handle, even for the same payload.
    pub fn acquire(&self, video_id: &DbId, payload: Arc<Vec<u8>>) -> BlobHandle {
        let id = crate::types::new_id();
        self.lock().insert(id.clone(), video_id.clone());
        BlobHandle {
            id,
            video_id: video_id.clone(),
            payload,
        }
    }

    /// Invalidate one handle. Returns `false` if it was already released.
    pub fn release(&self, handle_id: &HandleId) -> bool {
        self.lock().remove(handle_id).is_some()
    }

    /// Invalidate every outstanding handle for a video. Returns how many
    /// were released. Used by the delete paths so handles never outlive
    /// the owning record.
    pub fn release_for_video(&self, video_id: &DbId) -> usize {
        let mut inner = self.lock();
        let before = inner.len();
        inner.retain(|_, owner| owner != video_id);
        before - inner.len()
    }

    pub fn is_active(&self, handle_id: &HandleId) -> bool {
        self.lock().contains_key(handle_id)
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }
}
