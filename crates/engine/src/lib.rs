//! Orchestration layer for the CourseHub library.
//!
//! [`Library`] wires the transactional store, the blob-handle registry,
//! and the best-effort thumbnail path together, and runs the two-phase
//! ingestion pipeline. The presentation layer consumes this crate and
//! nothing below it.

pub mod config;
pub mod ingest;
pub mod quota;

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;

use coursehub_core::archive::ArchiveDecoder;
use coursehub_core::classify::InputKind;
use coursehub_core::error::CoreError;
use coursehub_core::handles::{BlobHandle, BlobHandleRegistry};
use coursehub_core::ingest::{
    resolve_course_title, screen_duplicates, CourseMutation, NewCourse, NewVideo,
};
use coursehub_core::thumbnail;
use coursehub_core::types::{clamp_progress, is_watched, DbId, Timestamp};
use coursehub_db::repositories::{CourseRepo, VideoRepo};
use coursehub_db::{CourseStore, StoreError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::LibraryConfig;
pub use ingest::{
    BatchDecision, BatchOutcome, BatchSource, IngestProposal, IngestRequest, IngestTarget,
    InputReport, ProposedBatch,
};
pub use quota::StorageEstimate;

/// Install the process-wide tracing subscriber. Call once from the
/// embedding application before opening the library.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Error type for library operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// A course as handed to the presentation layer: metadata plus videos in
/// playback order, each with a freshly-minted payload handle.
#[derive(Debug)]
pub struct CourseView {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub videos: Vec<PlayableVideo>,
}

/// A video ready for playback: metadata plus live handles.
#[derive(Debug)]
pub struct PlayableVideo {
    pub id: DbId,
    pub name: String,
    pub duration_secs: f64,
    pub progress: f64,
    pub watched: bool,
    pub notes: String,
    pub handle: BlobHandle,
    /// Present only when a thumbnail has been derived and cached.
    pub thumbnail: Option<BlobHandle>,
}

/// The library engine: store, handle registry, and ingestion pipeline.
pub struct Library {
    store: CourseStore,
    registry: BlobHandleRegistry,
    config: LibraryConfig,
}

impl Library {
    /// Open the library database (creating and migrating it if needed).
    pub async fn open(config: LibraryConfig) -> Result<Self, EngineError> {
        let pool = coursehub_db::create_pool(&config.database_path)
            .await
            .map_err(StoreError::from)?;
        coursehub_db::run_migrations(&pool)
            .await
            .map_err(StoreError::from)?;
        tracing::info!(path = %config.database_path.display(), "library database ready");
        Ok(Self::with_pool(pool, config))
    }

    /// Wrap an existing (already migrated) pool.
    pub fn with_pool(pool: SqlitePool, config: LibraryConfig) -> Self {
        Self {
            store: CourseStore::new(pool),
            registry: BlobHandleRegistry::new(),
            config,
        }
    }

    pub fn store(&self) -> &CourseStore {
        &self.store
    }

    pub fn registry(&self) -> &BlobHandleRegistry {
        &self.registry
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The sole bulk read: every course with videos resolved and ordered,
    /// each carrying a fresh playable handle (and a thumbnail handle when
    /// one is cached).
    ///
    /// Handles are never deduplicated across calls; release the previous
    /// read's handles before discarding it.
    pub async fn courses(&self) -> Result<Vec<CourseView>, EngineError> {
        let graphs = self.store.load_all().await?;

        let mut views = Vec::with_capacity(graphs.len());
        for graph in graphs {
            let mut videos = Vec::with_capacity(graph.videos.len());
            for video in graph.videos {
                let handle = self.registry.acquire(&video.id, Arc::new(video.payload));
                let thumbnail = video
                    .thumbnail
                    .map(|image| self.registry.acquire(&video.id, Arc::new(image)));
                videos.push(PlayableVideo {
                    id: video.id,
                    name: video.name,
                    duration_secs: video.duration_secs,
                    progress: video.progress,
                    watched: video.watched,
                    notes: video.notes,
                    handle,
                    thumbnail,
                });
            }
            views.push(CourseView {
                id: graph.course.id,
                name: graph.course.name,
                description: graph.course.description,
                created_at: graph.course.created_at,
                videos,
            });
        }
        Ok(views)
    }

    // ── Ingestion ────────────────────────────────────────────────────

    /// Phase one: classify and decode an upload batch. Performs no writes.
    ///
    /// Archives are decoded independently (each becomes its own batch,
    /// in archive order); all direct media inputs pool into one batch.
    /// Per-input failures are collected as reports and never abort
    /// sibling inputs.
    pub async fn propose_ingest(
        &self,
        request: IngestRequest,
    ) -> Result<IngestProposal, EngineError> {
        let existing_names = match &request.target {
            IngestTarget::Existing(course_id) => {
                CourseRepo::find_by_id(self.store.pool(), course_id)
                    .await
                    .map_err(StoreError::from)?
                    .ok_or_else(|| StoreError::NotFound {
                        entity: "course",
                        id: course_id.clone(),
                    })?;
                Some(
                    VideoRepo::names_by_course(self.store.pool(), course_id)
                        .await
                        .map_err(StoreError::from)?,
                )
            }
            IngestTarget::NewCourse => None,
        };

        let mut archive_sets: Vec<(String, Vec<NewVideo>)> = Vec::new();
        let mut direct_pool: Vec<NewVideo> = Vec::new();
        let mut reports: Vec<InputReport> = Vec::new();

        for input in request.inputs {
            match input.kind() {
                InputKind::Unrecognized => {
                    tracing::debug!(input = %input.name, "dropping unrecognized input");
                }
                InputKind::Media => {
                    direct_pool.push(NewVideo::new(input.name, input.bytes));
                }
                InputKind::Archive => {
                    let file_name = input.name;
                    let decoded = ArchiveDecoder::open(input.bytes)
                        .and_then(|decoder| decoder.extract_all(self.config.max_entry_bytes));
                    match decoded {
                        Ok(extracted) if extracted.is_empty() => {
                            reports.push(InputReport::EmptyArchive { file_name });
                        }
                        Ok(extracted) => {
                            let candidates = extracted
                                .into_iter()
                                .map(|v| NewVideo::new(v.file_name, v.payload))
                                .collect();
                            archive_sets.push((file_name, candidates));
                        }
                        Err(CoreError::EntryTooLarge { name, size }) => {
                            reports.push(InputReport::EntryTooLarge {
                                file_name,
                                entry: name,
                                size,
                            });
                        }
                        Err(e) => {
                            reports.push(InputReport::CorruptArchive {
                                file_name,
                                detail: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let mut batches = Vec::new();
        for (file_name, candidates) in archive_sets {
            let source = BatchSource::Archive {
                file_name: file_name.clone(),
            };
            batches.push(self.plan_batch(
                source,
                candidates,
                &request.target,
                request.title.as_deref(),
                request.description.as_deref(),
                Some(&file_name),
                existing_names.as_deref(),
            ));
        }
        if !direct_pool.is_empty() {
            batches.push(self.plan_batch(
                BatchSource::DirectSelection,
                direct_pool,
                &request.target,
                request.title.as_deref(),
                request.description.as_deref(),
                None,
                existing_names.as_deref(),
            ));
        }

        tracing::info!(
            batches = batches.len(),
            reports = reports.len(),
            "ingestion proposal built"
        );
        Ok(IngestProposal {
            target: request.target,
            batches,
            reports,
        })
    }

    /// Phase two: commit a proposal. Batches carrying a duplicate warning
    /// commit only on an explicit [`BatchDecision::Proceed`]; each batch
    /// is one store transaction, and a failing batch never aborts its
    /// siblings.
    pub async fn commit_ingest(
        &self,
        proposal: IngestProposal,
        decisions: &HashMap<usize, BatchDecision>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(proposal.batches.len());

        for (index, batch) in proposal.batches.into_iter().enumerate() {
            let ProposedBatch {
                source,
                mutation,
                warning,
            } = batch;

            if warning.is_some() && decisions.get(&index) != Some(&BatchDecision::Proceed) {
                tracing::info!(?source, "batch skipped pending duplicate decision");
                outcomes.push(BatchOutcome::Skipped { source });
                continue;
            }
            if mutation.is_empty() {
                outcomes.push(BatchOutcome::Skipped { source });
                continue;
            }

            let video_count = mutation.videos().len();
            let created = matches!(mutation, CourseMutation::CreateCourse { .. });
            match self.store.apply_mutation(mutation).await {
                Ok(course_id) if created => outcomes.push(BatchOutcome::CourseCreated {
                    source,
                    course_id,
                    videos: video_count,
                }),
                Ok(course_id) => outcomes.push(BatchOutcome::VideosAppended {
                    source,
                    course_id,
                    videos: video_count,
                }),
                Err(error) => {
                    tracing::warn!(?source, %error, "batch commit failed");
                    outcomes.push(BatchOutcome::Failed { source, error });
                }
            }
        }
        outcomes
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_batch(
        &self,
        source: BatchSource,
        candidates: Vec<NewVideo>,
        target: &IngestTarget,
        title: Option<&str>,
        description: Option<&str>,
        archive_name: Option<&str>,
        existing_names: Option<&[String]>,
    ) -> ProposedBatch {
        match target {
            IngestTarget::Existing(course_id) => {
                let (surviving, warning) =
                    screen_duplicates(candidates, existing_names.unwrap_or(&[]));
                ProposedBatch {
                    source,
                    mutation: CourseMutation::AppendVideos {
                        course_id: course_id.clone(),
                        videos: surviving,
                    },
                    warning,
                }
            }
            IngestTarget::NewCourse => {
                let name = resolve_course_title(title, archive_name, chrono::Utc::now());
                let course = NewCourse::new(name, description.unwrap_or_default().to_string());
                ProposedBatch {
                    source,
                    mutation: CourseMutation::CreateCourse {
                        course,
                        videos: candidates,
                    },
                    warning: None,
                }
            }
        }
    }

    // ── Targeted mutation ────────────────────────────────────────────

    /// Store clamped progress with an explicit watched override.
    pub async fn update_progress(
        &self,
        video_id: &DbId,
        progress: f64,
        watched: bool,
    ) -> Result<(), EngineError> {
        self.store.update_progress(video_id, progress, watched).await?;
        Ok(())
    }

    /// Store progress, deriving the watched flag from the completion
    /// threshold.
    pub async fn record_progress(&self, video_id: &DbId, progress: f64) -> Result<(), EngineError> {
        let clamped = clamp_progress(progress);
        self.update_progress(video_id, clamped, is_watched(clamped)).await
    }

    pub async fn save_notes(&self, video_id: &DbId, notes: &str) -> Result<(), EngineError> {
        self.store.save_notes(video_id, notes).await?;
        Ok(())
    }

    pub async fn reorder(&self, course_id: &DbId, new_order: Vec<DbId>) -> Result<(), EngineError> {
        self.store.reorder(course_id, new_order).await?;
        Ok(())
    }

    // ── Deletion (handles released as part of the same operation) ────

    /// Delete a course and all owned videos; releases every outstanding
    /// handle of the removed videos. Returns how many videos went.
    pub async fn delete_course(&self, course_id: &DbId) -> Result<usize, EngineError> {
        let removed = self.store.delete_course(course_id).await?;
        for video_id in &removed {
            self.registry.release_for_video(video_id);
        }
        Ok(removed.len())
    }

    /// Delete one video and release its outstanding handles.
    pub async fn delete_video(&self, video_id: &DbId) -> Result<(), EngineError> {
        self.store.delete_video(video_id).await?;
        self.registry.release_for_video(video_id);
        Ok(())
    }

    // ── Lazy derivation (best-effort, never blocks the main paths) ───

    /// Derive and cache a thumbnail for a video if none exists yet.
    ///
    /// Returns `true` when a thumbnail is available afterwards. Decode
    /// failures are absorbed; a missing video is `false`, not an error.
    pub async fn refresh_thumbnail(&self, video_id: &DbId) -> Result<bool, EngineError> {
        let video = match VideoRepo::find_by_id(self.store.pool(), video_id)
            .await
            .map_err(StoreError::from)?
        {
            Some(video) => video,
            None => return Ok(false),
        };
        if video.thumbnail.is_some() {
            return Ok(true);
        }

        match thumbnail::extract(&video.payload, self.config.thumbnail_seek_fraction).await {
            Some(image) => {
                self.store.set_thumbnail(video_id, &image).await?;
                Ok(true)
            }
            None => {
                tracing::debug!(video_id = %video_id, "thumbnail derivation yielded nothing");
                Ok(false)
            }
        }
    }

    /// Derive and record the duration if still unknown. Returns the
    /// duration when one is known afterwards.
    pub async fn ensure_duration(&self, video_id: &DbId) -> Result<Option<f64>, EngineError> {
        let video = match VideoRepo::find_by_id(self.store.pool(), video_id)
            .await
            .map_err(StoreError::from)?
        {
            Some(video) => video,
            None => return Ok(None),
        };
        if video.duration_secs > 0.0 {
            return Ok(Some(video.duration_secs));
        }

        match thumbnail::probe_duration_secs(&video.payload).await {
            Some(secs) => {
                self.store.set_duration(video_id, secs).await?;
                Ok(Some(secs))
            }
            None => Ok(None),
        }
    }

    // ── Introspection ────────────────────────────────────────────────

    /// Best-effort used/total storage bytes; `None` when the capability
    /// is unavailable.
    pub async fn storage_estimate(&self) -> Result<Option<StorageEstimate>, EngineError> {
        let payload_bytes = self.store.payload_bytes().await?;
        Ok(quota::storage_estimate(
            &self.config.database_path,
            payload_bytes,
        ))
    }
}
