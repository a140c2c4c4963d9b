//! In-memory track registry.
//!
//! Process-wide map of every submitted render job plus user bookkeeping
//! (favorites, title edits). Constructed once at startup and injected into
//! the orchestrator and route handlers; per-key updates are
//! last-write-wins and status transitions only ever move forward.

use crate::render::{RenderJob, RenderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// How a track came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Inspiration,
    Custom,
    FullAi,
    LyricsOnly,
    MusicOnly,
    Cover,
    Extend,
    Remaster,
    Crop,
    Speed,
    #[serde(rename = "whole-song")]
    WholeSong,
}

impl GenerationMode {
    /// Whether this mode submits a rendering job at all.
    pub fn renders(&self) -> bool {
        !matches!(self, GenerationMode::LyricsOnly)
    }

    /// Whether the mode needs lyrics before rendering.
    pub fn requires_lyrics(&self) -> bool {
        matches!(
            self,
            GenerationMode::FullAi | GenerationMode::LyricsOnly | GenerationMode::WholeSong
        )
    }
}

/// One registered track: the render-job surface plus user bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct TrackRecord {
    pub id: String,
    pub status: RenderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub mode: GenerationMode,
    pub created_at: DateTime<Utc>,
}

impl TrackRecord {
    /// A freshly submitted track.
    pub fn new(id: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            id: id.into(),
            status: RenderStatus::Queued,
            title: None,
            lyrics: None,
            audio_url: None,
            video_url: None,
            image_url: None,
            duration_seconds: None,
            error_message: None,
            tags: Vec::new(),
            is_favorite: false,
            mode,
            created_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = dedup_tags(tags);
        self
    }
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

/// The registry itself. One record per job id.
#[derive(Default)]
pub struct TrackRegistry {
    tracks: RwLock<HashMap<String, TrackRecord>>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a track. Re-inserting an id replaces the record
    /// (last-write-wins).
    pub fn insert(&self, record: TrackRecord) {
        let mut tracks = self.tracks.write().unwrap();
        tracks.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<TrackRecord> {
        self.tracks.read().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tracks.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge a status-query result into the matching record.
    ///
    /// Returns false when no record exists for the job. A terminal record
    /// is frozen: later vendor answers cannot regress it, so callers never
    /// observe "processing" again after "complete"/"error". Non-terminal
    /// records take forward status moves and any newly populated fields.
    pub fn merge_job(&self, job: &RenderJob) -> bool {
        let mut tracks = self.tracks.write().unwrap();
        let Some(record) = tracks.get_mut(&job.id) else {
            return false;
        };

        if record.status.is_terminal() {
            return true;
        }

        if job.status.rank() >= record.status.rank() {
            record.status = job.status;
        }
        if job.title.is_some() {
            record.title = job.title.clone();
        }
        if job.lyrics.is_some() {
            record.lyrics = job.lyrics.clone();
        }
        if job.audio_url.is_some() {
            record.audio_url = job.audio_url.clone();
        }
        if job.video_url.is_some() {
            record.video_url = job.video_url.clone();
        }
        if job.image_url.is_some() {
            record.image_url = job.image_url.clone();
        }
        if job.duration_seconds.is_some() {
            record.duration_seconds = job.duration_seconds;
        }
        record.error_message = if record.status == RenderStatus::Failed {
            job.error_message.clone()
        } else {
            None
        };
        true
    }

    /// List tracks newest-first. Returns the page and the total count
    /// (before pagination) so callers can build pagination controls.
    pub fn list(
        &self,
        offset: usize,
        limit: usize,
        favorites_only: bool,
    ) -> (Vec<TrackRecord>, usize) {
        let tracks = self.tracks.read().unwrap();
        let mut records: Vec<TrackRecord> = tracks
            .values()
            .filter(|t| !favorites_only || t.is_favorite)
            .cloned()
            .collect();
        // Newest first; id as a stable tie-break.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        let total = records.len();
        let page = records.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }

    pub fn set_favorite(&self, id: &str, is_favorite: bool) -> bool {
        let mut tracks = self.tracks.write().unwrap();
        match tracks.get_mut(id) {
            Some(record) => {
                record.is_favorite = is_favorite;
                true
            }
            None => false,
        }
    }

    pub fn set_title(&self, id: &str, title: impl Into<String>) -> bool {
        let mut tracks = self.tracks.write().unwrap();
        match tracks.get_mut(id) {
            Some(record) => {
                record.title = Some(title.into());
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        self.tracks.write().unwrap().remove(id).is_some()
    }
}
