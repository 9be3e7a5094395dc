//! Feedback log persistence: past queries and the profiles users confirmed.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use storage_corpus::{Profile, ProfileAttributes, ProfileId};
use thiserror::Error;
use uuid::Uuid;

mod jsonl;

pub use jsonl::JsonlFeedbackLog;

/// By-value copy of a profile as it looked when the user selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedProfile {
    /// Absent for entries written before profiles carried ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    #[serde(flatten)]
    pub attributes: ProfileAttributes,
}

impl From<&Profile> for SelectedProfile {
    fn from(profile: &Profile) -> Self {
        Self {
            profile_id: Some(profile.id.clone()),
            attributes: profile.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    #[serde(default = "Uuid::new_v4")]
    pub entry_id: Uuid,
    pub query: String,
    pub query_embedding: Vec<f32>,
    pub selected_profiles: Vec<SelectedProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at_ms: Option<u64>,
}

impl FeedbackEntry {
    pub fn new(query: impl Into<String>, query_embedding: Vec<f32>, selected: &[Profile]) -> Self {
        let recorded_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_millis() as u64);
        Self {
            entry_id: Uuid::new_v4(),
            query: query.into(),
            query_embedding,
            selected_profiles: selected.iter().map(SelectedProfile::from).collect(),
            recorded_at_ms,
        }
    }
}

/// Append-only store of [`FeedbackEntry`] records.
pub trait FeedbackLog: Send + Sync {
    /// All entries in append order. Missing or unreadable storage yields an
    /// empty history rather than an error.
    fn load(&self) -> Vec<FeedbackEntry>;
    /// Persist one entry. An `Err` means the entry was not stored.
    fn append(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError>;
}

/// In-memory log for tests and hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryFeedbackLog {
    entries: Mutex<Vec<FeedbackEntry>>,
}

impl MemoryFeedbackLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entries(entries: Vec<FeedbackEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl FeedbackLog for MemoryFeedbackLog {
    fn load(&self) -> Vec<FeedbackEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn append(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| FeedbackError::LockPoisoned)?;
        guard.push(entry.clone());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("feedback I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialise feedback entry: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("feedback writer lock poisoned")]
    LockPoisoned,
}
