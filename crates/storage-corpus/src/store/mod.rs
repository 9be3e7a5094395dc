use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{CorpusEntry, ProfileCorpus};
use crate::error::CorpusError;
use crate::profile::{Profile, ProfileAttributes, ProfileId};

pub mod fs;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    encoder_id: String,
    dimensions: usize,
    entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    profile_id: ProfileId,
    attributes: ProfileAttributes,
    embedding: Vec<f32>,
}

/// Load profile records from a JSON array of attribute maps.
///
/// A missing or blank file is an empty corpus, not an error.
pub fn load_records(path: &Path) -> Result<Vec<ProfileAttributes>, CorpusError> {
    let Some(text) = read(path)? else {
        tracing::warn!(path = %path.display(), "profile records missing; corpus is empty");
        return Ok(Vec::new());
    };
    if text.trim().is_empty() {
        tracing::warn!(path = %path.display(), "profile records empty; corpus is empty");
        return Ok(Vec::new());
    }
    let records: Vec<ProfileAttributes> =
        serde_json::from_str(&text).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), records = records.len(), "loaded profile records");
    Ok(records)
}

/// Load a persisted corpus with its embeddings. `None` when the file is absent.
pub fn load_snapshot(path: &Path) -> Result<Option<ProfileCorpus>, CorpusError> {
    let Some(text) = read(path)? else {
        tracing::warn!(path = %path.display(), "corpus snapshot missing");
        return Ok(None);
    };
    let document: SnapshotDocument =
        serde_json::from_str(&text).map_err(|source| CorpusError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let entries = document
        .entries
        .into_iter()
        .map(|entry| CorpusEntry {
            profile: Profile::new(entry.profile_id, entry.attributes),
            embedding: entry.embedding,
        })
        .collect();
    let corpus = ProfileCorpus::new(document.encoder_id, document.dimensions, entries)?;
    tracing::info!(
        path = %path.display(),
        profiles = corpus.len(),
        encoder_id = corpus.encoder_id(),
        "loaded corpus snapshot"
    );
    Ok(Some(corpus))
}

/// Persist `corpus` atomically.
pub fn save_snapshot(path: &Path, corpus: &ProfileCorpus) -> Result<(), CorpusError> {
    let document = SnapshotDocument {
        encoder_id: corpus.encoder_id().to_string(),
        dimensions: corpus.dimensions(),
        entries: corpus
            .entries()
            .iter()
            .map(|entry| SnapshotEntry {
                profile_id: entry.profile.id.clone(),
                attributes: entry.profile.attributes.clone(),
                embedding: entry.embedding.clone(),
            })
            .collect(),
    };
    let bytes = serde_json::to_vec(&document).map_err(CorpusError::Serialize)?;
    fs::atomic_write(path, &bytes).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read(path: &Path) -> Result<Option<String>, CorpusError> {
    fs::read_optional(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })
}
