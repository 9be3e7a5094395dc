use std::collections::HashSet;

use ingestion_embedding::{profile_text, Embedder};

use crate::error::CorpusError;
use crate::profile::{assign_ids, Profile, ProfileAttributes, ProfileId};

/// A profile paired with its embedding. Keeping both in one record is what
/// keeps the matrix and the profile list index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub profile: Profile,
    pub embedding: Vec<f32>,
}

/// Read-only in-memory corpus, loaded once per process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCorpus {
    encoder_id: String,
    dimensions: usize,
    entries: Vec<CorpusEntry>,
}

impl ProfileCorpus {
    #[must_use]
    pub fn empty(encoder_id: impl Into<String>, dimensions: usize) -> Self {
        Self {
            encoder_id: encoder_id.into(),
            dimensions,
            entries: Vec::new(),
        }
    }

    /// Build a corpus, checking every embedding has `dimensions` components
    /// and ids are unique.
    pub fn new(
        encoder_id: impl Into<String>,
        dimensions: usize,
        entries: Vec<CorpusEntry>,
    ) -> Result<Self, CorpusError> {
        let mut ids = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.embedding.len() != dimensions {
                return Err(CorpusError::DimensionMismatch {
                    index,
                    expected: dimensions,
                    actual: entry.embedding.len(),
                });
            }
            if !ids.insert(&entry.profile.id) {
                return Err(CorpusError::DuplicateId(entry.profile.id.clone()));
            }
        }
        Ok(Self {
            encoder_id: encoder_id.into(),
            dimensions,
            entries,
        })
    }

    /// Embed each record's profile text and assign content-addressed ids.
    pub fn embed_records(
        records: Vec<ProfileAttributes>,
        embedder: &dyn Embedder,
    ) -> Result<Self, CorpusError> {
        let profiles = assign_ids(records);
        let texts: Vec<String> = profiles
            .iter()
            .map(|profile| profile_text(|field| profile.get(field)))
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = embedder.embed_batch(&refs)?;
        let entries = profiles
            .into_iter()
            .zip(embeddings)
            .map(|(profile, embedding)| CorpusEntry { profile, embedding })
            .collect();
        tracing::info!(
            encoder_id = embedder.encoder_id(),
            profiles = texts.len(),
            "embedded profile corpus"
        );
        Self::new(embedder.encoder_id(), embedder.dimensions(), entries)
    }

    #[must_use]
    pub fn encoder_id(&self) -> &str {
        &self.encoder_id
    }

    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[must_use]
    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ProfileId) -> Option<&Profile> {
        self.entries
            .iter()
            .map(|entry| &entry.profile)
            .find(|profile| &profile.id == id)
    }

    /// Profiles whose `name` attribute equals `name`, in corpus order.
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Profile> + 'a {
        self.entries
            .iter()
            .map(|entry| &entry.profile)
            .filter(move |profile| profile.name() == name)
    }
}
