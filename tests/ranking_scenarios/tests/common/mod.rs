#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use ingestion_embedding::{Embedder, EmbeddingError};
use ranking_engine::{RankingConfig, RankingEngine, SearchContext};
use storage_corpus::{CorpusEntry, Profile, ProfileAttributes, ProfileCorpus, ProfileId};
use storage_feedback::FeedbackLog;

pub const ENCODER: &str = "table";

/// Embedding of every query used in these scenarios.
pub const QUERY: [f32; 2] = [1.0, 0.0];

/// Unit vector whose cosine with [`QUERY`] is `similarity`.
pub fn at(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).max(0.0).sqrt()]
}

pub fn profile(name: &str) -> Profile {
    let attributes = ProfileAttributes::new()
        .with("name", name)
        .with("position", "Engineer");
    Profile::new(ProfileId::from_attributes(&attributes), attributes)
}

/// One profile per similarity, named `P0`, `P1`, ...
pub fn corpus(similarities: &[f32]) -> ProfileCorpus {
    let entries = similarities
        .iter()
        .enumerate()
        .map(|(index, similarity)| CorpusEntry {
            profile: profile(&format!("P{index}")),
            embedding: at(*similarity),
        })
        .collect();
    ProfileCorpus::new(ENCODER, 2, entries).unwrap()
}

/// Maps known texts to fixed vectors.
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(pairs: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            vectors: pairs
                .into_iter()
                .map(|(text, vector)| (text.to_string(), vector))
                .collect(),
        }
    }
}

impl Embedder for TableEmbedder {
    fn encoder_id(&self) -> &str {
        ENCODER
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbeddingError::Provider(format!("no vector for {text:?}")))
    }
}

pub fn engine(
    corpus: ProfileCorpus,
    embedder: TableEmbedder,
    log: Arc<dyn FeedbackLog>,
    config: RankingConfig,
) -> RankingEngine {
    let context = SearchContext::new(Arc::new(embedder), Arc::new(corpus));
    RankingEngine::new(context, log, config).unwrap()
}

/// Small deterministic generator for similarity grids.
pub struct Lcg(u64);

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform-ish value in `[-1, 1]`.
    pub fn next_similarity(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let unit = (self.0 >> 40) as f32 / (1u64 << 24) as f32;
        unit * 2.0 - 1.0
    }
}
