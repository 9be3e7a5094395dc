use std::sync::Arc;

use ingestion_embedding::EmbeddingError;
use serde::Serialize;
use storage_corpus::{Profile, ProfileCorpus};
use storage_feedback::{FeedbackEntry, FeedbackLog};

use crate::boost::FeedbackBoosts;
use crate::config::RankingConfig;
use crate::context::SearchContext;
use crate::error::RankingError;
use crate::explain::Explainer;
use crate::similarity::{adaptive_threshold, cosine_similarity, descending};

/// One profile in a ranked result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub profile: Profile,
    pub similarity: f32,
    pub boost: u32,
    pub explanation: String,
}

/// Results plus the intermediate values that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub threshold: f32,
    pub max_similarity: f32,
    pub fallback_used: bool,
    pub matched_feedback: usize,
    pub results: Vec<RankedResult>,
}

impl RankingReport {
    fn empty(base_threshold: f32) -> Self {
        Self {
            threshold: base_threshold,
            max_similarity: 0.0,
            fallback_used: false,
            matched_feedback: 0,
            results: Vec::new(),
        }
    }
}

/// Ranks a query embedding against `corpus` and past `feedback`.
///
/// Candidates are the profiles at or above the adaptive threshold, or the top
/// `top_n` by similarity when fewer than `top_n` pass. Final order is boost
/// descending, then similarity descending, then corpus order.
#[must_use]
pub fn rank_embedded(
    corpus: &ProfileCorpus,
    query: &str,
    query_embedding: &[f32],
    feedback: &[FeedbackEntry],
    top_n: usize,
    base_threshold: f32,
    config: &RankingConfig,
) -> RankingReport {
    if corpus.is_empty() {
        return RankingReport::empty(base_threshold);
    }
    let entries = corpus.entries();
    let mut scored: Vec<(usize, f32)> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| (index, cosine_similarity(query_embedding, &entry.embedding)))
        .collect();
    scored.sort_by(|a, b| descending(a.1, b.1));

    let max_similarity = scored[0].1;
    let threshold = adaptive_threshold(base_threshold, config.threshold_scale, max_similarity);
    let passing = scored
        .iter()
        .take_while(|(_, similarity)| *similarity >= threshold)
        .count();
    let fallback_used = passing < top_n;
    let survivors = if fallback_used {
        &scored[..top_n.min(scored.len())]
    } else {
        &scored[..passing]
    };

    let boosts = FeedbackBoosts::collect(
        feedback,
        query_embedding,
        config.feedback_similarity_cutoff,
        config.legacy_name_matching,
    );
    let mut ranked: Vec<(usize, f32, u32)> = survivors
        .iter()
        .map(|&(index, similarity)| {
            (index, similarity, boosts.boost_for(&entries[index].profile))
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| descending(a.1, b.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    tracing::debug!(
        threshold,
        max_similarity,
        passing,
        fallback_used,
        matched_feedback = boosts.matched_entries(),
        "ranked query"
    );

    let explainer = Explainer::new(config.about_preview_chars);
    let results = ranked
        .into_iter()
        .map(|(index, similarity, boost)| {
            let profile = entries[index].profile.clone();
            let explanation = explainer.explain(&profile, query);
            RankedResult {
                profile,
                similarity,
                boost,
                explanation,
            }
        })
        .collect();

    RankingReport {
        threshold,
        max_similarity,
        fallback_used,
        matched_feedback: boosts.matched_entries(),
        results,
    }
}

/// Search front door: embeds queries, reads feedback, ranks, records feedback.
pub struct RankingEngine {
    context: SearchContext,
    feedback: Arc<dyn FeedbackLog>,
    config: RankingConfig,
}

impl RankingEngine {
    /// Fails when a non-empty corpus was embedded by a different encoder.
    pub fn new(
        context: SearchContext,
        feedback: Arc<dyn FeedbackLog>,
        config: RankingConfig,
    ) -> Result<Self, RankingError> {
        let corpus = context.corpus();
        let embedder = context.embedder();
        if !corpus.is_empty()
            && (corpus.encoder_id() != embedder.encoder_id()
                || corpus.dimensions() != embedder.dimensions())
        {
            return Err(RankingError::EncoderMismatch {
                corpus: format!("{}/{}", corpus.encoder_id(), corpus.dimensions()),
                embedder: format!("{}/{}", embedder.encoder_id(), embedder.dimensions()),
            });
        }
        Ok(Self {
            context,
            feedback,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &RankingConfig {
        &self.config
    }

    #[must_use]
    pub const fn context(&self) -> &SearchContext {
        &self.context
    }

    /// Rank with the configured `top_n` and `base_threshold`.
    pub fn search(&self, query: &str) -> Result<Vec<RankedResult>, RankingError> {
        self.rank(query, self.config.top_n, self.config.base_threshold)
    }

    pub fn rank(
        &self,
        query: &str,
        top_n: usize,
        base_threshold: f32,
    ) -> Result<Vec<RankedResult>, RankingError> {
        self.rank_report(query, top_n, base_threshold)
            .map(|report| report.results)
    }

    pub fn rank_report(
        &self,
        query: &str,
        top_n: usize,
        base_threshold: f32,
    ) -> Result<RankingReport, RankingError> {
        let corpus = self.context.corpus();
        if corpus.is_empty() {
            tracing::debug!("corpus is empty; returning no results");
            return Ok(RankingReport::empty(base_threshold));
        }
        let query_embedding = self.embed(query)?;
        let feedback = self.feedback.load();
        Ok(rank_embedded(
            corpus,
            query,
            &query_embedding,
            &feedback,
            top_n,
            base_threshold,
            &self.config,
        ))
    }

    /// Embed `query`, snapshot `selected` by value and append the entry.
    pub fn submit_feedback(
        &self,
        query: &str,
        selected: &[Profile],
    ) -> Result<FeedbackEntry, RankingError> {
        let query_embedding = self.embed(query)?;
        let entry = FeedbackEntry::new(query, query_embedding, selected);
        self.feedback.append(&entry)?;
        Ok(entry)
    }

    /// Current feedback history, as the next search would see it.
    #[must_use]
    pub fn feedback_entries(&self) -> Vec<FeedbackEntry> {
        self.feedback.load()
    }

    fn embed(&self, query: &str) -> Result<Vec<f32>, RankingError> {
        let embedder = self.context.embedder();
        let vector = embedder.embed(query)?;
        if vector.len() != embedder.dimensions() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: embedder.dimensions(),
                actual: vector.len(),
            }
            .into());
        }
        Ok(vector)
    }
}
