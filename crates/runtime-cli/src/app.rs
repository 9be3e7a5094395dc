use std::sync::Arc;

use anyhow::{Context, Result};
use ingestion_embedding::{Embedder, EmbeddingConfig, HashingEmbedder};
use ranking_engine::{RankingEngine, SearchContext};
use runtime_config::Config;
use runtime_router::{SearchRouter, SharedRouter};
use storage_corpus::ProfileCorpus;
use storage_feedback::JsonlFeedbackLog;

pub fn build_router(config: &Config) -> Result<SharedRouter> {
    Ok(Arc::new(SearchRouter::new(Arc::new(build_engine(config)?))))
}

pub fn build_engine(config: &Config) -> Result<RankingEngine> {
    let embedder = HashingEmbedder::new(EmbeddingConfig::new(
        config.embedding.encoder_id.clone(),
        config.embedding.dimensions,
    ))
    .context("configuring embedder")?;
    let corpus = load_corpus(config, &embedder)?;
    let feedback = JsonlFeedbackLog::new(&config.feedback.log_path);
    let context = SearchContext::new(Arc::new(embedder), Arc::new(corpus));
    RankingEngine::new(context, Arc::new(feedback), config.ranking.clone())
        .context("building ranking engine")
}

/// Snapshot first, then the records file (saving a fresh snapshot when one is
/// configured), then an empty corpus.
pub fn load_corpus(config: &Config, embedder: &dyn Embedder) -> Result<ProfileCorpus> {
    if let Some(path) = &config.corpus.snapshot_path {
        let snapshot = storage_corpus::load_snapshot(path)
            .with_context(|| format!("loading corpus snapshot {}", path.display()))?;
        match snapshot {
            Some(corpus)
                if corpus.encoder_id() == embedder.encoder_id()
                    && corpus.dimensions() == embedder.dimensions() =>
            {
                return Ok(corpus);
            }
            Some(corpus) => tracing::warn!(
                path = %path.display(),
                snapshot_encoder = corpus.encoder_id(),
                snapshot_dimensions = corpus.dimensions(),
                "snapshot was built by another encoder; re-embedding records"
            ),
            None => {}
        }
    }

    let Some(records_path) = &config.corpus.records_path else {
        tracing::warn!("no corpus source configured; corpus is empty");
        return Ok(ProfileCorpus::empty(
            embedder.encoder_id(),
            embedder.dimensions(),
        ));
    };
    let records = storage_corpus::load_records(records_path)
        .with_context(|| format!("loading profile records {}", records_path.display()))?;
    let corpus = ProfileCorpus::embed_records(records, embedder).context("embedding profiles")?;

    if let Some(path) = &config.corpus.snapshot_path {
        if !corpus.is_empty() {
            storage_corpus::save_snapshot(path, &corpus)
                .with_context(|| format!("saving corpus snapshot {}", path.display()))?;
            tracing::info!(path = %path.display(), "saved corpus snapshot");
        }
    }
    Ok(corpus)
}
