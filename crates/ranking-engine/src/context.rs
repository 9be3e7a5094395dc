use std::fmt;
use std::sync::Arc;

use ingestion_embedding::Embedder;
use storage_corpus::ProfileCorpus;

/// Loaded model handle and corpus, built once and handed to the engine.
#[derive(Clone)]
pub struct SearchContext {
    embedder: Arc<dyn Embedder>,
    corpus: Arc<ProfileCorpus>,
}

impl SearchContext {
    pub fn new(embedder: Arc<dyn Embedder>, corpus: Arc<ProfileCorpus>) -> Self {
        Self { embedder, corpus }
    }

    #[must_use]
    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    #[must_use]
    pub fn corpus(&self) -> &ProfileCorpus {
        &self.corpus
    }
}

impl fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("encoder_id", &self.embedder.encoder_id())
            .field("dimensions", &self.embedder.dimensions())
            .field("profiles", &self.corpus.len())
            .finish()
    }
}
