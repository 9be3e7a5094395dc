use ingestion_embedding::EmbeddingError;
use storage_feedback::FeedbackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("feedback was not persisted: {0}")]
    Feedback(#[from] FeedbackError),
    #[error("corpus was built with {corpus}, embedder is {embedder}")]
    EncoderMismatch { corpus: String, embedder: String },
}
