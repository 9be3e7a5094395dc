use std::path::PathBuf;

use ingestion_embedding::EmbeddingError;
use thiserror::Error;

use crate::ProfileId;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialise corpus: {0}")]
    Serialize(serde_json::Error),
    #[error("embedding {index} has {actual} dimensions, corpus expects {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("profile id {0} appears more than once")]
    DuplicateId(ProfileId),
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
