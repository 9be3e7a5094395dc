use std::path::PathBuf;

use ranking_engine::RankingConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENCODER_ID: &str = "hashing-v1";
pub const DEFAULT_DIMENSIONS: usize = 384;
pub const DEFAULT_RECORDS_PATH: &str = "data/profiles_metadata.json";
pub const DEFAULT_FEEDBACK_LOG_PATH: &str = "data/user_feedback.jsonl";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub embedding: Embedding,
    pub corpus: Corpus,
    pub feedback: Feedback,
    pub ranking: RankingConfig,
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Embedding {
    pub encoder_id: String,
    pub dimensions: usize,
}

impl Default for Embedding {
    fn default() -> Self {
        Self {
            encoder_id: DEFAULT_ENCODER_ID.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

/// Where profiles come from. A snapshot, when present on disk, wins over
/// re-embedding the records file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Corpus {
    pub records_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Corpus {
    fn default() -> Self {
        Self {
            records_path: Some(PathBuf::from(DEFAULT_RECORDS_PATH)),
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Feedback {
    pub log_path: PathBuf,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_FEEDBACK_LOG_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
