//! TOML configuration for the profile search runtime.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
    Config, Corpus, Embedding, Feedback, Logging, DEFAULT_DIMENSIONS, DEFAULT_ENCODER_ID,
    DEFAULT_FEEDBACK_LOG_PATH, DEFAULT_LOG_LEVEL, DEFAULT_RECORDS_PATH,
};

use std::fs;
use std::path::{Path, PathBuf};

/// Read, parse, normalize and validate the config at `path`.
pub fn load(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw).map_err(|err| match err {
        Error::ParseConfig { source, .. } => Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Same pipeline as [`load`] for an in-memory document.
pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg: Config = toml::from_str(raw).map_err(|source| Error::ParseConfig {
        path: PathBuf::new(),
        source,
    })?;
    normalize(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
    cfg.embedding.encoder_id = cfg.embedding.encoder_id.trim().to_string();
    cfg.logging.level = cfg.logging.level.trim().to_string();
    if cfg.logging.level.is_empty() {
        cfg.logging.level = DEFAULT_LOG_LEVEL.to_string();
    }
    cfg.corpus.records_path = normalize_optional(cfg.corpus.records_path.take());
    cfg.corpus.snapshot_path = normalize_optional(cfg.corpus.snapshot_path.take());
    cfg.feedback.log_path = trim_path(&cfg.feedback.log_path);
}

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.embedding.encoder_id.is_empty() {
        return Err(Error::validation("embedding.encoder_id must be non-empty."));
    }
    if cfg.embedding.dimensions == 0 {
        return Err(Error::validation(
            "embedding.dimensions must be greater than zero.",
        ));
    }
    if cfg.feedback.log_path.as_os_str().is_empty() {
        return Err(Error::validation("feedback.log_path must be non-empty."));
    }

    let ranking = &cfg.ranking;
    if ranking.top_n == 0 {
        return Err(Error::validation("ranking.top_n must be greater than zero."));
    }
    if !(-1.0..=1.0).contains(&ranking.base_threshold) {
        return Err(Error::validation(
            "ranking.base_threshold must be between -1 and 1.",
        ));
    }
    if !(0.0..=1.0).contains(&ranking.threshold_scale) {
        return Err(Error::validation(
            "ranking.threshold_scale must be between 0 and 1.",
        ));
    }
    if !(0.0..=1.0).contains(&ranking.feedback_similarity_cutoff) {
        return Err(Error::validation(
            "ranking.feedback_similarity_cutoff must be between 0 and 1.",
        ));
    }
    if ranking.about_preview_chars == 0 {
        return Err(Error::validation(
            "ranking.about_preview_chars must be greater than zero.",
        ));
    }
    Ok(())
}

fn trim_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().trim())
}

fn normalize_optional(path: Option<PathBuf>) -> Option<PathBuf> {
    path.map(|path| trim_path(&path))
        .filter(|path| !path.as_os_str().is_empty())
}
