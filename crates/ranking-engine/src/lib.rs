//! Ranking engine: similarity scoring with an adaptive threshold, feedback
//! re-ranking and per-result explanations.

pub mod boost;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod explain;
pub mod similarity;

pub use boost::FeedbackBoosts;
pub use config::RankingConfig;
pub use context::SearchContext;
pub use engine::{rank_embedded, RankedResult, RankingEngine, RankingReport};
pub use error::RankingError;
pub use explain::{explain, Explainer, FALLBACK_EXPLANATION};
pub use similarity::{adaptive_threshold, cosine_similarity};
