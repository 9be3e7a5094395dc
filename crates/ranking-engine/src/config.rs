use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_BASE_THRESHOLD: f32 = 0.4;
pub const DEFAULT_THRESHOLD_SCALE: f32 = 0.6;
pub const DEFAULT_FEEDBACK_SIMILARITY_CUTOFF: f32 = 0.85;
pub const DEFAULT_ABOUT_PREVIEW_CHARS: usize = 100;

/// Tunables for a ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Minimum number of results the caller wants back.
    pub top_n: usize,
    /// Relevance floor for the adaptive threshold.
    pub base_threshold: f32,
    /// Fraction of the best similarity the adaptive threshold never drops below.
    pub threshold_scale: f32,
    /// Past queries must be strictly more similar than this to contribute boosts.
    pub feedback_similarity_cutoff: f32,
    /// Characters of `about` quoted in explanations.
    pub about_preview_chars: usize,
    /// Let feedback snapshots without a profile id boost by `name`.
    pub legacy_name_matching: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            base_threshold: DEFAULT_BASE_THRESHOLD,
            threshold_scale: DEFAULT_THRESHOLD_SCALE,
            feedback_similarity_cutoff: DEFAULT_FEEDBACK_SIMILARITY_CUTOFF,
            about_preview_chars: DEFAULT_ABOUT_PREVIEW_CHARS,
            legacy_name_matching: true,
        }
    }
}
