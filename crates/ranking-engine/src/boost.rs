use std::collections::HashMap;

use storage_corpus::{Profile, ProfileId};
use storage_feedback::FeedbackEntry;

use crate::similarity::cosine_similarity;

/// Per-profile counts of confirmations on near-duplicate past queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackBoosts {
    by_id: HashMap<ProfileId, u32>,
    by_name: HashMap<String, u32>,
    matched_entries: usize,
}

impl FeedbackBoosts {
    /// Count selections from every entry whose stored query embedding is
    /// strictly more similar than `cutoff` to `query_embedding`.
    ///
    /// Snapshots carrying a profile id count towards that id. Snapshots
    /// without one count towards their non-empty `name` when
    /// `legacy_name_matching` is set, and are ignored otherwise.
    #[must_use]
    pub fn collect(
        entries: &[FeedbackEntry],
        query_embedding: &[f32],
        cutoff: f32,
        legacy_name_matching: bool,
    ) -> Self {
        let mut boosts = Self::default();
        for entry in entries {
            let similarity = cosine_similarity(query_embedding, &entry.query_embedding);
            if similarity.is_nan() || similarity <= cutoff {
                continue;
            }
            boosts.matched_entries += 1;
            tracing::trace!(query = %entry.query, similarity, "feedback entry matched");
            for selected in &entry.selected_profiles {
                if let Some(id) = &selected.profile_id {
                    *boosts.by_id.entry(id.clone()).or_insert(0) += 1;
                } else if legacy_name_matching {
                    let name = selected.attributes.get(storage_corpus::NAME_KEY);
                    if !name.is_empty() {
                        *boosts.by_name.entry(name.to_string()).or_insert(0) += 1;
                    }
                }
            }
        }
        boosts
    }

    #[must_use]
    pub fn boost_for(&self, profile: &Profile) -> u32 {
        let by_id = self.by_id.get(&profile.id).copied().unwrap_or(0);
        let by_name = if self.by_name.is_empty() || profile.name().is_empty() {
            0
        } else {
            self.by_name.get(profile.name()).copied().unwrap_or(0)
        };
        by_id + by_name
    }

    /// Number of feedback entries that passed the similarity cutoff.
    #[must_use]
    pub const fn matched_entries(&self) -> usize {
        self.matched_entries
    }
}
