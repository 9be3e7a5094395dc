//! Human-readable reasons attached to ranked profiles.

use storage_corpus::Profile;

use crate::config::DEFAULT_ABOUT_PREVIEW_CHARS;

pub const FALLBACK_EXPLANATION: &str = "Relevant based on profile analysis";
const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Explainer {
    about_preview_chars: usize,
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(DEFAULT_ABOUT_PREVIEW_CHARS)
    }
}

impl Explainer {
    #[must_use]
    pub const fn new(about_preview_chars: usize) -> Self {
        Self {
            about_preview_chars,
        }
    }

    /// Position, company, an `about` preview and field, in that order, for
    /// whichever are present. The query does not influence the text.
    #[must_use]
    pub fn explain(&self, profile: &Profile, _query: &str) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(position) = present(profile, "position") {
            parts.push(format!("Works as {position}"));
        }
        if let Some(company) = present(profile, "company") {
            parts.push(format!("at {company}"));
        }
        if let Some(about) = present(profile, "about") {
            let preview: String = about.chars().take(self.about_preview_chars).collect();
            parts.push(format!("Profile mentions: {preview}..."));
        }
        if let Some(field) = present(profile, "field") {
            parts.push(format!("Field: {field}"));
        }
        if parts.is_empty() {
            FALLBACK_EXPLANATION.to_string()
        } else {
            parts.join(SEPARATOR)
        }
    }
}

/// Values are used as stored; only the empty string counts as absent.
fn present<'a>(profile: &'a Profile, key: &str) -> Option<&'a str> {
    let value = profile.get(key);
    (!value.is_empty()).then_some(value)
}

/// [`Explainer::explain`] with the default preview length.
#[must_use]
pub fn explain(profile: &Profile, query: &str) -> String {
    Explainer::default().explain(profile, query)
}
