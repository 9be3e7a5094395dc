//! Embedding provider contract and the bundled deterministic hashing encoder.

use std::sync::OnceLock;

use blake3::Hasher;
use regex::Regex;
use thiserror::Error;

/// Attribute order used when composing the text embedded for a profile.
pub const PROFILE_TEXT_FIELDS: [&str; 7] = [
    "headline", "about", "field", "company", "position", "gender", "tags",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub encoder_id: String,
    pub dimensions: usize,
}

impl EmbeddingConfig {
    #[must_use]
    pub const fn new(encoder_id: String, dimensions: usize) -> Self {
        Self {
            encoder_id,
            dimensions,
        }
    }
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding dimensions must be non-zero")]
    InvalidDimensions,
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding provider failure: {0}")]
    Provider(String),
}

/// Maps text to fixed-length vectors.
///
/// Implementations must be deterministic for a fixed `encoder_id`: the corpus,
/// incoming queries and stored feedback queries are all compared in the same
/// vector space.
pub trait Embedder: Send + Sync {
    /// Identifier of the model/version producing the vectors.
    fn encoder_id(&self) -> &str;
    /// Length of every vector returned by [`Embedder::embed`].
    fn dimensions(&self) -> usize;
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
    /// Embed several texts, preserving input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Feature-hashing encoder: unigrams and adjacent bigrams are hashed into
/// signed buckets and the result is L2-normalised.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    config: EmbeddingConfig,
}

impl HashingEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        if config.dimensions == 0 {
            return Err(EmbeddingError::InvalidDimensions);
        }
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let mut hasher = Hasher::new();
        hasher.update(self.config.encoder_id.as_bytes());
        hasher.update(&[0u8]);
        hasher.update(feature.as_bytes());
        let hash = hasher.finalize();
        let bytes = hash.as_bytes();
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        let raw = u64::from_le_bytes(word);
        let index = (raw % self.config.dimensions as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Embedder for HashingEmbedder {
    fn encoder_id(&self) -> &str {
        &self.config.encoder_id
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let tokens = tokenize(text);
        let mut vector = vec![0.0f32; self.config.dimensions];
        for token in &tokens {
            let (index, sign) = self.bucket(token);
            vector[index] += sign;
        }
        for pair in tokens.windows(2) {
            let (index, sign) = self.bucket(&format!("{} {}", pair[0], pair[1]));
            vector[index] += 0.5 * sign;
        }
        normalize(&mut vector);
        Ok(vector)
    }
}

/// Lowercased runs of letters and digits.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let regex = TOKEN.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").expect("static token pattern"));
    regex
        .find_iter(text)
        .map(|mat| mat.as_str().to_lowercase())
        .collect()
}

/// Scale `vector` to unit length; the zero vector is left untouched.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Text embedded for a profile: the descriptive attributes joined by spaces.
///
/// `lookup` returns the attribute value, absent keys being empty.
pub fn profile_text<'a, F>(lookup: F) -> String
where
    F: Fn(&str) -> &'a str,
{
    PROFILE_TEXT_FIELDS
        .iter()
        .map(|field| lookup(field))
        .collect::<Vec<_>>()
        .join(" ")
}
