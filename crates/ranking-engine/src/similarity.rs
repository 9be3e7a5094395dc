use std::cmp::Ordering;

/// Cosine of the angle between `a` and `b`.
///
/// Vectors of different length, empty vectors and zero vectors score 0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// `max(base_threshold, scale * max_similarity)`.
#[must_use]
pub fn adaptive_threshold(base_threshold: f32, scale: f32, max_similarity: f32) -> f32 {
    base_threshold.max(scale * max_similarity)
}

/// Ordering that puts higher scores first and NaN last.
#[must_use]
pub fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
