//! Term-frequency vectors and cosine similarity.

use std::collections::HashMap;

/// Sparse token → count map. Every stored count is ≥ 1.
pub type TermFrequencyVector = HashMap<String, u32>;

/// Builds a term-frequency vector from a token sequence.
pub fn term_frequencies<S: AsRef<str>>(tokens: &[S]) -> TermFrequencyVector {
    let mut tf = TermFrequencyVector::new();
    for token in tokens {
        *tf.entry(token.as_ref().to_string()).or_insert(0) += 1;
    }
    tf
}

fn norm(v: &TermFrequencyVector) -> f64 {
    v.values()
        .map(|&c| (c as f64) * (c as f64))
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity in [0, 1]. Norms are floored at 1, so an empty vector scores 0.
pub fn cosine_similarity(a: &TermFrequencyVector, b: &TermFrequencyVector) -> f64 {
    // Iterate the smaller map; the dot product only sees shared keys.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(k, &x)| large.get(k).map(|&y| x as f64 * y as f64))
        .sum();

    let denom = norm(a).max(1.0) * norm(b).max(1.0);
    (dot / denom).clamp(0.0, 1.0)
}

/// Cosine similarity as a rounded 0–100 percentage.
pub fn similarity_percent(a: &TermFrequencyVector, b: &TermFrequencyVector) -> u32 {
    (cosine_similarity(a, b) * 100.0).round() as u32
}

/// Cosine similarity of two dense embeddings, in [-1, 1].
/// Returns `None` when the vectors are empty or of different dimension.
pub fn dense_cosine(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let na = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let na = if na == 0.0 { 1.0 } else { na };
    let nb = if nb == 0.0 { 1.0 } else { nb };
    Some((dot / (na * nb)).clamp(-1.0, 1.0))
}
