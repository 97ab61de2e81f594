//! Embedding similarity: clamped cosine between dense representations,
//! plus the injected embedding-provider contract with a deterministic
//! hash-based implementation for callers without a model.

use crate::types::{CandidateProfile, RoleContext};

use super::{SimilarityMethod, SimilarityScore};

/// External embedding capability: text in, fixed-dimension vector out.
///
/// Vectors must be L2-normalized (or normalized by the caller) before
/// cosine similarity.
pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// FNV-1a hash embedder: fully deterministic, no model dependencies.
///
/// Each whitespace token hashes into a signed bucket; the accumulated
/// vector is L2-normalized. Useful as a stand-in provider for tests and
/// deployments without an embedding model.
pub struct HashEmbeddingProvider {
    dim: usize,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self { dim: 384 }
    }
}

impl HashEmbeddingProvider {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text.to_lowercase().split_whitespace() {
            let hash = fnv1a(token.as_bytes());
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

pub fn estimate(candidate: &CandidateProfile, role: &RoleContext) -> SimilarityScore {
    let (Some(left), Some(right)) = (&candidate.embedding, &role.embedding) else {
        return SimilarityScore::no_information(SimilarityMethod::Embedding);
    };

    let value = clamped_cosine(left, right);
    SimilarityScore {
        value,
        method: SimilarityMethod::Embedding,
        breakdown: std::collections::BTreeMap::new(),
        low_confidence: false,
    }
}

/// Cosine similarity clamped to [0,1]: dissimilar vectors score 0 rather
/// than rewarding anti-similarity.
#[must_use]
pub fn clamped_cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    f64::from(dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert!(clamped_cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
    }

    #[test]
    fn opposite_vectors_clamp_to_zero() {
        assert!(clamped_cosine(&[1.0, 0.0], &[-1.0, 0.0]).abs() < 1e-9);
    }

    #[test]
    fn identical_vectors_score_one() {
        assert!((clamped_cosine(&[0.6, 0.8], &[0.6, 0.8]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_dims_score_zero() {
        assert!(clamped_cosine(&[1.0], &[1.0, 0.0]).abs() < 1e-9);
    }

    #[test]
    fn missing_embedding_is_no_information() {
        let candidate = CandidateProfile::new("c");
        let role = RoleContext::new("r");
        let score = estimate(&candidate, &role);
        assert!(score.low_confidence);
    }

    #[test]
    fn hash_embedding_is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        let first = provider.embed("rust cuda ml");
        let second = provider.embed("rust cuda ml");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn hash_embedding_is_normalized() {
        let provider = HashEmbeddingProvider::new(64);
        let vector = provider.embed("rust cuda ml systems");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn similar_texts_embed_closer_than_dissimilar() {
        let provider = HashEmbeddingProvider::new(128);
        let a = provider.embed("rust cuda ml compilers");
        let b = provider.embed("rust cuda ml inference");
        let c = provider.embed("marketing sales outreach");
        assert!(clamped_cosine(&a, &b) > clamped_cosine(&a, &c));
    }
}
