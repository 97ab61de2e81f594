//! Candidate-to-role affinity estimation.
//!
//! Two interchangeable modes produce a bounded [0,1] `SimilarityScore`:
//! a structural k-nearest-neighbor overlap over attribute categories, and
//! cosine similarity of dense embeddings. The mode is fixed by
//! configuration; call sites never branch on it.

pub mod embedding;
pub mod structural;

pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{SimilarityConfig, SimilarityMethod};
use crate::types::{CandidateProfile, RoleContext};

/// A bounded affinity score plus how it was produced. Ephemeral: recomputed
/// per query, never persisted independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Affinity in [0,1].
    pub value: f64,
    pub method: SimilarityMethod,
    /// Per-category contribution (skills, experience, education). Empty for
    /// the embedding mode.
    pub breakdown: BTreeMap<String, f64>,
    /// Set when neither side had usable attributes; downstream must treat
    /// the score as "no information", not as a confident zero.
    pub low_confidence: bool,
}

impl SimilarityScore {
    #[must_use]
    pub fn no_information(method: SimilarityMethod) -> Self {
        Self {
            value: 0.0,
            method,
            breakdown: BTreeMap::new(),
            low_confidence: true,
        }
    }
}

/// Estimates candidate-to-role similarity, caching results per
/// (candidate, role) pair within the process.
pub struct SimilarityEstimator {
    config: SimilarityConfig,
    cache: Mutex<LruCache<(String, String), SimilarityScore>>,
}

impl SimilarityEstimator {
    #[must_use]
    pub fn new(config: SimilarityConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn method(&self) -> SimilarityMethod {
        self.config.method
    }

    /// Estimate the affinity between `candidate` and `role`.
    ///
    /// Never fails: a pair with zero usable attributes yields a
    /// `low_confidence` zero score.
    pub fn estimate(&self, candidate: &CandidateProfile, role: &RoleContext) -> SimilarityScore {
        let key = (candidate.id.clone(), role.id.clone());
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.clone();
        }

        let score = match self.config.method {
            SimilarityMethod::Structural => structural::estimate(&self.config, candidate, role),
            SimilarityMethod::Embedding => embedding::estimate(candidate, role),
        };

        debug_assert!((0.0..=1.0).contains(&score.value));
        self.cache.lock().put(key, score.clone());
        score
    }

    /// Drop cached scores, e.g. after profile edits.
    pub fn invalidate(&self) {
        self.cache.lock().clear();
    }
}
