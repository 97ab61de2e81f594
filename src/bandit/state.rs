//! Persisted per-role bandit state.
//!
//! Serialized verbatim with serde; a reload must reproduce the exact arm
//! ordering so that index `i` always resolves to the same candidate ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// All learnable state for one role's selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditState {
    pub role_id: String,
    /// Candidate IDs; index-stable for the lifetime of the role.
    pub arms: Vec<String>,
    /// Beta shape parameters, parallel to `arms`, always >= 1.
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    /// Cumulative confusion counts from qualified-flagged feedback.
    #[serde(default)]
    pub true_positives: u64,
    #[serde(default)]
    pub false_positives: u64,
    #[serde(default)]
    pub true_negatives: u64,
    #[serde(default)]
    pub false_negatives: u64,
    /// Rolling window of learning metric samples.
    #[serde(default)]
    pub history: Vec<MetricSample>,
    /// Monotonically increasing; bumped on every accepted update.
    #[serde(default)]
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// One learning metrics observation, appended per qualified-flagged update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub regret: f64,
    pub timestamp: DateTime<Utc>,
}

impl BanditState {
    #[must_use]
    pub fn new(role_id: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
            arms: Vec::new(),
            alpha: Vec::new(),
            beta: Vec::new(),
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
            history: Vec::new(),
            version: 0,
            updated_at: Utc::now(),
        }
    }

    /// Number of arms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Posterior mean `alpha / (alpha + beta)` for one arm.
    #[must_use]
    pub fn posterior_mean(&self, arm: usize) -> f64 {
        self.alpha[arm] / (self.alpha[arm] + self.beta[arm])
    }

    /// Highest posterior mean across all arms; 0 for an empty state.
    #[must_use]
    pub fn best_posterior_mean(&self) -> f64 {
        (0..self.len())
            .map(|i| self.posterior_mean(i))
            .fold(0.0, f64::max)
    }

    /// Resolve a candidate ID to its stable arm index.
    #[must_use]
    pub fn arm_index_of(&self, candidate_id: &str) -> Option<usize> {
        self.arms.iter().position(|id| id == candidate_id)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    /// Mean regret over the rolling history window.
    #[must_use]
    pub fn mean_regret(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.history.len() as f64;
        self.history.iter().map(|sample| sample.regret).sum::<f64>() / n
    }

    /// Append a metrics sample, trimming the window to `window` entries.
    pub fn push_sample(&mut self, regret: f64, window: usize) {
        self.history.push(MetricSample {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            regret,
            timestamp: Utc::now(),
        });
        if window > 0 && self.history.len() > window {
            let excess = self.history.len() - window;
            self.history.drain(..excess);
        }
    }

    /// Check the structural invariants a freshly deserialized state must hold.
    pub fn validate(&self) -> Result<()> {
        if self.alpha.len() != self.arms.len() || self.beta.len() != self.arms.len() {
            return Err(ScoutError::PersistenceConflict(format!(
                "state for role {} has mismatched arm arrays: {} arms, {} alpha, {} beta",
                self.role_id,
                self.arms.len(),
                self.alpha.len(),
                self.beta.len()
            )));
        }
        for (i, (a, b)) in self.alpha.iter().zip(&self.beta).enumerate() {
            if !a.is_finite() || !b.is_finite() || *a < 1.0 || *b < 1.0 {
                return Err(ScoutError::PersistenceConflict(format!(
                    "state for role {} has invalid shape parameters at arm {i}: ({a}, {b})",
                    self.role_id
                )));
            }
        }
        Ok(())
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let value = numerator as f64 / denominator as f64;
        value
    }
}
