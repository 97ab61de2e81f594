//! Per-role selection policy: Thompson Sampling with a warm start and a
//! bounded optimism bonus.

use rand::Rng;
use rand::rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BanditConfig;
use crate::error::{Result, ScoutError};
use crate::similarity::SimilarityEstimator;
use crate::types::{CandidateProfile, RoleContext};

use super::prior::to_prior;
use super::state::BanditState;

/// Lifecycle of a role's policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyPhase {
    Uninitialized,
    Ready,
    Closed,
}

/// Snapshot of learning quality, returned from every accepted feedback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningMetrics {
    pub role_id: String,
    pub observations: u64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub mean_regret: f64,
    /// Posterior mean per arm, parallel to the arm list.
    pub arm_means: Vec<f64>,
    pub version: u64,
}

/// One role's adaptive selection policy.
///
/// `select()` and `update()` are pure, fast, synchronous computations; the
/// caller owns locking (one mutex per role) and persistence.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    config: BanditConfig,
    phase: PolicyPhase,
    state: BanditState,
}

impl RolePolicy {
    /// A fresh, uninitialized policy for `role_id`.
    #[must_use]
    pub fn new(role_id: impl Into<String>, config: BanditConfig) -> Self {
        Self {
            config,
            phase: PolicyPhase::Uninitialized,
            state: BanditState::new(role_id),
        }
    }

    /// Resume a policy from persisted state, preserving arm order exactly.
    pub fn resume(state: BanditState, config: BanditConfig) -> Result<Self> {
        state.validate()?;
        Ok(Self {
            config,
            phase: PolicyPhase::Ready,
            state,
        })
    }

    #[must_use]
    pub fn phase(&self) -> PolicyPhase {
        self.phase
    }

    #[must_use]
    pub fn role_id(&self) -> &str {
        &self.state.role_id
    }

    #[must_use]
    pub fn state(&self) -> &BanditState {
        &self.state
    }

    /// Warm-start the policy: one arm per candidate, each with a Beta prior
    /// mapped from its similarity to the role. Arm index `i` is permanently
    /// bound to `candidates[i]`'s ID.
    pub fn initialize(
        &mut self,
        candidates: &[CandidateProfile],
        role: &RoleContext,
        estimator: &SimilarityEstimator,
    ) -> Result<()> {
        if self.phase != PolicyPhase::Uninitialized {
            return Err(ScoutError::InvalidState(format!(
                "policy for role {} is already {:?}",
                self.state.role_id, self.phase
            )));
        }
        if candidates.is_empty() {
            return Err(ScoutError::InvalidState(format!(
                "cannot initialize role {} with zero candidates",
                self.state.role_id
            )));
        }

        for candidate in candidates {
            let similarity = estimator.estimate(candidate, role);
            // A low-confidence score carries no information: fall back to
            // the uniform prior instead of a confident pessimistic one.
            let (alpha, beta) = if similarity.low_confidence {
                (1.0, 1.0)
            } else {
                to_prior(similarity.value, self.config.prior_strength)
            };
            self.state.arms.push(candidate.id.clone());
            self.state.alpha.push(alpha);
            self.state.beta.push(beta);
        }

        self.phase = PolicyPhase::Ready;
        debug!(
            role = %self.state.role_id,
            arms = self.state.len(),
            "policy initialized"
        );
        Ok(())
    }

    /// Draw one Thompson sample per arm, add the bounded optimism bonus,
    /// and return the arm with the highest adjusted sample. Ties break to
    /// the lowest index.
    pub fn select(&self) -> Result<usize> {
        self.require_ready("select")?;

        let mut rng = rng();
        let mut best_arm = 0;
        let mut best_value = f64::NEG_INFINITY;

        for arm in 0..self.state.len() {
            let sample = sample_beta(self.state.alpha[arm], self.state.beta[arm], &mut rng);
            let mean = self.state.posterior_mean(arm);
            let bonus = self.config.optimism_lambda * mean.min(self.config.optimism_cap);
            let adjusted = sample + bonus;
            if adjusted > best_value {
                best_value = adjusted;
                best_arm = arm;
            }
        }

        Ok(best_arm)
    }

    /// Apply one feedback observation to `arm`.
    ///
    /// `reward > 0` counts as a success (alpha increment), otherwise a
    /// failure (beta increment). When `is_qualified` is known, the
    /// confusion counters and rolling metrics are updated as well.
    pub fn update(&mut self, arm: usize, reward: f64, is_qualified: Option<bool>) -> Result<()> {
        self.require_ready("update")?;
        if arm >= self.state.len() {
            return Err(ScoutError::UnknownArm(format!(
                "arm index {arm} out of range for role {} with {} arms",
                self.state.role_id,
                self.state.len()
            )));
        }

        // Regret is measured against the best estimate before this
        // observation shifts it.
        let best_estimate = self.state.best_posterior_mean();

        if reward > 0.0 {
            self.state.alpha[arm] += 1.0;
        } else {
            self.state.beta[arm] += 1.0;
        }

        if let Some(qualified) = is_qualified {
            let selected = reward > 0.0;
            match (selected, qualified) {
                (true, true) => self.state.true_positives += 1,
                (true, false) => self.state.false_positives += 1,
                (false, false) => self.state.true_negatives += 1,
                (false, true) => self.state.false_negatives += 1,
            }
            let regret = (best_estimate - reward).max(0.0);
            self.state.push_sample(regret, self.config.metrics_window);
        }

        self.state.version += 1;
        self.state.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Normal-approximation confidence interval `(lower, upper, mean)` for
    /// an arm's posterior mean. The interval widens as `alpha + beta`
    /// shrinks and narrows as evidence accumulates.
    pub fn confidence_interval(&self, arm: usize, level: f64) -> Result<(f64, f64, f64)> {
        if self.phase == PolicyPhase::Uninitialized {
            return Err(ScoutError::InvalidState(format!(
                "confidence_interval on uninitialized role {}",
                self.state.role_id
            )));
        }
        if arm >= self.state.len() {
            return Err(ScoutError::UnknownArm(format!(
                "arm index {arm} out of range for role {} with {} arms",
                self.state.role_id,
                self.state.len()
            )));
        }

        let alpha = self.state.alpha[arm];
        let beta = self.state.beta[arm];
        let n = alpha + beta;
        let mean = alpha / n;
        let variance = (alpha * beta) / (n * n * (n + 1.0));
        let half_width = z_score(level) * variance.sqrt();

        Ok(((mean - half_width).max(0.0), (mean + half_width).min(1.0), mean))
    }

    /// Close the policy; all further select/update calls fail.
    pub fn close(&mut self) {
        self.phase = PolicyPhase::Closed;
        debug!(role = %self.state.role_id, "policy closed");
    }

    /// Current learning metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> LearningMetrics {
        let observations = self.state.true_positives
            + self.state.false_positives
            + self.state.true_negatives
            + self.state.false_negatives;
        LearningMetrics {
            role_id: self.state.role_id.clone(),
            observations,
            precision: self.state.precision(),
            recall: self.state.recall(),
            f1: self.state.f1(),
            mean_regret: self.state.mean_regret(),
            arm_means: (0..self.state.len())
                .map(|arm| self.state.posterior_mean(arm))
                .collect(),
            version: self.state.version,
        }
    }

    fn require_ready(&self, operation: &str) -> Result<()> {
        match self.phase {
            PolicyPhase::Ready => Ok(()),
            PolicyPhase::Uninitialized => Err(ScoutError::InvalidState(format!(
                "{operation} on uninitialized role {}",
                self.state.role_id
            ))),
            PolicyPhase::Closed => Err(ScoutError::InvalidState(format!(
                "{operation} on closed role {}",
                self.state.role_id
            ))),
        }
    }
}

/// Draw from `Beta(alpha, beta)`.
///
/// Shape parameters are kept >= 1 by construction, so the distribution is
/// always valid; if it ever is not, degrade to the mean rather than panic.
fn sample_beta<R: Rng>(alpha: f64, beta: f64, rng: &mut R) -> f64 {
    match Beta::new(alpha, beta) {
        Ok(distribution) => distribution.sample(rng),
        Err(err) => {
            warn!(alpha, beta, %err, "invalid beta shape, using posterior mean");
            alpha / (alpha + beta)
        }
    }
}

/// Two-sided z critical value for the requested confidence level.
fn z_score(level: f64) -> f64 {
    if level >= 0.99 {
        2.576
    } else if level >= 0.95 {
        1.96
    } else if level >= 0.90 {
        1.645
    } else {
        1.282
    }
}
