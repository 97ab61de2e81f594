//! Exceptional-talent scoring: multi-source evidence into one calibrated
//! composite with strict multiplicative gating.
//!
//! "Exceptional" is deliberately rare: the gate and bar below are
//! calibrated for a pass rate around one in a thousand of a realistic
//! population, far below "above average".

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::ScoringConfig;
use crate::error::{Result, ScoutError};
use crate::signals::{normalize_linear, normalize_log};
use crate::similarity::SimilarityEstimator;
use crate::types::{CandidateProfile, RoleContext};

/// Relative weights of the four evidence sources in the composite.
const RESEARCH_WEIGHT: f64 = 0.3;
const CODE_WEIGHT: f64 = 0.3;
const SOCIAL_WEIGHT: f64 = 0.15;
const INTERVIEW_WEIGHT: f64 = 0.25;

/// A composite at or above this counts as exceptional.
pub const EXCEPTIONAL_BAR: f64 = 0.70;

/// Scores candidates from normalized multi-source evidence.
#[derive(Debug, Clone)]
pub struct ExceptionalScorer {
    config: ScoringConfig,
}

impl ExceptionalScorer {
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Composite score plus the per-signal breakdown.
    ///
    /// Missing signal data scores that signal 0, never a population mean;
    /// incomplete profiles must not be rewarded for their gaps.
    #[must_use]
    pub fn score(&self, candidate: &CandidateProfile) -> (f64, BTreeMap<String, f64>) {
        let breakdown = self.signal_breakdown(candidate);

        let weighted = RESEARCH_WEIGHT * breakdown["research"]
            + CODE_WEIGHT * breakdown["code"]
            + SOCIAL_WEIGHT * breakdown["social"]
            + INTERVIEW_WEIGHT * breakdown["interview"];

        let strong = breakdown
            .values()
            .filter(|value| **value >= self.config.strong_signal_bar)
            .count();

        let composite = if strong >= self.config.min_strong_signals {
            weighted
        } else {
            // Too few strong signals: the candidate may be solid, but not
            // exceptional. Push the composite toward zero multiplicatively.
            weighted * self.config.gate_penalty
        };

        (composite.clamp(0.0, 1.0), breakdown)
    }

    /// Position-specific variant: the composite is multiplied by the
    /// candidate's similarity to `role`, so a globally exceptional
    /// candidate still scores near zero for an unrelated role.
    #[must_use]
    pub fn score_for_role(
        &self,
        candidate: &CandidateProfile,
        role: &RoleContext,
        estimator: &SimilarityEstimator,
    ) -> (f64, BTreeMap<String, f64>) {
        let (global, mut breakdown) = self.score(candidate);
        let similarity = estimator.estimate(candidate, role);
        breakdown.insert("role_fit".to_string(), similarity.value);
        ((global * similarity.value).clamp(0.0, 1.0), breakdown)
    }

    /// Whether a composite clears the exceptional bar.
    #[must_use]
    pub fn is_exceptional(&self, composite: f64) -> bool {
        composite >= EXCEPTIONAL_BAR
    }

    /// Score a whole population in parallel. Cancellable between
    /// candidates; holds no role locks.
    pub fn score_population(
        &self,
        candidates: &[CandidateProfile],
        token: &CancellationToken,
    ) -> Result<Vec<(String, f64)>> {
        let scored: Result<Vec<(String, f64)>> = candidates
            .par_iter()
            .map(|candidate| {
                if token.is_cancelled() {
                    return Err(ScoutError::Cancelled);
                }
                Ok((candidate.id.clone(), self.score(candidate).0))
            })
            .collect();
        let scored = scored?;
        debug!(population = scored.len(), "batch scoring complete");
        Ok(scored)
    }

    fn signal_breakdown(&self, candidate: &CandidateProfile) -> BTreeMap<String, f64> {
        let evidence = &candidate.evidence;
        let mut breakdown = BTreeMap::new();

        breakdown.insert(
            "research".to_string(),
            normalize_linear(
                evidence.publication_count.map_or(0.0, f64::from),
                self.config.caps.publications,
            ),
        );
        // Star and follower counts are heavy-tailed: log mapping keeps a
        // single viral repository from dominating the composite.
        breakdown.insert(
            "code".to_string(),
            normalize_log(
                evidence.repo_stars.map_or(0.0, f64::from),
                self.config.caps.repo_stars,
            ),
        );
        breakdown.insert(
            "social".to_string(),
            normalize_log(
                evidence.follower_count.map_or(0.0, f64::from),
                self.config.caps.followers,
            ),
        );
        breakdown.insert(
            "interview".to_string(),
            evidence
                .interview
                .as_ref()
                .and_then(|signals| signals.technical_depth)
                .map_or(0.0, |depth| depth.clamp(0.0, 1.0)),
        );

        breakdown
    }
}
