//! Screening decision engine: five ordered, short-circuiting gates that
//! emit an auditable pass/fail `Decision`.
//!
//! Threshold failures are normal outcomes, not errors; a screening call
//! always produces a fully populated reasoning list, one entry per stage,
//! even when an early stage exits the pipeline.

pub mod gates;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::ScreeningConfig;
use crate::similarity::SimilarityScore;
use crate::types::{CandidateProfile, Decision, RoleContext};

/// Posterior mean used when the role's policy has no arm for the candidate.
const NEUTRAL_POSTERIOR: f64 = 0.5;

/// Runs the five-stage gate over one candidate/role pair.
#[derive(Debug, Clone)]
pub struct ScreeningEngine {
    config: ScreeningConfig,
}

impl ScreeningEngine {
    #[must_use]
    pub fn new(config: ScreeningConfig) -> Self {
        Self { config }
    }

    /// Evaluate `candidate` against `role`.
    ///
    /// `bandit_mean` is the candidate's current posterior mean from the
    /// role's selection policy, when the candidate is one of its arms.
    #[must_use]
    pub fn screen(
        &self,
        candidate: &CandidateProfile,
        role: &RoleContext,
        similarity: &SimilarityScore,
        bandit_mean: Option<f64>,
    ) -> Decision {
        let mut reasoning = Vec::with_capacity(5);

        // Stage 1: hard must-haves.
        let missing: Vec<&String> = role
            .must_haves
            .iter()
            .filter(|tag| !candidate.tags.contains(*tag))
            .collect();
        if missing.is_empty() {
            reasoning.push(format!(
                "must-haves: all {} hard requirements present",
                role.must_haves.len()
            ));
        } else {
            let listed = missing
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            reasoning.push(format!("must-haves: missing {listed}"));
            reasoning.push("similarity: not evaluated (failed must-have check)".to_string());
            reasoning.push("consistency: not evaluated (failed must-have check)".to_string());
            reasoning.push("evidence: not evaluated (failed must-have check)".to_string());
            reasoning.push("fusion: not evaluated (failed must-have check)".to_string());
            return make_decision(candidate, role, false, 0.0, reasoning);
        }

        // Stage 2: similarity floor. A low-confidence score means "no
        // information", which cannot clear the floor either.
        if similarity.low_confidence {
            reasoning.push(format!(
                "similarity: no usable attributes (floor {:.2})",
                self.config.similarity_floor
            ));
        } else {
            reasoning.push(format!(
                "similarity: {:.2} against floor {:.2}",
                similarity.value, self.config.similarity_floor
            ));
        }
        if similarity.low_confidence || similarity.value < self.config.similarity_floor {
            reasoning.push("consistency: not evaluated (below similarity floor)".to_string());
            reasoning.push("evidence: not evaluated (below similarity floor)".to_string());
            reasoning.push("fusion: not evaluated (below similarity floor)".to_string());
            return make_decision(candidate, role, false, similarity.value, reasoning);
        }

        // Stage 3: outlier detection over internal consistency.
        let consistency = gates::detect_outliers(candidate);
        if consistency.flags.is_empty() {
            reasoning.push(format!("consistency: {:.2}, no flags", consistency.score));
        } else {
            reasoning.push(format!(
                "consistency: {:.2} after {} flag(s): {}",
                consistency.score,
                consistency.flags.len(),
                consistency.flags.join("; ")
            ));
        }

        // Stage 4: evidence validation against the declarative field table.
        let evidence = gates::validate_evidence(candidate, &self.config.evidence_bars);
        if evidence.failures.is_empty() {
            reasoning.push(format!("evidence: {:.2}, all checks passed", evidence.score));
        } else {
            reasoning.push(format!(
                "evidence: {:.2}, failed: {}",
                evidence.score,
                evidence.failures.join("; ")
            ));
        }

        // Stage 5: fuse with the bandit posterior.
        let posterior = bandit_mean.unwrap_or(NEUTRAL_POSTERIOR);
        let weights = &self.config.fusion_weights;
        let total =
            weights.similarity + weights.consistency + weights.evidence + weights.bandit;
        let fused = if total > 0.0 {
            (weights.similarity * similarity.value
                + weights.consistency * consistency.score
                + weights.evidence * evidence.score
                + weights.bandit * posterior)
                / total
        } else {
            0.0
        };
        let outcome = fused >= self.config.pass_threshold;
        reasoning.push(format!(
            "fusion: {fused:.2} (posterior {posterior:.2}) against threshold {:.2}",
            self.config.pass_threshold
        ));

        make_decision(candidate, role, outcome, fused, reasoning)
    }
}

fn make_decision(
    candidate: &CandidateProfile,
    role: &RoleContext,
    outcome: bool,
    confidence: f64,
    reasoning: Vec<String>,
) -> Decision {
    debug_assert_eq!(reasoning.len(), 5);
    debug!(
        candidate = %candidate.id,
        role = %role.id,
        outcome,
        confidence,
        "screening decision"
    );
    Decision {
        id: Uuid::new_v4().to_string(),
        candidate_id: candidate.id.clone(),
        role_id: role.id.clone(),
        outcome,
        confidence: confidence.clamp(0.0, 1.0),
        reasoning,
        timestamp: Utc::now(),
    }
}
