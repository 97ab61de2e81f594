//! Individual screening gates: outlier detection and evidence-consistency
//! validation.
//!
//! Evidence validation is driven by a declarative per-field table stating
//! how absence is treated, so the policy is auditable and testable in
//! isolation instead of being buried in conditionals.

use crate::config::EvidenceBars;
use crate::types::{CandidateProfile, InterviewSignals};

/// How a validation treats a missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Absence counts as a failed check.
    Fail,
    /// Absence counts as a passed check.
    Pass,
    /// Absence excludes the field from the check entirely.
    Neutral,
}

/// One row of the evidence validation table.
#[derive(Debug, Clone, Copy)]
pub struct FieldCheck {
    pub field: &'static str,
    pub missing: MissingPolicy,
}

/// The conversational signals stage 4 validates, and what absence of each
/// one means. Interview scores are required; availability is informative
/// but optional.
pub const EVIDENCE_TABLE: [FieldCheck; 4] = [
    FieldCheck {
        field: "motivation",
        missing: MissingPolicy::Fail,
    },
    FieldCheck {
        field: "communication",
        missing: MissingPolicy::Fail,
    },
    FieldCheck {
        field: "technical_depth",
        missing: MissingPolicy::Fail,
    },
    FieldCheck {
        field: "availability",
        missing: MissingPolicy::Neutral,
    },
];

/// Penalty per consistency flag in stage 3.
const FLAG_PENALTY: f64 = 0.25;

/// Seniority claims below this tag count look unsupported.
const MIN_TAGS_FOR_SENIORITY: usize = 3;
const SENIOR_YEARS: f64 = 10.0;

const NEGATIVE_MARKERS: [&str; 4] = ["not ", "no ", "never", "beginner"];
const POSITIVE_MARKERS: [&str; 4] = ["expert", "deep", "extensive", "led"];

/// Outcome of the outlier-detection stage.
#[derive(Debug, Clone)]
pub struct ConsistencyReport {
    /// 1.0 minus a fixed penalty per flag, floored at 0.
    pub score: f64,
    pub flags: Vec<String>,
}

/// Flag internally inconsistent evidence. Each flag reduces the running
/// consistency score; none of them fails the candidate outright.
#[must_use]
pub fn detect_outliers(candidate: &CandidateProfile) -> ConsistencyReport {
    let mut flags = Vec::new();

    if candidate.years_experience.is_some_and(|years| years >= SENIOR_YEARS)
        && candidate.tags.len() < MIN_TAGS_FOR_SENIORITY
    {
        flags.push(format!(
            "claimed {:.0}+ years of experience with only {} listed skills",
            SENIOR_YEARS,
            candidate.tags.len()
        ));
    }

    let has_any_evidence = candidate.evidence.publication_count.unwrap_or(0) > 0
        || candidate.evidence.repo_stars.unwrap_or(0) > 0
        || candidate.evidence.follower_count.unwrap_or(0) > 0;

    if let Some(interview) = &candidate.evidence.interview {
        for claim in &interview.claims {
            let lowered = claim.to_lowercase();
            let supported = candidate
                .tags
                .iter()
                .any(|tag| lowered.contains(tag.as_str()));
            if !supported && !has_any_evidence {
                flags.push(format!("claim \"{claim}\" unsupported by any evidence source"));
            }
        }

        flags.extend(contradiction_flags(interview));
    }

    #[allow(clippy::cast_precision_loss)]
    let score = (1.0 - flags.len() as f64 * FLAG_PENALTY).max(0.0);
    ConsistencyReport { score, flags }
}

/// Pairs of claims about the same topic where one carries a positive and
/// the other a negative marker.
fn contradiction_flags(interview: &InterviewSignals) -> Vec<String> {
    let mut flags = Vec::new();
    let claims: Vec<String> = interview.claims.iter().map(|c| c.to_lowercase()).collect();

    for (i, left) in claims.iter().enumerate() {
        for right in claims.iter().skip(i + 1) {
            if !shares_topic(left, right) {
                continue;
            }
            let left_negative = NEGATIVE_MARKERS.iter().any(|m| left.contains(m));
            let right_negative = NEGATIVE_MARKERS.iter().any(|m| right.contains(m));
            let left_positive = POSITIVE_MARKERS.iter().any(|m| left.contains(m));
            let right_positive = POSITIVE_MARKERS.iter().any(|m| right.contains(m));
            if (left_negative && right_positive) || (left_positive && right_negative) {
                flags.push(format!(
                    "contradictory statements: \"{left}\" vs \"{right}\""
                ));
            }
        }
    }
    flags
}

fn shares_topic(left: &str, right: &str) -> bool {
    left.split_whitespace()
        .filter(|token| token.len() > 3)
        .any(|token| right.contains(token))
}

/// Outcome of the evidence-consistency stage.
#[derive(Debug, Clone)]
pub struct EvidenceReport {
    /// Fraction of applicable checks that passed.
    pub score: f64,
    pub failures: Vec<String>,
}

/// Validate extracted conversational signals against the minimum bars,
/// applying the declarative missing-field policy per table row.
#[must_use]
pub fn validate_evidence(candidate: &CandidateProfile, bars: &EvidenceBars) -> EvidenceReport {
    let interview = candidate.evidence.interview.as_ref();
    let mut passed = 0usize;
    let mut applicable = 0usize;
    let mut failures = Vec::new();

    for check in EVIDENCE_TABLE {
        let value = interview.and_then(|signals| field_value(signals, check.field));
        match (value, check.missing) {
            (Some(FieldValue::Score(score)), _) => {
                applicable += 1;
                let bar = field_bar(bars, check.field);
                if score >= bar {
                    passed += 1;
                } else {
                    failures.push(format!("{} {score:.2} below bar {bar:.2}", check.field));
                }
            }
            (Some(FieldValue::Text), _) => {
                applicable += 1;
                passed += 1;
            }
            (None, MissingPolicy::Fail) => {
                applicable += 1;
                failures.push(format!("{} missing", check.field));
            }
            (None, MissingPolicy::Pass) => {
                applicable += 1;
                passed += 1;
            }
            (None, MissingPolicy::Neutral) => {}
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let score = if applicable == 0 {
        0.0
    } else {
        passed as f64 / applicable as f64
    };
    EvidenceReport { score, failures }
}

enum FieldValue {
    Score(f64),
    Text,
}

fn field_value(signals: &InterviewSignals, field: &str) -> Option<FieldValue> {
    match field {
        "motivation" => signals.motivation.map(FieldValue::Score),
        "communication" => signals.communication.map(FieldValue::Score),
        "technical_depth" => signals.technical_depth.map(FieldValue::Score),
        "availability" => signals.availability.as_ref().map(|_| FieldValue::Text),
        _ => None,
    }
}

fn field_bar(bars: &EvidenceBars, field: &str) -> f64 {
    match field {
        "motivation" => bars.motivation,
        "communication" => bars.communication,
        "technical_depth" => bars.technical_depth,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{candidate_with_interview, candidate_with_tags};

    #[test]
    fn consistent_candidate_scores_full() {
        let mut candidate = candidate_with_tags("c", &["rust", "cuda", "ml"]);
        candidate.years_experience = Some(8.0);
        let report = detect_outliers(&candidate);
        assert!((report.score - 1.0).abs() < f64::EPSILON);
        assert!(report.flags.is_empty());
    }

    #[test]
    fn thin_senior_profile_is_flagged() {
        let mut candidate = candidate_with_tags("c", &["rust"]);
        candidate.years_experience = Some(15.0);
        let report = detect_outliers(&candidate);
        assert_eq!(report.flags.len(), 1);
        assert!((report.score - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn unsupported_claim_without_evidence_is_flagged() {
        let mut candidate = candidate_with_interview("c", 0.8, 0.8, 0.8);
        candidate.tags.insert("rust".to_string());
        if let Some(interview) = candidate.evidence.interview.as_mut() {
            interview
                .claims
                .push("built distributed databases at scale".to_string());
        }
        let report = detect_outliers(&candidate);
        assert!(report.flags.iter().any(|f| f.contains("unsupported")));
    }

    #[test]
    fn contradictory_claims_are_flagged() {
        let mut candidate = candidate_with_interview("c", 0.8, 0.8, 0.8);
        candidate.tags.insert("kubernetes".to_string());
        if let Some(interview) = candidate.evidence.interview.as_mut() {
            interview.claims.push("expert with kubernetes".to_string());
            interview
                .claims
                .push("never used kubernetes in production".to_string());
        }
        let report = detect_outliers(&candidate);
        assert!(report.flags.iter().any(|f| f.contains("contradictory")));
    }

    #[test]
    fn missing_required_field_fails_the_check() {
        let mut candidate = candidate_with_interview("c", 0.8, 0.8, 0.8);
        if let Some(interview) = candidate.evidence.interview.as_mut() {
            interview.motivation = None;
        }
        let report = validate_evidence(&candidate, &EvidenceBars::default());
        assert!(report.failures.iter().any(|f| f.contains("motivation missing")));
        assert!(report.score < 1.0);
    }

    #[test]
    fn missing_availability_is_neutral() {
        let candidate = candidate_with_interview("c", 0.8, 0.8, 0.8);
        let report = validate_evidence(&candidate, &EvidenceBars::default());
        // All three required signals pass; absent availability is excluded
        // rather than failed.
        assert!((report.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_interview_fails_every_required_field() {
        let candidate = candidate_with_tags("c", &["rust"]);
        let report = validate_evidence(&candidate, &EvidenceBars::default());
        assert!(report.score.abs() < f64::EPSILON);
        assert_eq!(report.failures.len(), 3);
    }

    #[test]
    fn below_bar_signal_fails_with_reason() {
        let candidate = candidate_with_interview("c", 0.1, 0.8, 0.8);
        let report = validate_evidence(&candidate, &EvidenceBars::default());
        assert!(report.failures.iter().any(|f| f.contains("motivation")));
    }
}
