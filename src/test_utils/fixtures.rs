//! Profile and role builders shared by unit, property, and e2e tests.

use crate::types::{CandidateProfile, InterviewSignals, RoleContext};

/// A candidate with the given skill tags and nothing else.
#[must_use]
pub fn candidate_with_tags(id: impl Into<String>, tags: &[&str]) -> CandidateProfile {
    let mut candidate = CandidateProfile::new(id);
    for tag in tags {
        candidate.tags.insert((*tag).to_lowercase());
    }
    candidate
}

/// A role requiring the given tags (none of them hard must-haves).
#[must_use]
pub fn role_with_tags(id: impl Into<String>, tags: &[&str]) -> RoleContext {
    let mut role = RoleContext::new(id);
    role.title = "fixture role".to_string();
    for tag in tags {
        role.tags.insert((*tag).to_lowercase());
    }
    role
}

/// A candidate with a dense embedding and no tags.
#[must_use]
pub fn candidate_with_embedding(id: impl Into<String>, embedding: &[f32]) -> CandidateProfile {
    let mut candidate = CandidateProfile::new(id);
    candidate.embedding = Some(embedding.to_vec());
    candidate
}

/// A candidate with extracted interview signals at the given levels.
#[must_use]
pub fn candidate_with_interview(
    id: impl Into<String>,
    motivation: f64,
    communication: f64,
    technical_depth: f64,
) -> CandidateProfile {
    let mut candidate = CandidateProfile::new(id);
    candidate.evidence.interview = Some(InterviewSignals {
        motivation: Some(motivation),
        communication: Some(communication),
        technical_depth: Some(technical_depth),
        availability: None,
        claims: Vec::new(),
    });
    candidate
}

/// A candidate with strong evidence across all four signal sources; clears
/// the exceptional gate under default scoring configuration.
#[must_use]
pub fn exceptional_candidate(id: impl Into<String>) -> CandidateProfile {
    let mut candidate = candidate_with_interview(id, 0.9, 0.9, 0.9);
    candidate.evidence.publication_count = Some(45);
    candidate.evidence.repo_stars = Some(8_000);
    candidate.evidence.follower_count = Some(60_000);
    candidate
}
