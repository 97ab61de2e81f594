//! Shared domain types: candidate profiles, role contexts, decisions.
//!
//! Profiles are owned by the external profile store; the engine reads them
//! and writes back only the derived fields (`ability_cluster`,
//! `exceptional_score`).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A candidate as read from the profile store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Normalized lowercase skill/domain tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub education: Vec<String>,
    #[serde(default)]
    pub evidence: EvidenceBundle,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    /// Derived: assigned by the clusterer, written back to the store.
    #[serde(default)]
    pub ability_cluster: Option<String>,
    /// Derived: assigned by the exceptional scorer, written back to the store.
    #[serde(default)]
    pub exceptional_score: Option<f64>,
}

impl CandidateProfile {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Raw, heterogeneous evidence attached to a candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    #[serde(default)]
    pub publication_count: Option<u32>,
    #[serde(default)]
    pub repo_stars: Option<u32>,
    #[serde(default)]
    pub follower_count: Option<u32>,
    #[serde(default)]
    pub interview: Option<InterviewSignals>,
}

/// Scores extracted from a parsed interview transcript, already in [0,1].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewSignals {
    #[serde(default)]
    pub motivation: Option<f64>,
    #[serde(default)]
    pub communication: Option<f64>,
    #[serde(default)]
    pub technical_depth: Option<f64>,
    #[serde(default)]
    pub availability: Option<String>,
    /// Free-form claims extracted from the transcript.
    #[serde(default)]
    pub claims: Vec<String>,
}

/// A role's requirements. Read-only input to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleContext {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Hard requirements; a candidate missing any of these always fails.
    #[serde(default)]
    pub must_haves: BTreeSet<String>,
    #[serde(default)]
    pub min_years: Option<f64>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl RoleContext {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// The outcome of one screening attempt. Immutable once emitted; a re-screen
/// produces a new `Decision` with a fresh id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub candidate_id: String,
    pub role_id: String,
    pub outcome: bool,
    pub confidence: f64,
    /// One entry per gate stage, populated even on early exit.
    pub reasoning: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// One observed outcome for a candidate on a role. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub candidate_id: String,
    pub role_id: String,
    /// Reward in [0,1], derived from graded or free-text feedback.
    pub reward: f64,
    #[serde(default)]
    pub is_qualified: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackEvent {
    #[must_use]
    pub fn new(candidate_id: impl Into<String>, role_id: impl Into<String>, reward: f64) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            role_id: role_id.into(),
            reward: reward.clamp(0.0, 1.0),
            is_qualified: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_qualified(mut self, is_qualified: bool) -> Self {
        self.is_qualified = Some(is_qualified);
        self
    }
}
