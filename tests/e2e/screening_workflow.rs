use std::sync::Arc;

use scout::ScoutEngine;
use scout::config::Config;
use scout::storage::{MemoryBanditStore, MemoryProfileStore};
use scout::test_utils::candidate_with_interview;
use scout::types::{CandidateProfile, RoleContext};

fn engine_with_profiles(profiles: Vec<CandidateProfile>) -> (ScoutEngine, Arc<MemoryProfileStore>) {
    let store = Arc::new(MemoryProfileStore::new());
    for profile in profiles {
        store.insert(profile);
    }
    let engine = ScoutEngine::new(
        Config::default(),
        store.clone(),
        Arc::new(MemoryBanditStore::new()),
    )
    .unwrap();
    (engine, store)
}

fn cuda_role() -> RoleContext {
    let mut role = RoleContext::new("gpu-engineer");
    role.title = "GPU Engineer".to_string();
    for tag in ["cuda", "pytorch", "ml"] {
        role.tags.insert(tag.to_string());
    }
    role.must_haves.insert("cuda".to_string());
    role
}

#[test]
fn qualified_candidate_passes_the_full_gate() {
    let mut candidate = candidate_with_interview("a", 0.8, 0.8, 0.8);
    for tag in ["cuda", "pytorch", "ml"] {
        candidate.tags.insert(tag.to_string());
    }
    candidate.years_experience = Some(6.0);

    let (engine, _) = engine_with_profiles(vec![candidate]);
    let decision = engine.screen("a", &cuda_role()).unwrap();

    assert!(decision.outcome, "reasoning: {:?}", decision.reasoning);
    assert!(decision.confidence >= 0.70);
    assert_eq!(decision.reasoning.len(), 5);
    assert!(decision.reasoning[0].contains("all"));
}

#[test]
fn missing_must_have_fails_with_the_first_stage_cited() {
    let mut candidate = candidate_with_interview("b", 0.9, 0.9, 0.9);
    candidate.tags.insert("react".to_string());

    let (engine, _) = engine_with_profiles(vec![candidate]);
    let decision = engine.screen("b", &cuda_role()).unwrap();

    assert!(!decision.outcome);
    assert_eq!(decision.reasoning.len(), 5);
    // The first failing stage is the must-have check, and later stages
    // explain the short-circuit rather than being silently absent.
    assert!(decision.reasoning[0].contains("missing cuda"));
    for line in &decision.reasoning[1..] {
        assert!(line.contains("not evaluated"));
    }
}

#[test]
fn must_have_dominates_similarity_and_bandit_confidence() {
    // Same strong interview and high-overlap tags, but without the hard
    // requirement the outcome is always false.
    let mut candidate = candidate_with_interview("c", 0.9, 0.9, 0.9);
    for tag in ["pytorch", "ml"] {
        candidate.tags.insert(tag.to_string());
    }

    let (engine, _) = engine_with_profiles(vec![candidate]);
    let decision = engine.screen("c", &cuda_role()).unwrap();

    assert!(!decision.outcome);
    assert!(decision.reasoning[0].contains("missing cuda"));
}

#[test]
fn rescreening_emits_a_new_immutable_decision() {
    let mut candidate = candidate_with_interview("a", 0.8, 0.8, 0.8);
    for tag in ["cuda", "pytorch", "ml"] {
        candidate.tags.insert(tag.to_string());
    }

    let (engine, _) = engine_with_profiles(vec![candidate]);
    let role = cuda_role();

    let first = engine.screen("a", &role).unwrap();
    let second = engine.screen("a", &role).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.outcome, second.outcome);
}

#[test]
fn sparse_profile_gets_a_decision_not_an_error() {
    let (engine, _) = engine_with_profiles(vec![CandidateProfile::new("ghost-profile")]);
    let decision = engine.screen("ghost-profile", &cuda_role()).unwrap();
    assert!(!decision.outcome);
    assert_eq!(decision.reasoning.len(), 5);
}
