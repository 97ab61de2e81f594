use std::sync::Arc;

use tempfile::TempDir;

use scout::ScoutEngine;
use scout::cancel::CancellationToken;
use scout::config::Config;
use scout::error::ScoutError;
use scout::storage::{JsonBanditStore, MemoryProfileStore, ProfileStore};
use scout::test_utils::{candidate_with_embedding, candidate_with_tags};
use scout::types::{CandidateProfile, RoleContext};

struct Fixture {
    engine: ScoutEngine,
    profiles: Arc<MemoryProfileStore>,
    candidates: Vec<CandidateProfile>,
    role: RoleContext,
    _state_dir: TempDir,
}

fn fixture() -> Fixture {
    let state_dir = TempDir::new().unwrap();
    let profiles = Arc::new(MemoryProfileStore::new());

    let candidates = vec![
        candidate_with_tags("alice", &["rust", "cuda", "ml"]),
        candidate_with_tags("bob", &["rust", "cuda"]),
        candidate_with_tags("carol", &["react", "css"]),
    ];
    for candidate in &candidates {
        profiles.insert(candidate.clone());
    }

    let mut role = RoleContext::new("systems-ml");
    for tag in ["rust", "cuda", "ml"] {
        role.tags.insert(tag.to_string());
    }

    let engine = ScoutEngine::new(
        Config::default(),
        profiles.clone(),
        Arc::new(JsonBanditStore::new(state_dir.path()).unwrap()),
    )
    .unwrap();

    Fixture {
        engine,
        profiles,
        candidates,
        role,
        _state_dir: state_dir,
    }
}

#[test]
fn select_learn_persist_restart_cycle() {
    let state_dir = TempDir::new().unwrap();
    let profiles = Arc::new(MemoryProfileStore::new());
    let candidates = vec![
        candidate_with_tags("alice", &["rust", "cuda", "ml"]),
        candidate_with_tags("bob", &["rust", "cuda"]),
        candidate_with_tags("carol", &["react", "css"]),
    ];
    for candidate in &candidates {
        profiles.insert(candidate.clone());
    }
    let mut role = RoleContext::new("systems-ml");
    for tag in ["rust", "cuda", "ml"] {
        role.tags.insert(tag.to_string());
    }

    // First process lifetime: initialize, learn, persist.
    {
        let engine = ScoutEngine::new(
            Config::default(),
            profiles.clone(),
            Arc::new(JsonBanditStore::new(state_dir.path()).unwrap()),
        )
        .unwrap();
        engine
            .initialize_policy("systems-ml", &candidates, &role)
            .unwrap();

        for _ in 0..5 {
            let metrics = engine
                .submit_feedback("systems-ml", "bob", 1.0, Some(true))
                .unwrap();
            assert!(metrics.version > 0);
        }
    }

    // Second process lifetime over the same state directory: the arm
    // mapping and learned counts must come back verbatim.
    let engine = ScoutEngine::new(
        Config::default(),
        profiles.clone(),
        Arc::new(JsonBanditStore::new(state_dir.path()).unwrap()),
    )
    .unwrap();
    engine
        .initialize_policy("systems-ml", &candidates, &role)
        .unwrap();

    let metrics = engine.metrics("systems-ml").unwrap();
    assert_eq!(metrics.version, 5);
    assert_eq!(metrics.observations, 5);
    // Bob's posterior kept its learned boost across the restart.
    assert!(metrics.arm_means[1] > metrics.arm_means[2]);

    let selected = engine.select("systems-ml").unwrap();
    assert!(["alice", "bob", "carol"].contains(&selected.as_str()));
}

#[test]
fn feedback_for_unknown_candidate_is_rejected() {
    let f = fixture();
    f.engine
        .initialize_policy("systems-ml", &f.candidates, &f.role)
        .unwrap();
    f.profiles.insert(candidate_with_tags("dave", &["go"]));

    assert!(matches!(
        f.engine.submit_feedback("systems-ml", "dave", 1.0, None),
        Err(ScoutError::UnknownArm(_))
    ));
}

#[test]
fn feedback_after_profile_deletion_is_a_conflict() {
    let f = fixture();
    f.engine
        .initialize_policy("systems-ml", &f.candidates, &f.role)
        .unwrap();
    f.profiles.remove("alice");

    assert!(matches!(
        f.engine.submit_feedback("systems-ml", "alice", 1.0, None),
        Err(ScoutError::PersistenceConflict(_))
    ));
}

#[test]
fn closed_role_stops_selection_and_learning() {
    let f = fixture();
    f.engine
        .initialize_policy("systems-ml", &f.candidates, &f.role)
        .unwrap();
    f.engine.close_role("systems-ml").unwrap();

    assert!(matches!(
        f.engine.select("systems-ml"),
        Err(ScoutError::RoleNotFound(_))
    ));
}

#[test]
fn independent_roles_learn_independently() {
    let f = fixture();
    f.engine
        .initialize_policy("systems-ml", &f.candidates, &f.role)
        .unwrap();

    let mut frontend = RoleContext::new("frontend");
    for tag in ["react", "css"] {
        frontend.tags.insert(tag.to_string());
    }
    f.engine
        .initialize_policy("frontend", &f.candidates, &frontend)
        .unwrap();

    f.engine
        .submit_feedback("systems-ml", "alice", 1.0, Some(true))
        .unwrap();

    // The other role's state is untouched.
    let frontend_metrics = f.engine.metrics("frontend").unwrap();
    assert_eq!(frontend_metrics.observations, 0);
    assert_eq!(frontend_metrics.version, 0);
}

#[test]
fn clustering_and_scoring_round_out_the_pipeline() {
    let f = fixture();

    let mut population = Vec::new();
    for i in 0..12 {
        #[allow(clippy::cast_precision_loss)]
        let jitter = i as f32 * 0.01;
        let mut candidate = candidate_with_embedding(format!("ml-{i}"), &[jitter, 0.0]);
        candidate.tags.insert("cuda".to_string());
        f.profiles.insert(candidate.clone());
        population.push(candidate);
    }
    for i in 0..12 {
        #[allow(clippy::cast_precision_loss)]
        let jitter = i as f32 * 0.01;
        let mut candidate = candidate_with_embedding(format!("web-{i}"), &[8.0 + jitter, 8.0]);
        candidate.tags.insert("react".to_string());
        f.profiles.insert(candidate.clone());
        population.push(candidate);
    }

    let token = CancellationToken::new();
    let assignments = f.engine.cluster_population(&population, &token).unwrap();
    assert_eq!(assignments.len(), 24);

    // Derived fields landed in the profile store.
    let stored = f.profiles.get_profile("ml-0").unwrap().unwrap();
    assert!(stored.ability_cluster.is_some());

    // A newcomer lands in an existing cluster without a recompute.
    let newcomer = candidate_with_embedding("ml-new", &[0.05, 0.0]);
    f.profiles.insert(newcomer.clone());
    let name = f.engine.assign_cluster(&newcomer).unwrap();
    assert!(assignments.values().any(|existing| existing == &name));

    // Exceptional scoring writes its derived field back too.
    let (_, breakdown) = f.engine.score_exceptional("ml-0", Some(&f.role)).unwrap();
    assert!(breakdown.contains_key("role_fit"));
    let stored = f.profiles.get_profile("ml-0").unwrap().unwrap();
    assert!(stored.exceptional_score.is_some());
}
