use scout::bandit::{BanditState, RolePolicy, to_prior};
use scout::config::BanditConfig;

fn policy_with_similarities(similarities: &[f64]) -> RolePolicy {
    let mut state = BanditState::new("role-1");
    for (i, similarity) in similarities.iter().enumerate() {
        let (alpha, beta) = to_prior(*similarity, 10.0);
        state.arms.push(format!("c{i}"));
        state.alpha.push(alpha);
        state.beta.push(beta);
    }
    RolePolicy::resume(state, BanditConfig::default()).unwrap()
}

#[test]
fn warm_start_biases_selection_before_any_learning() {
    // Three arms with similarities 0.9 / 0.5 / 0.1 and no updates at all:
    // the prior alone should make arm 0 win clearly more often than arm 2.
    let policy = policy_with_similarities(&[0.9, 0.5, 0.1]);

    let mut counts = [0usize; 3];
    for _ in 0..1_000 {
        counts[policy.select().unwrap()] += 1;
    }

    assert!(
        counts[0] > counts[2],
        "warm start should favor the similar candidate: {counts:?}"
    );
    assert!(counts[0] > 400, "arm 0 should dominate: {counts:?}");
}

#[test]
fn uniform_similarities_spread_selection() {
    let policy = policy_with_similarities(&[0.5, 0.5, 0.5]);

    let mut counts = [0usize; 3];
    for _ in 0..3_000 {
        counts[policy.select().unwrap()] += 1;
    }

    // Identical priors: no arm should collapse to zero or take everything.
    for count in counts {
        assert!(count > 300, "expected a rough spread, got {counts:?}");
    }
}

#[test]
fn learning_can_overturn_the_warm_start() {
    let mut policy = policy_with_similarities(&[0.9, 0.1]);

    // Heavy negative evidence on the similar arm, positive on the other.
    for _ in 0..60 {
        policy.update(0, 0.0, None).unwrap();
        policy.update(1, 1.0, None).unwrap();
    }

    let state = policy.state();
    assert!(state.posterior_mean(1) > state.posterior_mean(0));
}
