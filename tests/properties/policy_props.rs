use proptest::prelude::*;

use scout::bandit::{BanditState, RolePolicy, to_prior};
use scout::config::BanditConfig;

fn policy_from_similarities(similarities: &[f64]) -> RolePolicy {
    let mut state = BanditState::new("prop-role");
    for (i, s) in similarities.iter().enumerate() {
        let (alpha, beta) = to_prior(*s, 10.0);
        state.arms.push(format!("c{i}"));
        state.alpha.push(alpha);
        state.beta.push(beta);
    }
    RolePolicy::resume(state, BanditConfig::default()).unwrap()
}

proptest! {
    #[test]
    fn select_stays_in_range(similarities in prop::collection::vec(0.0f64..=1.0, 1..32)) {
        let policy = policy_from_similarities(&similarities);
        for _ in 0..16 {
            let arm = policy.select().unwrap();
            prop_assert!(arm < similarities.len());
        }
    }

    #[test]
    fn successes_monotonically_raise_the_mean(
        s in 0.0f64..=1.0,
        updates in 1usize..64,
    ) {
        let mut policy = policy_from_similarities(&[s]);
        let mut previous = policy.state().posterior_mean(0);
        for _ in 0..updates {
            policy.update(0, 1.0, None).unwrap();
            let current = policy.state().posterior_mean(0);
            prop_assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn failures_monotonically_lower_the_mean(
        s in 0.0f64..=1.0,
        updates in 1usize..64,
    ) {
        let mut policy = policy_from_similarities(&[s]);
        let mut previous = policy.state().posterior_mean(0);
        for _ in 0..updates {
            policy.update(0, 0.0, None).unwrap();
            let current = policy.state().posterior_mean(0);
            prop_assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn interval_width_shrinks_as_evidence_grows_for_fixed_mean(
        mean in 0.1f64..=0.9,
        mass in 10.0f64..1000.0,
        growth in 1.5f64..10.0,
    ) {
        // Same posterior mean, more evidence: alpha and beta scale
        // together, so the interval must narrow.
        let width_at = |n: f64| {
            let mut state = BanditState::new("prop-role");
            state.arms.push("c0".to_string());
            state.alpha.push(mean * n);
            state.beta.push((1.0 - mean) * n);
            let policy = RolePolicy::resume(state, BanditConfig::default()).unwrap();
            let (lo, hi, _) = policy.confidence_interval(0, 0.95).unwrap();
            hi - lo
        };

        prop_assert!(width_at(mass * growth) < width_at(mass));
    }

    #[test]
    fn interval_always_brackets_the_mean(
        alpha in 1.0f64..200.0,
        beta in 1.0f64..200.0,
    ) {
        let mut state = BanditState::new("prop-role");
        state.arms.push("c0".to_string());
        state.alpha.push(alpha);
        state.beta.push(beta);
        let policy = RolePolicy::resume(state, BanditConfig::default()).unwrap();

        let (lo, hi, mean) = policy.confidence_interval(0, 0.95).unwrap();
        prop_assert!(lo <= mean && mean <= hi);
        prop_assert!((0.0..=1.0).contains(&lo));
        prop_assert!((0.0..=1.0).contains(&hi));
    }
}
