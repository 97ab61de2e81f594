use proptest::prelude::*;

use scout::bandit::to_prior;

proptest! {
    #[test]
    fn shapes_never_drop_below_one(s in 0.0f64..=1.0, strength in 0.0f64..100.0) {
        let (alpha, beta) = to_prior(s, strength);
        prop_assert!(alpha >= 1.0);
        prop_assert!(beta >= 1.0);
    }

    #[test]
    fn alpha_strictly_increases_with_similarity(
        low in 0.0f64..0.5,
        delta in 0.01f64..0.5,
        strength in 0.1f64..100.0,
    ) {
        let high = low + delta;
        let (alpha_low, beta_low) = to_prior(low, strength);
        let (alpha_high, beta_high) = to_prior(high, strength);
        prop_assert!(alpha_high > alpha_low);
        prop_assert!(beta_high < beta_low);
    }

    #[test]
    fn zero_strength_is_the_uniform_prior(s in 0.0f64..=1.0) {
        let (alpha, beta) = to_prior(s, 0.0);
        prop_assert!((alpha - 1.0).abs() < f64::EPSILON);
        prop_assert!((beta - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prior_mean_tracks_similarity(s in 0.0f64..=1.0) {
        let (alpha, beta) = to_prior(s, 10.0);
        let mean = alpha / (alpha + beta);
        // With strength 10 the mean is (1 + 10s) / 12: within 1/12 of the
        // similarity, pulled toward 0.5 by the uniform pseudo-counts.
        prop_assert!((mean - s).abs() <= 1.0 / 12.0 + 1e-9);
    }
}
