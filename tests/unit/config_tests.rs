use std::path::PathBuf;

use scout::config::{Config, SimilarityMethod};
use scout::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn custom_config_overrides_from_fixture() -> Result<(), String> {
    let cases = vec![TestCase {
        name: "custom",
        input: "tests/fixtures/configs/custom.toml",
        expected: (
            SimilarityMethod::Embedding,
            5usize,
            4.0f64,
            0.5f64,
            0.8f64,
            2usize,
            3usize,
        ),
    }];

    run_table_tests(cases, |relative_path| {
        let path = fixture_path(relative_path);
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let config = Config::load(Some(&path), &root).expect("load config");
        (
            config.similarity.method,
            config.similarity.neighbors,
            config.bandit.prior_strength,
            config.screening.similarity_floor,
            config.screening.pass_threshold,
            config.scoring.min_strong_signals,
            config.clustering.min_k,
        )
    })
}

#[test]
fn missing_explicit_config_keeps_defaults() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let config = Config::load(None, &root).expect("load config");
    assert!((config.screening.similarity_floor - 0.65).abs() < f64::EPSILON);
    assert!((config.bandit.prior_strength - 10.0).abs() < f64::EPSILON);
}

#[test]
fn partial_fixture_leaves_other_sections_untouched() {
    let path = fixture_path("tests/fixtures/configs/custom.toml");
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let config = Config::load(Some(&path), &root).expect("load config");

    // The fixture never mentions the fusion weights or signal caps.
    assert!((config.screening.fusion_weights.similarity - 0.35).abs() < f64::EPSILON);
    assert!((config.scoring.caps.repo_stars - 10_000.0).abs() < f64::EPSILON);
}
