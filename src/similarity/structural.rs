//! Structural similarity: sharpened neighborhood overlap per attribute
//! category, combined as a weighted average.
//!
//! Each side of the bipartite candidate/role attribute graph contributes a
//! k-nearest-neighbor attribute set per category; the category score is the
//! Jaccard overlap of the two sets raised to `1/p`, which pushes mid-range
//! overlaps toward the extremes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::config::SimilarityConfig;
use crate::types::{CandidateProfile, RoleContext};

use super::{SimilarityMethod, SimilarityScore};

const CATEGORIES: [&str; 3] = ["skills", "experience", "education"];

/// Tags that describe education rather than skills.
const EDUCATION_TAGS: [&str; 8] = [
    "phd",
    "doctorate",
    "msc",
    "masters",
    "bsc",
    "bachelors",
    "postdoc",
    "mba",
];

pub fn estimate(
    config: &SimilarityConfig,
    candidate: &CandidateProfile,
    role: &RoleContext,
) -> SimilarityScore {
    let k = config.neighbors.max(1);
    let p = if config.sharpening > 0.0 {
        config.sharpening
    } else {
        1.0
    };

    let weights = [
        config.category_weights.skills,
        config.category_weights.experience,
        config.category_weights.education,
    ];

    let mut breakdown = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut any_defined = false;

    for (category, weight) in CATEGORIES.into_iter().zip(weights) {
        let right = neighborhood(category, k, Side::Role(role));

        // A category the role expresses no requirement in is undefined: it
        // contributes 0 and is excluded from the weight normalization
        // rather than aborting the computation.
        if right.is_empty() {
            breakdown.insert(category.to_string(), 0.0);
            continue;
        }

        any_defined = true;
        let left = neighborhood(category, k, Side::Candidate(candidate));
        let score = sharpened_jaccard(&left, &right, p);
        breakdown.insert(category.to_string(), score);
        weighted_sum += score * weight;
        weight_total += weight;
    }

    if !any_defined || weight_total <= 0.0 {
        return SimilarityScore::no_information(SimilarityMethod::Structural);
    }

    SimilarityScore {
        value: (weighted_sum / weight_total).clamp(0.0, 1.0),
        method: SimilarityMethod::Structural,
        breakdown,
        low_confidence: false,
    }
}

enum Side<'a> {
    Candidate(&'a CandidateProfile),
    Role(&'a RoleContext),
}

/// The k nearest attributes of one entity within a category.
///
/// Attribute order is deterministic (BTreeSet iteration), so truncating to
/// k is stable across runs and processes.
fn neighborhood(category: &str, k: usize, side: Side<'_>) -> BTreeSet<String> {
    let attrs: BTreeSet<String> = match (category, &side) {
        ("skills", Side::Candidate(c)) => c
            .tags
            .iter()
            .filter(|tag| !is_education_tag(tag))
            .cloned()
            .collect(),
        ("skills", Side::Role(r)) => r
            .tags
            .iter()
            .filter(|tag| !is_education_tag(tag))
            .cloned()
            .collect(),
        ("experience", Side::Candidate(c)) => {
            c.years_experience.map(experience_buckets).unwrap_or_default()
        }
        ("experience", Side::Role(r)) => r.min_years.map(experience_buckets).unwrap_or_default(),
        ("education", Side::Candidate(c)) => c
            .education
            .iter()
            .flat_map(|entry| tokenize(entry))
            .chain(c.tags.iter().filter(|tag| is_education_tag(tag)).cloned())
            .collect(),
        ("education", Side::Role(r)) => r
            .tags
            .iter()
            .filter(|tag| is_education_tag(tag))
            .cloned()
            .collect(),
        _ => BTreeSet::new(),
    };

    attrs.into_iter().take(k).collect()
}

/// `(|A ∩ B| / |A ∪ B|) ^ (1/p)`.
fn sharpened_jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>, p: f64) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(right).count();
    #[allow(clippy::cast_precision_loss)]
    let jaccard = intersection as f64 / union as f64;
    jaccard.powf(1.0 / p).clamp(0.0, 1.0)
}

/// Bucket years of experience, including adjacent buckets so that close
/// seniority levels still overlap.
fn experience_buckets(years: f64) -> BTreeSet<String> {
    let bucket = match years {
        y if y < 0.0 => return BTreeSet::new(),
        y if y < 3.0 => 0,
        y if y < 6.0 => 1,
        y if y < 10.0 => 2,
        _ => 3,
    };
    let labels = ["yrs:junior", "yrs:mid", "yrs:senior", "yrs:staff"];
    let mut out = BTreeSet::new();
    out.insert(labels[bucket].to_string());
    if bucket > 0 {
        out.insert(labels[bucket - 1].to_string());
    }
    if bucket + 1 < labels.len() {
        out.insert(labels[bucket + 1].to_string());
    }
    out
}

fn is_education_tag(tag: &str) -> bool {
    EDUCATION_TAGS.contains(&tag)
}

fn tokenize(entry: &str) -> BTreeSet<String> {
    entry
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 1)
        .map(str::to_lowercase)
        .collect()
}
