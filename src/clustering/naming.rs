//! Cluster naming from disproportionately frequent tags.
//!
//! A cluster is named by the tags whose in-cluster frequency exceeds their
//! population frequency by a configurable lift factor. Names are always
//! human-meaningful, never a bare index; uniqueness within a run is
//! enforced with a numbered suffix only when two clusters share dominant
//! tags.

use std::collections::{BTreeMap, HashSet};

use crate::types::CandidateProfile;

/// How many tags contribute to a cluster name.
const NAME_TAGS: usize = 2;

/// Per-tag frequency over a set of candidates.
#[must_use]
pub fn tag_frequencies(candidates: &[&CandidateProfile]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for candidate in candidates {
        for tag in &candidate.tags {
            *counts.entry(tag.clone()).or_insert(0.0) += 1.0;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let total = candidates.len().max(1) as f64;
    for value in counts.values_mut() {
        *value /= total;
    }
    counts
}

/// Name one cluster from its members' tags relative to the population.
#[must_use]
pub fn name_cluster(
    members: &[&CandidateProfile],
    population: &BTreeMap<String, f64>,
    lift_threshold: f64,
) -> String {
    let in_cluster = tag_frequencies(members);

    // Rank tags by lift over the population; a tag unseen in the
    // population (degenerate, but possible with empty inputs) gets its raw
    // in-cluster frequency as lift.
    let mut lifted: Vec<(String, f64)> = in_cluster
        .iter()
        .map(|(tag, freq)| {
            let base = population.get(tag).copied().unwrap_or(0.0);
            let lift = if base > 0.0 { freq / base } else { *freq };
            (tag.clone(), lift)
        })
        .filter(|(_, lift)| *lift >= lift_threshold)
        .collect();
    lifted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut parts: Vec<String> = lifted
        .into_iter()
        .take(NAME_TAGS)
        .map(|(tag, _)| tag)
        .collect();

    // Nothing clears the lift bar (e.g. a single-cluster run where every
    // frequency equals the population's): fall back to the most common
    // in-cluster tags.
    if parts.is_empty() {
        let mut common: Vec<(String, f64)> = in_cluster.into_iter().collect();
        common.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        parts = common.into_iter().take(NAME_TAGS).map(|(tag, _)| tag).collect();
    }

    if parts.is_empty() {
        return "generalists".to_string();
    }
    format!("{} specialists", parts.join(" / "))
}

/// Make `name` unique within `taken`, appending a numbered suffix only on
/// collision.
#[must_use]
pub fn dedupe_name(name: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&name) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name} ({n})");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
