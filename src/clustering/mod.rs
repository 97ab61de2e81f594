//! Talent clustering: partition a candidate population into named ability
//! groups over their dense embeddings.
//!
//! Full recomputation is a batch operation (cancellable, no bandit locks
//! held); per-ingest assignment of a single new candidate is a cheap
//! nearest-centroid lookup against the last full run's immutable model.

pub mod kmeans;
pub mod naming;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::ClusteringConfig;
use crate::error::{Result, ScoutError};
use crate::types::CandidateProfile;

/// One named ability group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCluster {
    /// Human-meaningful name derived from dominant tags, never an index.
    pub name: String,
    pub centroid: Vec<f32>,
    pub members: Vec<String>,
}

/// Immutable snapshot of one full clustering run. Recomputation produces a
/// new model swapped in atomically; concurrent readers never observe a
/// half-updated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterModel {
    pub clusters: Vec<AbilityCluster>,
    pub created_at: DateTime<Utc>,
}

impl ClusterModel {
    /// `candidate_id -> cluster_name` over every member of the run.
    #[must_use]
    pub fn assignment_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for cluster in &self.clusters {
            for member in &cluster.members {
                map.insert(member.clone(), cluster.name.clone());
            }
        }
        map
    }

    #[must_use]
    pub fn cluster_names(&self) -> Vec<&str> {
        self.clusters.iter().map(|c| c.name.as_str()).collect()
    }

    fn largest_cluster(&self) -> Option<&AbilityCluster> {
        self.clusters.iter().max_by_key(|c| c.members.len())
    }
}

/// Partitions candidate populations and assigns newcomers to the nearest
/// existing centroid.
#[derive(Debug, Clone)]
pub struct TalentClusterer {
    config: ClusteringConfig,
}

impl TalentClusterer {
    #[must_use]
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Full batch clustering of `candidates`.
    ///
    /// Populations smaller than the minimum K, or with zero embedding
    /// variance, collapse to exactly one cluster named from the whole
    /// population's dominant tags. Candidates without embeddings join the
    /// model through the same fallback path as `assign_one`.
    pub fn cluster(
        &self,
        candidates: &[CandidateProfile],
        token: &CancellationToken,
    ) -> Result<ClusterModel> {
        if candidates.is_empty() {
            return Err(ScoutError::InsufficientData(
                "cannot cluster an empty population".to_string(),
            ));
        }

        let usable: Vec<&CandidateProfile> = candidates
            .iter()
            .filter(|c| c.embedding.is_some())
            .collect();
        let skipped = candidates.len() - usable.len();
        if skipped > 0 {
            warn!(skipped, "candidates without embeddings use fallback assignment");
        }

        let all_refs: Vec<&CandidateProfile> = candidates.iter().collect();
        let population = naming::tag_frequencies(&all_refs);

        if usable.len() < self.config.min_k || zero_variance(&usable) {
            return Ok(self.single_cluster(candidates, &usable, &population));
        }

        let points: Vec<Vec<f32>> = usable
            .iter()
            .map(|c| c.embedding.clone().unwrap_or_default())
            .collect();

        let partition = kmeans::elbow_partition(
            &points,
            self.config.min_k..=self.config.max_k,
            self.config.max_iterations,
            token,
        )?;

        let mut member_refs: Vec<Vec<&CandidateProfile>> =
            vec![Vec::new(); partition.centroids.len()];
        for (candidate, &cluster) in usable.iter().zip(&partition.assignments) {
            member_refs[cluster].push(candidate);
        }

        let mut taken = HashSet::new();
        let mut clusters = Vec::new();
        for (centroid, members) in partition.centroids.iter().zip(&member_refs) {
            if members.is_empty() {
                continue;
            }
            let name = naming::dedupe_name(
                naming::name_cluster(members, &population, self.config.naming_lift),
                &taken,
            );
            taken.insert(name.clone());
            clusters.push(AbilityCluster {
                name,
                centroid: centroid.clone(),
                members: members.iter().map(|c| c.id.clone()).collect(),
            });
        }

        let mut model = ClusterModel {
            clusters,
            created_at: Utc::now(),
        };

        // Fold embedding-less candidates in through the fallback path so
        // the run still covers the whole population.
        for candidate in candidates.iter().filter(|c| c.embedding.is_none()) {
            let name = self.assign_one(candidate, &model);
            if let Some(cluster) = model.clusters.iter_mut().find(|c| c.name == name) {
                cluster.members.push(candidate.id.clone());
            }
        }

        debug!(
            clusters = model.clusters.len(),
            population = candidates.len(),
            "clustering run complete"
        );
        Ok(model)
    }

    /// Assign a single new candidate to the nearest existing centroid.
    ///
    /// Never creates a cluster, never errors, and is idempotent; it runs
    /// per-ingest and must stay cheap.
    #[must_use]
    pub fn assign_one(&self, candidate: &CandidateProfile, model: &ClusterModel) -> String {
        if model.clusters.len() <= 1 {
            return model
                .clusters
                .first()
                .map_or_else(|| "generalists".to_string(), |c| c.name.clone());
        }

        if let Some(embedding) = &candidate.embedding {
            let centroids: Vec<Vec<f32>> =
                model.clusters.iter().map(|c| c.centroid.clone()).collect();
            let nearest = kmeans::nearest_centroid(embedding, &centroids);
            return model.clusters[nearest].name.clone();
        }

        // No embedding: prefer a cluster whose name shares a tag with the
        // candidate, otherwise the largest cluster.
        for cluster in &model.clusters {
            if candidate
                .tags
                .iter()
                .any(|tag| cluster.name.contains(tag.as_str()))
            {
                return cluster.name.clone();
            }
        }
        model
            .largest_cluster()
            .map_or_else(|| "generalists".to_string(), |c| c.name.clone())
    }

    fn single_cluster(
        &self,
        candidates: &[CandidateProfile],
        usable: &[&CandidateProfile],
        population: &BTreeMap<String, f64>,
    ) -> ClusterModel {
        let all_refs: Vec<&CandidateProfile> = candidates.iter().collect();
        let name = naming::name_cluster(&all_refs, population, self.config.naming_lift);
        let centroid = mean_embedding(usable);
        ClusterModel {
            clusters: vec![AbilityCluster {
                name,
                centroid,
                members: candidates.iter().map(|c| c.id.clone()).collect(),
            }],
            created_at: Utc::now(),
        }
    }
}

fn zero_variance(candidates: &[&CandidateProfile]) -> bool {
    let mut embeddings = candidates.iter().filter_map(|c| c.embedding.as_ref());
    let Some(first) = embeddings.next() else {
        return true;
    };
    embeddings.all(|e| {
        e.len() == first.len()
            && e.iter()
                .zip(first.iter())
                .all(|(a, b)| (a - b).abs() < f32::EPSILON)
    })
}

fn mean_embedding(candidates: &[&CandidateProfile]) -> Vec<f32> {
    let embeddings: Vec<&Vec<f32>> = candidates.iter().filter_map(|c| c.embedding.as_ref()).collect();
    let Some(first) = embeddings.first() else {
        return Vec::new();
    };
    let mut sums = vec![0.0f64; first.len()];
    for embedding in &embeddings {
        for (d, value) in embedding.iter().enumerate() {
            if d < sums.len() {
                sums[d] += f64::from(*value);
            }
        }
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    sums.into_iter()
        .map(|sum| (sum / embeddings.len() as f64) as f32)
        .collect()
}
