//! K-means partitioning with deterministic seeding and an elbow heuristic
//! for choosing K.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::cancel::CancellationToken;
use crate::error::{Result, ScoutError};

/// Fixed seed so repeated runs over the same population partition
/// identically.
const KMEANS_SEED: u64 = 0x5c07;

/// Result of one K-means run.
#[derive(Debug, Clone)]
pub struct Partition {
    pub centroids: Vec<Vec<f32>>,
    /// Cluster index per input point, parallel to the input.
    pub assignments: Vec<usize>,
    /// Total within-cluster squared distance.
    pub inertia: f64,
}

/// Run K-means for each K in `k_range`, score each run's inertia, and pick
/// the elbow: the K after which adding clusters stops paying for itself.
pub fn elbow_partition(
    points: &[Vec<f32>],
    k_range: std::ops::RangeInclusive<usize>,
    max_iterations: usize,
    token: &CancellationToken,
) -> Result<Partition> {
    let min_k = (*k_range.start()).max(1);
    let max_k = (*k_range.end()).min(points.len()).max(min_k);

    let mut runs = Vec::new();
    for k in min_k..=max_k {
        if token.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }
        runs.push(run_kmeans(points, k, max_iterations, token)?);
    }

    Ok(pick_elbow(runs))
}

/// One K-means run with k-means++-style furthest-point seeding.
pub fn run_kmeans(
    points: &[Vec<f32>],
    k: usize,
    max_iterations: usize,
    token: &CancellationToken,
) -> Result<Partition> {
    if points.is_empty() {
        return Ok(Partition {
            centroids: Vec::new(),
            assignments: Vec::new(),
            inertia: 0.0,
        });
    }
    let k = k.min(points.len()).max(1);
    let mut centroids = seed_centroids(points, k);
    let mut assignments = vec![0usize; points.len()];

    for _ in 0..max_iterations.max(1) {
        if token.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        let mut moved = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                moved = true;
            }
        }

        recompute_centroids(points, &assignments, &mut centroids);
        if !moved {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&assignments)
        .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
        .sum();

    Ok(Partition {
        centroids,
        assignments,
        inertia,
    })
}

/// Index of the centroid nearest to `point`; ties break to the lowest index.
#[must_use]
pub fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

fn seed_centroids(points: &[Vec<f32>], k: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);

    // First centroid: a deterministic random point. Each subsequent one:
    // the point farthest from its nearest existing centroid, which spreads
    // the seeds without a full k-means++ probability draw.
    let first = sample(&mut rng, points.len(), 1).index(0);
    centroids.push(points[first].clone());

    while centroids.len() < k {
        let farthest = points
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                let da = squared_distance(a, &centroids[nearest_centroid(a, &centroids)]);
                let db = squared_distance(b, &centroids[nearest_centroid(b, &centroids)]);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        centroids.push(points[farthest].clone());
    }

    centroids
}

fn recompute_centroids(points: &[Vec<f32>], assignments: &[usize], centroids: &mut [Vec<f32>]) {
    let dims = points.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f64; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (d, value) in point.iter().enumerate() {
            sums[cluster][d] += f64::from(*value);
        }
    }

    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        if counts[cluster] == 0 {
            // Empty cluster: reseed it to the point farthest from its
            // current centroid so it can recapture mass next iteration.
            if let Some(farthest) = points.iter().max_by(|a, b| {
                squared_distance(a, centroid).total_cmp(&squared_distance(b, centroid))
            }) {
                centroid.clone_from(farthest);
            }
            continue;
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        for (d, sum) in sums[cluster].iter().enumerate() {
            centroid[d] = (*sum / counts[cluster] as f64) as f32;
        }
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(x - y);
            d * d
        })
        .sum()
}

/// Pick the run at the elbow of the inertia curve: the largest drop in
/// improvement between consecutive K values. With fewer than three runs
/// the lowest-inertia run wins.
fn pick_elbow(mut runs: Vec<Partition>) -> Partition {
    if runs.len() < 3 {
        let best = runs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.inertia.total_cmp(&b.inertia))
            .map_or(0, |(i, _)| i);
        return runs.swap_remove(best);
    }

    let mut best_index = 1;
    let mut best_curvature = f64::NEG_INFINITY;
    for i in 1..runs.len() - 1 {
        let drop_before = runs[i - 1].inertia - runs[i].inertia;
        let drop_after = runs[i].inertia - runs[i + 1].inertia;
        let curvature = drop_before - drop_after;
        if curvature > best_curvature {
            best_curvature = curvature;
            best_index = i;
        }
    }
    runs.swap_remove(best_index)
}
