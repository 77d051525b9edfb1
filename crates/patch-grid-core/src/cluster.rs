//! 1-D axis clustering: partition normalized coordinates into 3 ordered
//! clusters (rows over y′, columns over x′).
//!
//! This is Lloyd's k-means with k = 3 and multiple deterministic restarts.
//! Instead of random restarts the seeds are drawn from fixed quantile triples
//! of the sorted samples, so repeated runs on the same input always converge
//! to the same labeled partition. For well-separated input (a real 3×3 grid)
//! this finds the same partition a randomized k-means would.

use log::warn;
use serde::{Deserialize, Serialize};

/// Stopping criterion and restart count for the 1-D 3-means.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Number of deterministic quantile-seeded restarts.
    pub restarts: usize,
    /// Max Lloyd iterations per restart.
    pub max_iters: usize,
    /// Stop once no center moves more than this.
    pub epsilon: f32,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            restarts: 4,
            max_iters: 100,
            epsilon: 1e-3,
        }
    }
}

/// Result of one axis clustering, relabeled by ascending center.
///
/// Label 0 is the cluster with the smallest center (topmost row / leftmost
/// column in the normalized frame).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxisClusters {
    /// Cluster centers, ascending.
    pub centers: [f32; 3],
    /// Per-sample ordered label, index-aligned with the input.
    pub labels: Vec<usize>,
}

const K: usize = 3;

/// Seed quantile triples, one per restart (cycled if `restarts` exceeds them).
const SEED_QUANTILES: [[f32; K]; 4] = [
    [0.0, 0.5, 1.0],
    [1.0 / 6.0, 0.5, 5.0 / 6.0],
    [0.25, 0.5, 0.75],
    [0.1, 0.5, 0.9],
];

/// Cluster `values` into 3 groups and relabel them by ascending center.
///
/// Requires at least 3 samples (enforced upstream by the FEW_PATCHES gate).
/// Deterministic: same input, same partition, every run.
pub fn cluster_axis(values: &[f32], params: &ClusterParams) -> AxisClusters {
    debug_assert!(values.len() >= K, "axis clustering needs >= 3 samples");
    debug_assert!(values.iter().all(|v| v.is_finite()), "non-finite sample");

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut best: Option<(f64, [f32; K], Vec<usize>)> = None;
    for r in 0..params.restarts.max(1) {
        let q = SEED_QUANTILES[r % SEED_QUANTILES.len()];
        let mut centers = [0.0f32; K];
        for (c, f) in centers.iter_mut().zip(q) {
            *c = quantile(&sorted, f);
        }
        let (sse, centers, labels) = lloyd(values, centers, params);
        let replace = match &best {
            Some((best_sse, _, _)) => sse < *best_sse,
            None => true,
        };
        if replace {
            best = Some((sse, centers, labels));
        }
    }

    // restarts >= 1, so best is always set.
    let (_, centers, labels) = best.unwrap_or_else(|| {
        warn!("axis clustering ran zero restarts");
        (0.0, [0.0; K], vec![0; values.len()])
    });

    relabel_ascending(centers, labels)
}

/// Representative center per ordered cluster: mean of member values, falling
/// back to the raw cluster center when no sample carries that label.
pub fn member_means(values: &[f32], clusters: &AxisClusters) -> [f32; 3] {
    let mut sums = [0.0f32; K];
    let mut counts = [0usize; K];
    for (v, &label) in values.iter().zip(&clusters.labels) {
        sums[label] += v;
        counts[label] += 1;
    }
    let mut out = clusters.centers;
    for k in 0..K {
        if counts[k] > 0 {
            out[k] = sums[k] / counts[k] as f32;
        } else {
            warn!("axis cluster {k} empty, using raw center {}", out[k]);
        }
    }
    out
}

fn quantile(sorted: &[f32], f: f32) -> f32 {
    let idx = ((sorted.len() - 1) as f32 * f).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn lloyd(values: &[f32], mut centers: [f32; K], params: &ClusterParams) -> (f64, [f32; K], Vec<usize>) {
    let mut labels = vec![0usize; values.len()];

    for _ in 0..params.max_iters {
        // Assignment step; ties go to the lower cluster index.
        for (i, v) in values.iter().enumerate() {
            let mut best_k = 0;
            let mut best_d = (v - centers[0]).abs();
            for (k, c) in centers.iter().enumerate().skip(1) {
                let d = (v - c).abs();
                if d < best_d {
                    best_d = d;
                    best_k = k;
                }
            }
            labels[i] = best_k;
        }

        // Update step.
        let mut sums = [0.0f32; K];
        let mut counts = [0usize; K];
        for (v, &k) in values.iter().zip(&labels) {
            sums[k] += v;
            counts[k] += 1;
        }

        let mut max_shift = 0.0f32;
        for k in 0..K {
            let new_center = if counts[k] > 0 {
                sums[k] / counts[k] as f32
            } else {
                // Reseed an emptied cluster to the sample worst served by
                // the remaining centers.
                farthest_sample(values, &centers)
            };
            max_shift = max_shift.max((new_center - centers[k]).abs());
            centers[k] = new_center;
        }

        if max_shift <= params.epsilon {
            break;
        }
    }

    // Final assignment for the final centers.
    let mut sse = 0.0f64;
    for (i, v) in values.iter().enumerate() {
        let mut best_k = 0;
        let mut best_d = (v - centers[0]).abs();
        for (k, c) in centers.iter().enumerate().skip(1) {
            let d = (v - c).abs();
            if d < best_d {
                best_d = d;
                best_k = k;
            }
        }
        labels[i] = best_k;
        sse += f64::from(best_d) * f64::from(best_d);
    }

    (sse, centers, labels)
}

fn farthest_sample(values: &[f32], centers: &[f32; K]) -> f32 {
    let mut best_v = values[0];
    let mut best_d = -1.0f32;
    for &v in values {
        let d = centers
            .iter()
            .map(|c| (v - c).abs())
            .fold(f32::INFINITY, f32::min);
        if d > best_d {
            best_d = d;
            best_v = v;
        }
    }
    best_v
}

fn relabel_ascending(centers: [f32; K], labels: Vec<usize>) -> AxisClusters {
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        centers[a]
            .partial_cmp(&centers[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    // old label -> ordered label
    let mut remap = [0usize; K];
    for (ordered, &old) in order.iter().enumerate() {
        remap[old] = ordered;
    }

    let mut ordered_centers = [0.0f32; K];
    for (ordered, &old) in order.iter().enumerate() {
        ordered_centers[ordered] = centers[old];
    }

    AxisClusters {
        centers: ordered_centers,
        labels: labels.into_iter().map(|l| remap[l]).collect(),
    }
}
