//! Seeded k-means (k-means++ initialization, Lloyd iterations).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KMeansError {
    #[error("{points} points cannot form {clusters} clusters")]
    TooFewPoints { points: usize, clusters: usize },

    #[error("point {index} has dimension {got}, expected {expected}")]
    Dimension { index: usize, expected: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansConfig {
    pub clusters: usize,
    pub seed: u64,
    pub max_iterations: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            clusters: 10,
            seed: 42,
            max_iterations: 300,
        }
    }
}

fn distance_sq(a: &[f64], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, &y)| {
            let d = x - y as f64;
            d * d
        })
        .sum()
}

fn to_f64(point: &[f32]) -> Vec<f64> {
    point.iter().map(|&v| v as f64).collect()
}

/// Index of the nearest centroid; ties go to the lowest index
fn nearest(point: &[f32], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = distance_sq(centroid, point);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

fn plus_plus_init(points: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(to_f64(&points[rng.gen_range(0..n)]));

    let mut nearest_sq: Vec<f64> = points.iter().map(|p| distance_sq(&centroids[0], p)).collect();

    while centroids.len() < k {
        let total: f64 = nearest_sq.iter().sum();
        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n - 1;
            for (i, &d) in nearest_sq.iter().enumerate() {
                cumulative += d;
                if cumulative >= target && d > 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            // Every point coincides with a centroid
            rng.gen_range(0..n)
        };

        let centroid = to_f64(&points[next]);
        for (d, p) in nearest_sq.iter_mut().zip(points) {
            *d = d.min(distance_sq(&centroid, p));
        }
        centroids.push(centroid);
    }

    centroids
}

/// Partition `points` into `config.clusters` groups and return the cluster of each point.
///
/// Stops when no assignment changes or after `max_iterations`. A cluster that
/// loses all its points keeps its previous centroid.
pub fn kmeans(points: &[Vec<f32>], config: &KMeansConfig) -> Result<Vec<usize>, KMeansError> {
    let n = points.len();
    let k = config.clusters;
    if k == 0 || n < k {
        return Err(KMeansError::TooFewPoints { points: n, clusters: k });
    }

    let dim = points[0].len();
    if let Some((index, p)) = points.iter().enumerate().find(|(_, p)| p.len() != dim) {
        return Err(KMeansError::Dimension {
            index,
            expected: dim,
            got: p.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut centroids = plus_plus_init(points, k, &mut rng);
    let mut labels = vec![usize::MAX; n];

    for _ in 0..config.max_iterations.max(1) {
        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points) {
            let c = nearest(point, &centroids);
            if *label != c {
                *label = c;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (&label, point) in labels.iter().zip(points) {
            counts[label] += 1;
            for (s, &v) in sums[label].iter_mut().zip(point) {
                *s += v as f64;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                centroids[c] = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            }
        }
    }

    Ok(labels)
}
