use rand::Rng;
use thiserror::Error;

use crate::game::Placement;
use crate::grid::Coord;
use crate::population::PopulationMatrix;

/// Iteration stops once total L1 centroid movement falls below this.
const CONVERGENCE_EPS: f64 = 0.5;
/// A cluster must exceed this size to justify a plant.
const MIN_CLUSTER_SIZE: usize = 10;
/// Hard cap on assignment/update rounds, in case movement plateaus just
/// above the threshold on a pathological input.
const MAX_ROUNDS: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("k = {k} must be smaller than the number of grid cells ({cells})")]
    DegenerateK { k: usize, cells: usize },
    #[error("k must be at least 1")]
    ZeroClusters,
}

/// How a cluster's representative point is recomputed each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentroidMethod {
    /// k-means: per-axis mean of assigned points.
    Mean,
    /// k-medians: per-axis median of assigned points.
    Median,
}

/// Clustering placement policy.
///
/// Treats each unserviced person as one point at their cell (a cell with n
/// people contributes n coincident points), clusters the points around k
/// centroids, and proposes building at the centroid of the largest cluster
/// that exceeds the minimum size. Reads the population matrix only; the
/// driver feeds the decision back into `Game::step`.
#[derive(Debug, Clone)]
pub struct ClusterPolicy {
    pub k: usize,
    pub method: CentroidMethod,
}

impl ClusterPolicy {
    pub fn new(k: usize, method: CentroidMethod) -> Self {
        Self { k, method }
    }

    pub fn decide(
        &self,
        pop: &PopulationMatrix,
        rng: &mut impl Rng,
    ) -> Result<Placement, PolicyError> {
        let cells = (pop.width() * pop.height()) as usize;
        if self.k == 0 {
            return Err(PolicyError::ZeroClusters);
        }
        if self.k >= cells {
            return Err(PolicyError::DegenerateK { k: self.k, cells });
        }

        let points = unserviced_points(pop);
        let mut centroids = seed_centroids(self.k, pop.width(), pop.height(), rng);
        let mut clusters: Vec<Vec<Coord>> = vec![Vec::new(); self.k];

        for _ in 0..MAX_ROUNDS {
            for cluster in &mut clusters {
                cluster.clear();
            }
            for &point in &points {
                clusters[nearest_centroid(&centroids, point)].push(point);
            }

            let mut movement = 0.0;
            for (centroid, cluster) in centroids.iter_mut().zip(&clusters) {
                // An empty cluster keeps its centroid; updating it would
                // divide by zero.
                if cluster.is_empty() {
                    continue;
                }
                let updated = match self.method {
                    CentroidMethod::Mean => mean_point(cluster),
                    CentroidMethod::Median => median_point(cluster),
                };
                movement += (updated.0 - centroid.0).abs() + (updated.1 - centroid.1).abs();
                *centroid = updated;
            }
            if movement < CONVERGENCE_EPS {
                break;
            }
        }

        let winner = clusters
            .iter()
            .enumerate()
            .filter(|(_, cluster)| cluster.len() > MIN_CLUSTER_SIZE)
            .max_by_key(|(_, cluster)| cluster.len())
            .map(|(index, _)| index);

        Ok(match winner {
            Some(index) => {
                let (cx, cy) = centroids[index];
                Placement::Build(Coord::new(cx.round() as i32, cy.round() as i32))
            }
            None => Placement::Hold,
        })
    }
}

/// Baseline policy: a fair coin decides whether to build, and if so the
/// location is uniformly random over the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn decide(&self, pop: &PopulationMatrix, rng: &mut impl Rng) -> Placement {
        if rng.gen_bool(0.5) {
            let x = rng.gen_range(0..pop.width()) as i32;
            let y = rng.gen_range(0..pop.height()) as i32;
            Placement::Build(Coord::new(x, y))
        } else {
            Placement::Hold
        }
    }
}

fn unserviced_points(pop: &PopulationMatrix) -> Vec<Coord> {
    let mut points = Vec::new();
    for (coord, &count) in pop.unserviced_grid().iter() {
        for _ in 0..count {
            points.push(coord);
        }
    }
    points
}

fn seed_centroids(k: usize, width: u32, height: u32, rng: &mut impl Rng) -> Vec<(f64, f64)> {
    let mut seeds: Vec<Coord> = Vec::with_capacity(k);
    while seeds.len() < k {
        let candidate = Coord::new(rng.gen_range(0..width) as i32, rng.gen_range(0..height) as i32);
        if !seeds.contains(&candidate) {
            seeds.push(candidate);
        }
    }
    seeds
        .into_iter()
        .map(|c| (c.x as f64, c.y as f64))
        .collect()
}

fn nearest_centroid(centroids: &[(f64, f64)], point: Coord) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (index, &(cx, cy)) in centroids.iter().enumerate() {
        let (dx, dy) = (point.x as f64 - cx, point.y as f64 - cy);
        let dist = dx * dx + dy * dy;
        if dist < best_dist {
            best_dist = dist;
            best = index;
        }
    }
    best
}

fn mean_point(cluster: &[Coord]) -> (f64, f64) {
    let n = cluster.len() as f64;
    let sum_x: f64 = cluster.iter().map(|c| c.x as f64).sum();
    let sum_y: f64 = cluster.iter().map(|c| c.y as f64).sum();
    (sum_x / n, sum_y / n)
}

fn median_point(cluster: &[Coord]) -> (f64, f64) {
    (
        axis_median(cluster.iter().map(|c| c.x)),
        axis_median(cluster.iter().map(|c| c.y)),
    )
}

fn axis_median(values: impl Iterator<Item = i32>) -> f64 {
    let mut sorted: Vec<i32> = values.collect();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}
