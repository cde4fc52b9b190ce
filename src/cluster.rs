//! Spatial clustering of nearby activities.
//!
//! Union-find over all activity pairs closer than a radius. O(n²) pairwise
//! comparisons, which is fine for a single day's activity count; a spatial
//! grid pre-filter could replace the pair scan without changing the contract.

use chrono::NaiveTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geo::distance_km;
use crate::model::{Activity, Coordinate};

/// Default clustering radius in kilometers.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 1.5;

/// A group of geographically close activities.
///
/// Ephemeral: recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCluster {
    /// Member ids in input order; never empty.
    pub activity_ids: Vec<String>,
    /// Arithmetic mean of member coordinates.
    pub centroid: Coordinate,
    /// Min/max member cost, when any member has one.
    pub cost_range: Option<(f64, f64)>,
    /// Earliest start and latest end across members.
    pub time_range: (NaiveTime, NaiveTime),
}

/// Group activities into clusters of pairwise-nearby members.
///
/// Singletons are valid clusters (no nearby neighbors). Output order follows
/// each cluster's first member in the input, so results are deterministic.
pub fn cluster_activities(activities: &[Activity], radius_km: f64) -> Vec<LocationCluster> {
    if activities.is_empty() {
        return Vec::new();
    }

    let n = activities.len();
    let close_pairs: Vec<(usize, usize)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| (i + 1..n).map(move |j| (i, j)))
        .filter(|&(i, j)| distance_km(activities[i].location, activities[j].location) < radius_km)
        .collect();

    let mut sets = DisjointSet::new(n);
    for (i, j) in close_pairs {
        sets.union(i, j);
    }

    // Components in order of first appearance.
    let mut roots: Vec<usize> = Vec::new();
    let mut members: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = sets.find(i);
        match roots.iter().position(|&r| r == root) {
            Some(slot) => members[slot].push(i),
            None => {
                roots.push(root);
                members.push(vec![i]);
            }
        }
    }

    members
        .into_iter()
        .map(|indices| build_cluster(activities, &indices))
        .collect()
}

fn build_cluster(activities: &[Activity], indices: &[usize]) -> LocationCluster {
    let count = indices.len() as f64;
    let lat = indices.iter().map(|&i| activities[i].location.lat).sum::<f64>() / count;
    let lng = indices.iter().map(|&i| activities[i].location.lng).sum::<f64>() / count;

    let mut cost_range: Option<(f64, f64)> = None;
    for &i in indices {
        if let Some(cost) = activities[i].cost {
            cost_range = Some(match cost_range {
                Some((lo, hi)) => (lo.min(cost), hi.max(cost)),
                None => (cost, cost),
            });
        }
    }

    let earliest = indices
        .iter()
        .map(|&i| activities[i].window.start())
        .min()
        .unwrap_or_default();
    let latest = indices
        .iter()
        .map(|&i| activities[i].window.end())
        .max()
        .unwrap_or_default();

    LocationCluster {
        activity_ids: indices.iter().map(|&i| activities[i].id.clone()).collect(),
        centroid: Coordinate::new(lat, lng),
        cost_range,
        time_range: (earliest, latest),
    }
}

/// Union-find with path halving.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Lower root wins so component roots stay stable across runs.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
