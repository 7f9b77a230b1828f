//! Geographic clustering: subdivide a workload into route-sized groups.
//!
//! Runs Lloyd k-means on raw (lat, lon) degrees with no projection, which
//! is fine for the small urban regions a facility serves. k scales with the
//! average-vehicle-capacity heuristic rather than true vehicle capacity.
//!
//! Centroids seed deterministically (evenly spaced picks from the sorted
//! coordinate list) so re-planning an unchanged roster reproduces the same
//! clusters.

use crate::model::Child;
use crate::workload::Workload;

/// Average vehicle capacity assumed when sizing clusters.
pub const DEFAULT_CAPACITY_HEURISTIC: usize = 10;

const MAX_ITERATIONS: usize = 100;

/// Split a workload into geographic clusters. Children without coordinates
/// cannot be positioned; they ride along with the first cluster, or form
/// their own when nobody has coordinates.
pub fn cluster_children(workload: &Workload, capacity_heuristic: usize) -> Vec<Vec<Child>> {
    let (with_coords, without_coords): (Vec<Child>, Vec<Child>) = workload
        .children
        .iter()
        .cloned()
        .partition(|c| c.coords().is_some());

    if with_coords.is_empty() {
        return vec![workload.children.clone()];
    }

    let heuristic = capacity_heuristic.max(1);
    let k = with_coords
        .len()
        .div_ceil(heuristic)
        .clamp(1, with_coords.len());

    if k == 1 {
        return vec![workload.children.clone()];
    }

    let points: Vec<(f64, f64)> = with_coords
        .iter()
        .map(|c| c.coords().unwrap_or((0.0, 0.0)))
        .collect();
    let assignment = kmeans(&points, k);

    let mut clusters: Vec<Vec<Child>> = vec![Vec::new(); k];
    for (index, child) in with_coords.into_iter().enumerate() {
        clusters[assignment[index]].push(child);
    }
    clusters.retain(|cluster| !cluster.is_empty());

    if !without_coords.is_empty() {
        match clusters.first_mut() {
            Some(first) => first.extend(without_coords),
            None => clusters.push(without_coords),
        }
    }

    clusters
}

/// Lloyd iteration over 2-D points; returns a cluster index per point.
/// Ties resolve to the lowest cluster index.
fn kmeans(points: &[(f64, f64)], k: usize) -> Vec<usize> {
    let mut centroids = seed_centroids(points, k);
    let mut assignment = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(*point, &centroids);
            if assignment[i] != nearest {
                assignment[i] = nearest;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        let mut sums = vec![(0.0f64, 0.0f64, 0usize); k];
        for (i, point) in points.iter().enumerate() {
            let slot = &mut sums[assignment[i]];
            slot.0 += point.0;
            slot.1 += point.1;
            slot.2 += 1;
        }
        for (cluster, (lat_sum, lon_sum, count)) in sums.into_iter().enumerate() {
            // An emptied cluster keeps its centroid in place.
            if count > 0 {
                centroids[cluster] = (lat_sum / count as f64, lon_sum / count as f64);
            }
        }
    }

    assignment
}

/// Evenly spaced picks from the lexicographically sorted point list.
fn seed_centroids(points: &[(f64, f64)], k: usize) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    (0..k).map(|j| sorted[j * sorted.len() / k]).collect()
}

fn nearest_centroid(point: (f64, f64), centroids: &[(f64, f64)]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let d_lat = point.0 - centroid.0;
        let d_lon = point.1 - centroid.1;
        let dist = d_lat * d_lat + d_lon * d_lon;
        if dist < best_dist {
            best_dist = dist;
            best = index;
        }
    }
    best
}
