//! Pickup sequencing: order a cluster's stops from the depot and back.
//!
//! Builds a driving-time matrix over `[depot] ++ pickups` and solves the
//! tour that starts and ends at the depot. Several construction candidates
//! run and the cheapest closed tour wins; for small clusters the exact
//! answer comes from brute force. Children without coordinates cannot be
//! optimized and are appended to the end of the sequence.

use crate::haversine::HaversineMatrix;
use crate::model::Child;
use crate::ports::TimeMatrixProvider;

/// Clusters at or below this size (including the depot) are solved exactly.
const BRUTE_FORCE_LIMIT: usize = 6;

/// Order a cluster's children for pickup. Infallible: a failed or malformed
/// matrix response falls back to the great-circle estimate.
pub async fn order_pickups(
    children: Vec<Child>,
    depot: (f64, f64),
    provider: &dyn TimeMatrixProvider,
) -> Vec<Child> {
    let (with_coords, without_coords): (Vec<Child>, Vec<Child>) =
        children.into_iter().partition(|c| c.coords().is_some());

    // Nothing to optimize for zero or one positioned child.
    if with_coords.len() <= 1 {
        let mut result = with_coords;
        result.extend(without_coords);
        return result;
    }

    let mut locations = Vec::with_capacity(with_coords.len() + 1);
    locations.push(depot);
    locations.extend(with_coords.iter().map(|c| c.coords().unwrap_or(depot)));

    let matrix = fetch_matrix(provider, &locations).await;
    let tour = best_tour(&matrix);

    // Drop the depot endpoints and map back to children.
    let mut result: Vec<Child> = tour[1..tour.len() - 1]
        .iter()
        .map(|&index| with_coords[index - 1].clone())
        .collect();
    result.extend(without_coords);
    result
}

async fn fetch_matrix(provider: &dyn TimeMatrixProvider, locations: &[(f64, f64)]) -> Vec<Vec<i64>> {
    let n = locations.len();
    match provider.matrix(locations).await {
        Ok(matrix) if matrix.len() == n && matrix.iter().all(|row| row.len() == n) => matrix,
        Ok(_) => {
            log::warn!("time matrix has wrong shape; falling back to great-circle estimate");
            HaversineMatrix::default().estimate(locations)
        }
        Err(e) => {
            log::warn!("time matrix provider failed ({e}); falling back to great-circle estimate");
            HaversineMatrix::default().estimate(locations)
        }
    }
}

/// Run every candidate construction and keep the cheapest closed tour.
/// Ties go to the first candidate generated.
fn best_tour(matrix: &[Vec<i64>]) -> Vec<usize> {
    let n = matrix.len();

    let mut candidates = vec![nearest_neighbor_tour(matrix), greedy_tour(matrix)];
    if n <= BRUTE_FORCE_LIMIT {
        candidates.extend(all_tours(n));
    }

    let mut best = candidates[0].clone();
    let mut best_cost = tour_cost(&best, matrix);
    for tour in candidates.into_iter().skip(1) {
        let cost = tour_cost(&tour, matrix);
        if cost < best_cost {
            best_cost = cost;
            best = tour;
        }
    }
    best
}

fn tour_cost(tour: &[usize], matrix: &[Vec<i64>]) -> i64 {
    tour.windows(2).map(|leg| matrix[leg[0]][leg[1]]).sum()
}

/// Depot-rooted nearest-neighbor construction.
fn nearest_neighbor_tour(matrix: &[Vec<i64>]) -> Vec<usize> {
    let n = matrix.len();
    let mut tour = Vec::with_capacity(n + 1);
    let mut visited = vec![false; n];

    let mut current = 0usize;
    visited[0] = true;
    tour.push(0);

    for _ in 1..n {
        let mut next = None;
        let mut next_time = i64::MAX;
        for candidate in 1..n {
            if !visited[candidate] && matrix[current][candidate] < next_time {
                next_time = matrix[current][candidate];
                next = Some(candidate);
            }
        }
        // n >= 2 and one unvisited node always remains inside this loop.
        if let Some(next) = next {
            visited[next] = true;
            tour.push(next);
            current = next;
        }
    }

    tour.push(0);
    tour
}

/// Second construction seed. In this formulation it coincides with
/// nearest-neighbor; kept separate so the constructions can diverge.
fn greedy_tour(matrix: &[Vec<i64>]) -> Vec<usize> {
    nearest_neighbor_tour(matrix)
}

/// Every depot-rooted closed tour over nodes 1..n.
fn all_tours(n: usize) -> Vec<Vec<usize>> {
    let nodes: Vec<usize> = (1..n).collect();
    let mut tours = Vec::new();
    permute(&mut nodes.clone(), 0, &mut |perm| {
        let mut tour = Vec::with_capacity(n + 1);
        tour.push(0);
        tour.extend_from_slice(perm);
        tour.push(0);
        tours.push(tour);
    });
    tours
}

fn permute(nodes: &mut Vec<usize>, start: usize, emit: &mut impl FnMut(&[usize])) {
    if start == nodes.len() {
        emit(nodes);
        return;
    }
    for i in start..nodes.len() {
        nodes.swap(start, i);
        permute(nodes, start + 1, emit);
        nodes.swap(start, i);
    }
}
