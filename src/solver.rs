//! Route optimizer for a single day's stops.
//!
//! Two greedy heuristics, both O(n²) per day:
//! - no anchors: nearest neighbour starting from the first stop;
//! - with anchors: locked stops keep their relative order and every unlocked
//!   stop is inserted, in input order, at the position with the smallest
//!   detour.
//!
//! Neither is an exact TSP solution.

use tracing::debug;

use crate::model::{Activity, Coordinate};
use crate::traits::DistanceMatrixProvider;

/// Costs closer than this are treated as ties.
const COST_EPSILON_KM: f64 = 1e-9;

/// Compute a visiting order over indices into `anchored`.
///
/// `matrix[i][j]` is the distance from stop `i` to stop `j`. Returns a
/// permutation of `0..anchored.len()`.
pub fn optimize_order(anchored: &[bool], matrix: &[Vec<f64>]) -> Vec<usize> {
    let n = anchored.len();
    let unlocked: Vec<usize> = (0..n).filter(|&i| !anchored[i]).collect();

    if unlocked.len() <= 1 {
        return (0..n).collect();
    }

    if unlocked.len() == n {
        nearest_neighbor(n, matrix)
    } else {
        anchored_insertion(anchored, &unlocked, matrix)
    }
}

/// Reorder a day's activities. `is_anchor` decides which ones stay pinned.
pub fn optimize_day<M, F>(activities: Vec<Activity>, is_anchor: F, matrix_provider: &M) -> Vec<Activity>
where
    M: DistanceMatrixProvider + ?Sized,
    F: Fn(&Activity) -> bool,
{
    if activities.len() < 2 {
        return activities;
    }

    let anchored: Vec<bool> = activities.iter().map(&is_anchor).collect();
    let locations: Vec<Coordinate> = activities.iter().map(Activity::coordinate).collect();
    let matrix = matrix_provider.matrix_for(&locations);
    if matrix.len() != activities.len() {
        debug!(
            expected = activities.len(),
            got = matrix.len(),
            "distance matrix has wrong shape; keeping original order"
        );
        return activities;
    }

    let order = optimize_order(&anchored, &matrix);
    let identity: Vec<usize> = (0..activities.len()).collect();
    debug!(
        stops = activities.len(),
        anchors = anchored.iter().filter(|a| **a).count(),
        before_km = route_distance_km(&identity, &matrix),
        after_km = route_distance_km(&order, &matrix),
        "optimized day route"
    );

    let mut slots: Vec<Option<Activity>> = activities.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

/// Total leg distance when visiting stops in `order`.
pub fn route_distance_km(order: &[usize], matrix: &[Vec<f64>]) -> f64 {
    order.windows(2).map(|leg| matrix[leg[0]][leg[1]]).sum()
}

fn nearest_neighbor(n: usize, matrix: &[Vec<f64>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(n);
    let mut remaining: Vec<usize> = (1..n).collect();
    let mut current = 0;
    order.push(current);

    while !remaining.is_empty() {
        // Strict comparison keeps the earliest input index on ties.
        let mut best = 0;
        for (slot, &candidate) in remaining.iter().enumerate().skip(1) {
            if matrix[current][candidate] < matrix[current][remaining[best]] - COST_EPSILON_KM {
                best = slot;
            }
        }
        current = remaining.remove(best);
        order.push(current);
    }

    order
}

fn anchored_insertion(anchored: &[bool], unlocked: &[usize], matrix: &[Vec<f64>]) -> Vec<usize> {
    let mut route: Vec<usize> = (0..anchored.len()).filter(|&i| anchored[i]).collect();

    for &candidate in unlocked {
        // On ties, prefer the slot that keeps the stop where it sat in the input.
        let natural = route
            .iter()
            .rposition(|&placed| placed < candidate)
            .map_or(0, |p| p + 1);

        let mut best_position = natural;
        let mut best_cost = insertion_cost(&route, natural, candidate, matrix);

        for position in 0..=route.len() {
            let cost = insertion_cost(&route, position, candidate, matrix);
            if cost < best_cost - COST_EPSILON_KM {
                best_cost = cost;
                best_position = position;
            }
        }

        route.insert(best_position, candidate);
    }

    route
}

/// Added distance from placing `candidate` before `route[position]`.
fn insertion_cost(route: &[usize], position: usize, candidate: usize, matrix: &[Vec<f64>]) -> f64 {
    let predecessor = position.checked_sub(1).map(|p| route[p]);
    let successor = route.get(position).copied();

    match (predecessor, successor) {
        (Some(p), Some(s)) => matrix[p][candidate] + matrix[candidate][s] - matrix[p][s],
        (Some(p), None) => matrix[p][candidate],
        (None, Some(s)) => matrix[candidate][s],
        (None, None) => 0.0,
    }
}
