//! Recursive elimination of conflicting calls.
//!
//! Each row of the overlap matrix is visited in slot order. From the visited
//! call, the walk moves to whichever present neighbor has the best
//! significance until it reaches a call that beats its whole neighborhood;
//! that call then eliminates every present neighbor. Ties favor the call the
//! walk is standing on, so each step strictly improves the significance and
//! the walk always terminates.

use tracing::debug;

use crate::core::domain_map::DomainMap;
use crate::mapping::overlap::{OverlapMatrix, OverlapTolerance};

/// Eliminate conflicting calls in place, returning how many were removed.
///
/// Afterwards no two present calls conflict in the overlap matrix.
pub fn eliminate_overlapping(map: &mut DomainMap, tolerance: &OverlapTolerance) -> usize {
    let matrix = map.overlap_matrix(tolerance).clone();
    let mut eliminated = 0;

    for row in 0..matrix.len() {
        eliminated += eliminate_from(map, &matrix, row);
    }

    if eliminated > 0 {
        debug!(
            "Eliminated {} of {} candidate domains ({} conflicting pairs)",
            eliminated,
            map.len(),
            matrix.edge_count()
        );
    }
    eliminated
}

fn eliminate_from(map: &mut DomainMap, matrix: &OverlapMatrix, start: usize) -> usize {
    let mut current = start;

    loop {
        let Some(here) = map.get(current) else {
            return 0;
        };

        let mut best = current;
        let mut best_significance = here.significance;
        let mut neighborhood = Vec::new();
        for j in matrix.neighbors(current) {
            let Some(other) = map.get(j) else { continue };
            neighborhood.push(j);
            if other.significance.total_cmp(&best_significance).is_lt() {
                best = j;
                best_significance = other.significance;
            }
        }

        if best == current {
            return neighborhood
                .into_iter()
                .filter(|&j| map.take(j).is_some())
                .count();
        }
        current = best;
    }
}
