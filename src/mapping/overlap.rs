//! Pairwise conflict detection between candidate calls.

use serde::{Deserialize, Serialize};

use crate::core::domain::Domain;
use crate::mapping::scoring::count_to_f64;

/// Residue and fractional overlap allowed between two calls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapTolerance {
    /// Shared residues tolerated before two calls conflict
    pub overlap: usize,
    /// Shared fraction of either call's length that forces a conflict
    pub frac_overlap: f64,
}

impl OverlapTolerance {
    pub fn new(overlap: usize, frac_overlap: f64) -> Self {
        Self {
            overlap,
            frac_overlap,
        }
    }

    /// Whether calls `a` and `b` conflict
    pub fn conflicts(&self, a: &Domain, b: &Domain) -> bool {
        let shared = a.map_intersection(b);

        if shared > self.overlap {
            // Feathering: a short overlap spread over both halves of `b` is
            // edge slop from imprecise alignment ends, not a real clash
            let feathered = shared <= 2 * self.overlap && a.map_len() >= 2 * self.overlap;
            if !feathered {
                return true;
            }
            let mid = b.map_len() / 2;
            if a.map_intersection_window(b, 0..mid) >= self.overlap
                || a.map_intersection_window(b, mid..b.map_len()) >= self.overlap
            {
                return true;
            }
        }

        self.exceeds_fraction(shared, a.map_len()) || self.exceeds_fraction(shared, b.map_len())
    }

    /// Shared fraction strictly above `frac_overlap`; the conflict rule
    pub(crate) fn exceeds_fraction(&self, shared: usize, len: usize) -> bool {
        shared_fraction(shared, len).is_some_and(|f| f > self.frac_overlap)
    }

    /// Shared fraction at or above `frac_overlap`; blocks fragment merging
    pub(crate) fn reaches_fraction(&self, shared: usize, len: usize) -> bool {
        shared_fraction(shared, len).is_some_and(|f| f >= self.frac_overlap)
    }
}

fn shared_fraction(shared: usize, len: usize) -> Option<f64> {
    (len > 0).then(|| count_to_f64(shared) / count_to_f64(len))
}

/// Symmetric conflict matrix over the slots of a `DomainMap`; the diagonal is always false
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapMatrix {
    n: usize,
    cells: Vec<bool>,
}

impl OverlapMatrix {
    /// Evaluate every unordered pair of present slots
    pub fn compute(slots: &[Option<Domain>], tolerance: &OverlapTolerance) -> Self {
        let n = slots.len();
        let mut matrix = Self {
            n,
            cells: vec![false; n * n],
        };

        for (a, dom_a) in slots.iter().enumerate() {
            let Some(dom_a) = dom_a else { continue };
            for (b, dom_b) in slots.iter().enumerate().skip(a + 1) {
                let Some(dom_b) = dom_b else { continue };
                if tolerance.conflicts(dom_a, dom_b) {
                    matrix.set(a, b);
                }
            }
        }

        matrix
    }

    fn set(&mut self, a: usize, b: usize) {
        self.cells[a * self.n + b] = true;
        self.cells[b * self.n + a] = true;
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        a < self.n && b < self.n && self.cells[a * self.n + b]
    }

    /// Slots in direct conflict with `idx`
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let row = if idx < self.n {
            &self.cells[idx * self.n..(idx + 1) * self.n]
        } else {
            &[][..]
        };
        row.iter()
            .enumerate()
            .filter_map(|(j, &hit)| hit.then_some(j))
    }

    /// Number of conflicting unordered pairs
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count() / 2
    }
}
