use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::fragment::AlignmentFragment;
use crate::core::types::Topology;
use crate::mapping::scoring::combine_significance;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Cannot merge domains of different families: '{left}' and '{right}'")]
    InvalidMerge { left: String, right: String },
}

/// A candidate domain call on one query sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Sorted, unique 0-based query residues claimed by this call
    pub map_range: Vec<usize>,

    /// Half-open model spans, concatenated in merge order
    pub model_range: Vec<(usize, usize)>,

    /// Small-is-better E-value
    pub significance: f64,

    /// Matched family (ECOD F-group)
    pub family_id: String,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub topology: BTreeSet<Topology>,
}

impl Domain {
    pub fn new(
        family_id: impl Into<String>,
        map_range: impl IntoIterator<Item = usize>,
        model_range: (usize, usize),
        significance: f64,
    ) -> Self {
        let mut map_range: Vec<usize> = map_range.into_iter().collect();
        map_range.sort_unstable();
        map_range.dedup();

        Self {
            map_range,
            model_range: vec![model_range],
            significance,
            family_id: family_id.into(),
            topology: BTreeSet::new(),
        }
    }

    /// Build a call from one alignment fragment, carving out long model inserts
    pub fn from_fragment(fragment: &AlignmentFragment, intra_gap: usize) -> Self {
        let gapped: BTreeSet<usize> = fragment.insert_positions(intra_gap).into_iter().collect();
        let (start, end) = fragment.query_range;

        Self::new(
            fragment.family_id.clone(),
            (start..end).filter(|i| !gapped.contains(i)),
            fragment.model_range,
            fragment.significance,
        )
    }

    pub fn map_len(&self) -> usize {
        self.map_range.len()
    }

    pub fn model_len(&self) -> usize {
        self.model_range
            .iter()
            .map(|&(s, e)| e.saturating_sub(s))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.map_range.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.map_range.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.map_range.last().copied()
    }

    /// Start of the first model span
    pub fn model_start(&self) -> Option<usize> {
        self.model_range.first().map(|&(s, _)| s)
    }

    /// Number of residues shared with `other`
    pub fn map_intersection(&self, other: &Domain) -> usize {
        sorted_intersection_len(&self.map_range, &other.map_range)
    }

    /// Number of residues shared with a slice of `other`, indexed by position in its range
    pub fn map_intersection_window(&self, other: &Domain, window: Range<usize>) -> usize {
        let end = window.end.min(other.map_range.len());
        let start = window.start.min(end);
        sorted_intersection_len(&self.map_range, &other.map_range[start..end])
    }

    /// Number of model columns covered by both calls
    pub fn model_intersection(&self, other: &Domain) -> usize {
        let a = merged_spans(&self.model_range);
        let b = merged_spans(&other.model_range);

        let (mut i, mut j, mut shared) = (0, 0, 0);
        while i < a.len() && j < b.len() {
            let lo = a[i].0.max(b[j].0);
            let hi = a[i].1.min(b[j].1);
            if hi > lo {
                shared += hi - lo;
            }
            if a[i].1 < b[j].1 {
                i += 1;
            } else {
                j += 1;
            }
        }
        shared
    }

    pub fn update_topology(&mut self, tag: Topology) {
        self.topology.insert(tag);
    }

    pub fn has_topology(&self, tag: Topology) -> bool {
        self.topology.contains(&tag)
    }

    /// Fold `other` into this call.
    ///
    /// Disjoint calls closer than `inter_gap` have the residues between them
    /// filled in; any other pair keeps exactly the union of both ranges.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMerge` if the families differ.
    pub fn merge(&mut self, other: &Domain, inter_gap: usize) -> Result<(), DomainError> {
        if self.family_id != other.family_id {
            return Err(DomainError::InvalidMerge {
                left: self.family_id.clone(),
                right: other.family_id.clone(),
            });
        }

        let mut filler = Vec::new();
        if let (Some(a_first), Some(a_last), Some(b_first), Some(b_last)) =
            (self.first(), self.last(), other.first(), other.last())
        {
            let gap = if a_last < b_first {
                Some(a_last..b_first)
            } else if b_last < a_first {
                Some(b_last..a_first)
            } else {
                None
            };
            if let Some(gap) = gap {
                if gap.end - gap.start < inter_gap {
                    filler.extend(gap.start + 1..gap.end);
                }
            }
        }

        self.map_range.extend_from_slice(&other.map_range);
        self.map_range.extend(filler);
        self.map_range.sort_unstable();
        self.map_range.dedup();

        self.model_range.extend_from_slice(&other.model_range);
        self.significance = combine_significance(self.significance, other.significance);
        self.topology.extend(other.topology.iter().copied());

        Ok(())
    }

    /// Residues between the first and last claimed residue that are not claimed
    pub fn internal_gap(&self) -> Vec<usize> {
        let mut gap = Vec::new();
        for pair in self.map_range.windows(2) {
            gap.extend(pair[0] + 1..pair[1]);
        }
        gap
    }

    pub fn is_non_contiguous(&self) -> bool {
        self.map_range.windows(2).any(|w| w[1] != w[0] + 1)
    }

    /// Maximal runs of consecutive residues as inclusive (start, end) pairs
    pub fn residue_runs(&self) -> Vec<(usize, usize)> {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for &pos in &self.map_range {
            match runs.last_mut() {
                Some(run) if run.1 + 1 == pos => run.1 = pos,
                _ => runs.push((pos, pos)),
            }
        }
        runs
    }

    /// 1-based residue ranges, e.g. `5-124,200-250`
    pub fn residue_range_string(&self) -> String {
        self.residue_runs()
            .iter()
            .map(|(s, e)| format!("{}-{}", s + 1, e + 1))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Intersection size of two ascending, duplicate-free slices
fn sorted_intersection_len(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    shared
}

/// Sort half-open spans and coalesce the overlapping ones
fn merged_spans(spans: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut sorted: Vec<(usize, usize)> = spans.iter().copied().filter(|(s, e)| e > s).collect();
    sorted.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(sorted.len());
    for (s, e) in sorted {
        match merged.last_mut() {
            Some(last) if s <= last.1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    merged
}
