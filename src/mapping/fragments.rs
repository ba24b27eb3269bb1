//! Consolidation of the fragments (HSPs) one model produced against a query.
//!
//! Fragments of a single hit are compared pairwise in discovery order. A pair
//! that barely overlaps in both sequence and model space is one of:
//!
//! 1. a circular permutant, when sequence and model order disagree; the
//!    earlier fragment is folded into the later one, which is tagged `CP`
//! 2. one domain split by alignment noise, when the fragments sit closer than
//!    `inter_gap`; the earlier fragment is folded into the later one
//! 3. a candidate non-contiguous domain, when they sit further apart; both are
//!    deferred to a side pool, resolved like any other set of calls, and the
//!    survivors are folded together into one call
//!
//! Pairs overlapping beyond the tolerance, or sharing `frac_overlap` or more
//! of either call's residues or model columns, are left alone as possible
//! repeats or nested hits and are settled by the per-query resolver.

use tracing::debug;

use crate::core::domain::{Domain, DomainError};
use crate::core::domain_map::DomainMap;
use crate::core::types::Topology;
use crate::mapping::engine::MappingConfig;
use crate::mapping::overlap::OverlapTolerance;
use crate::mapping::resolver::eliminate_overlapping;

/// Merge the fragments of one hit, dropping calls above the significance cutoff.
///
/// # Errors
///
/// Returns `DomainError::InvalidMerge` if a fold is attempted across families.
pub fn consolidate_fragments(
    fragments: Vec<Domain>,
    config: &MappingConfig,
) -> Result<Vec<Domain>, DomainError> {
    let mut pool = DomainMap::from(fragments);
    let mut deferred: Vec<usize> = Vec::new();
    let tolerance = config.tolerance();

    for a in 0..pool.len() {
        for b in a + 1..pool.len() {
            let (Some(dom_a), Some(dom_b)) = (pool.get(a), pool.get(b)) else {
                continue;
            };
            if dom_a.family_id != dom_b.family_id || !barely_overlapping(dom_a, dom_b, &tolerance) {
                continue;
            }

            let permuted = is_permuted(dom_a, dom_b);
            let gap = sequence_gap(dom_a, dom_b);

            if permuted || gap < gap_limit(config.inter_gap) {
                fold_into(&mut pool, a, b, permuted, config.inter_gap)?;
                // A deferred `a` now lives on inside `b`
                if let Some(pos) = deferred.iter().position(|&idx| idx == a) {
                    if deferred.contains(&b) {
                        deferred.remove(pos);
                    } else {
                        deferred[pos] = b;
                    }
                }
                // `a` is gone, move on to the next anchor
                break;
            }

            for idx in [a, b] {
                if !deferred.contains(&idx) {
                    deferred.push(idx);
                }
            }
        }
    }

    deferred.retain(|&idx| pool.is_present(idx));
    if !deferred.is_empty() {
        if let Some(folded) = resolve_deferred(&mut pool, &deferred, config)? {
            pool.push(folded);
        }
    }

    let before = pool.present_count();
    let kept: Vec<Domain> = pool
        .into_present()
        .into_iter()
        .filter(|d| !d.is_empty() && d.significance <= config.eval_cutoff)
        .collect();
    if kept.len() < before {
        debug!(
            "Dropped {} merged fragments above the E-value cutoff",
            before - kept.len()
        );
    }
    Ok(kept)
}

/// Shared residues and shared model columns both stay within the tolerance,
/// in absolute terms and as a fraction of either call
fn barely_overlapping(a: &Domain, b: &Domain, tolerance: &OverlapTolerance) -> bool {
    let shared = a.map_intersection(b);
    let shared_model = a.model_intersection(b);

    shared <= tolerance.overlap
        && shared_model <= tolerance.overlap
        && !tolerance.reaches_fraction(shared, a.map_len())
        && !tolerance.reaches_fraction(shared, b.map_len())
        && !tolerance.reaches_fraction(shared_model, a.model_len())
        && !tolerance.reaches_fraction(shared_model, b.model_len())
}

/// Sequence starts and model starts run in opposite directions
fn is_permuted(a: &Domain, b: &Domain) -> bool {
    match (a.first(), b.first(), a.model_start(), b.model_start()) {
        (Some(seq_a), Some(seq_b), Some(mod_a), Some(mod_b)) => {
            (seq_a < seq_b && mod_a > mod_b) || (seq_a > seq_b && mod_a < mod_b)
        }
        _ => false,
    }
}

/// Distance from the end of the upstream call to the start of the downstream one.
///
/// Zero or negative when the spans touch or interleave.
fn sequence_gap(a: &Domain, b: &Domain) -> i64 {
    let (Some(a_first), Some(a_last), Some(b_first), Some(b_last)) =
        (a.first(), a.last(), b.first(), b.last())
    else {
        return 0;
    };
    let (up_last, down_first) = if a_first <= b_first {
        (a_last, b_first)
    } else {
        (b_last, a_first)
    };
    to_i64(down_first) - to_i64(up_last)
}

fn gap_limit(inter_gap: usize) -> i64 {
    to_i64(inter_gap)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Fold slot `a` into slot `b`, tagging `b` as a circular permutant if asked
fn fold_into(
    pool: &mut DomainMap,
    a: usize,
    b: usize,
    permuted: bool,
    inter_gap: usize,
) -> Result<(), DomainError> {
    let Some(dom_a) = pool.take(a) else {
        return Ok(());
    };
    let Some(dom_b) = pool.get_mut(b) else {
        return Ok(());
    };
    if permuted {
        debug!(
            "Circular permutant of {} at residues {:?}..{:?}",
            dom_b.family_id,
            dom_a.first().min(dom_b.first()),
            dom_a.last().max(dom_b.last())
        );
        dom_b.update_topology(Topology::CircularPermutant);
    }
    dom_b.merge(&dom_a, inter_gap)
}

/// Resolve the deferred fragments among themselves and fold the survivors,
/// nearest neighbors first, into a single call
fn resolve_deferred(
    pool: &mut DomainMap,
    deferred: &[usize],
    config: &MappingConfig,
) -> Result<Option<Domain>, DomainError> {
    let mut side: DomainMap = deferred.iter().filter_map(|&idx| pool.take(idx)).collect();
    eliminate_overlapping(&mut side, &config.tolerance());

    let mut survivors = side.into_present();
    survivors.sort_by_key(Domain::first);

    let mut survivors = survivors.into_iter();
    let Some(mut folded) = survivors.next() else {
        return Ok(None);
    };
    for dom in survivors {
        folded.merge(&dom, config.inter_gap)?;
    }
    Ok(Some(folded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MappingConfig {
        MappingConfig {
            intra_gap: 30,
            inter_gap: 20,
            overlap: 15,
            frac_overlap: 0.7,
            eval_cutoff: 1e-5,
        }
    }

    fn frag(range: std::ops::Range<usize>, model: (usize, usize), e: f64) -> Domain {
        Domain::new("e1abcA1", range, model, e)
    }

    #[test]
    fn test_circular_permutant_folds_into_later_fragment() {
        let a = frag(0..30, (50, 80), 1e-8);
        let b = frag(40..70, (0, 30), 1e-9);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();

        assert_eq!(merged.len(), 1);
        let cp = &merged[0];
        assert!(cp.has_topology(Topology::CircularPermutant));
        // Later fragment's model span comes first
        assert_eq!(cp.model_range, vec![(0, 30), (50, 80)]);
        // 11 residue gap is below inter_gap and gets filled
        assert_eq!(cp.map_range, (0..70).collect::<Vec<_>>());
        assert!(cp.significance <= 1e-9);
    }

    #[test]
    fn test_close_fragments_merge_without_tag() {
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(60..110, (50, 100), 1e-8);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();

        assert_eq!(merged.len(), 1);
        assert!(merged[0].topology.is_empty());
        assert_eq!(merged[0].map_range, (0..110).collect::<Vec<_>>());
    }

    #[test]
    fn test_distant_fragments_are_deferred_and_folded() {
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(100..150, (50, 100), 1e-8);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();

        assert_eq!(merged.len(), 1);
        let nc = &merged[0];
        assert!(nc.topology.is_empty());
        assert!(nc.is_non_contiguous());
        assert_eq!(nc.residue_range_string(), "1-50,101-150");
    }

    #[test]
    fn test_deferred_pool_resolves_conflicts_first() {
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(100..150, (50, 100), 1e-8);
        // Conflicts with b in sequence, worse E-value
        let c = frag(110..160, (100, 140), 1e-6);
        let merged = consolidate_fragments(vec![a, b, c], &config()).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].residue_range_string(), "1-50,101-150");
    }

    #[test]
    fn test_repeats_are_left_separate() {
        // Same model region twice: a tandem repeat, not a split domain
        let a = frag(0..100, (0, 100), 1e-8);
        let b = frag(150..250, (0, 100), 1e-7);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_fragments_above_cutoff_are_dropped() {
        let a = frag(0..100, (0, 100), 1e-8);
        let b = frag(150..250, (0, 100), 1e-2);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].first(), Some(0));
    }

    #[test]
    fn test_mixed_families_are_not_merged() {
        let a = frag(0..50, (0, 50), 1e-8);
        let b = Domain::new("e2xyzB1", 60..110, (50, 100), 1e-8);
        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_single_fragment_passes_through() {
        let merged = consolidate_fragments(vec![frag(5..50, (0, 45), 1e-8)], &config()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].first(), Some(5));
    }

    #[test]
    fn test_sequence_gap() {
        let a = frag(0..50, (0, 1), 1.0);
        let b = frag(60..70, (0, 1), 1.0);
        assert_eq!(sequence_gap(&a, &b), 11);
        assert_eq!(sequence_gap(&b, &a), 11);
        let c = frag(45..70, (0, 1), 1.0);
        assert_eq!(sequence_gap(&a, &c), -4);
    }

    #[test]
    fn test_deferred_partner_follows_its_fold() {
        // a is deferred with b, then b folds into its close neighbor c
        let a = frag(0..50, (0, 40), 1e-8);
        let b = frag(100..150, (40, 80), 1e-8);
        let c = frag(155..190, (20, 50), 1e-8);
        let merged = consolidate_fragments(vec![a, b, c], &config()).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].residue_range_string(), "1-50,101-190");
    }

    #[test]
    fn test_nested_fragment_is_not_folded() {
        // Every residue of the short fragment lies inside the long one
        let nested = frag(50..60, (0, 10), 1e-6);
        let host = frag(0..100, (20, 120), 1e-8);
        let merged = consolidate_fragments(vec![nested, host], &config()).unwrap();

        assert_eq!(merged.len(), 2);
        let host = merged.iter().find(|d| d.first() == Some(0)).unwrap();
        assert!(host.topology.is_empty());
        assert!((host.significance - 1e-8).abs() < 1e-20);
        assert_eq!(host.model_range, vec![(20, 120)]);
    }

    #[test]
    fn test_shared_model_fraction_blocks_fold() {
        // Sequence apart, but half of b's model columns repeat a's
        let mut config = config();
        config.frac_overlap = 0.5;
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(55..75, (40, 60), 1e-8);
        assert_eq!(a.model_intersection(&b), 10);

        let merged = consolidate_fragments(vec![a, b], &config).unwrap();
        assert_eq!(merged.len(), 2);

        // Just under the fraction the pair merges
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(55..76, (40, 61), 1e-8);
        let merged = consolidate_fragments(vec![a, b], &config).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_gap_just_below_inter_gap_is_filled() {
        // 18 missing residues: last 49, first 68
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(68..100, (50, 82), 1e-8);
        assert_eq!(sequence_gap(&a, &b), 19);

        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].residue_range_string(), "1-100");
    }

    #[test]
    fn test_gap_equal_to_inter_gap_is_deferred() {
        // 19 missing residues: last 49, first 69
        let a = frag(0..50, (0, 50), 1e-8);
        let b = frag(69..100, (50, 81), 1e-8);
        assert_eq!(sequence_gap(&a, &b), 20);

        let merged = consolidate_fragments(vec![a, b], &config()).unwrap();
        assert_eq!(merged.len(), 1);
        assert!(merged[0].is_non_contiguous());
        assert_eq!(merged[0].residue_range_string(), "1-50,70-100");
    }
}
