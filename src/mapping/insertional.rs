//! Detection of calls nested inside the internal gap of another call.

use std::collections::HashSet;

use crate::core::domain::Domain;
use crate::core::types::Topology;

/// Tag every call that sits inside another call's internal gap as `IS`.
///
/// A call counts as nested when more than `map_len - overlap` of its residues
/// fall in the host's gap; calls no longer than `overlap` are never tagged.
/// Returns the number of calls newly tagged.
pub fn label_insertional(domains: &mut [Domain], overlap: usize) -> usize {
    if domains.len() < 2 {
        return 0;
    }

    let gaps: Vec<HashSet<usize>> = domains
        .iter()
        .map(|d| d.internal_gap().into_iter().collect())
        .collect();

    let mut tagged = 0;
    for (a, gap) in gaps.iter().enumerate() {
        if gap.is_empty() {
            continue;
        }
        for (b, guest) in domains.iter_mut().enumerate() {
            if a == b {
                continue;
            }
            let Some(threshold) = guest.map_len().checked_sub(overlap).filter(|&t| t > 0) else {
                continue;
            };
            let inside = guest.map_range.iter().filter(|r| gap.contains(r)).count();
            if inside > threshold && !guest.has_topology(Topology::Insertional) {
                guest.update_topology(Topology::Insertional);
                tagged += 1;
            }
        }
    }
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> Domain {
        Domain::new("host", (0..10).chain(40..50), (0, 20), 1e-10)
    }

    #[test]
    fn test_short_guest_is_not_tagged() {
        // 8 residues inside a gap, but 8 - 15 is not positive
        let mut domains = vec![
            Domain::new("host", (0..10).chain(20..30), (0, 20), 1e-10),
            Domain::new("guest", 11..19, (0, 8), 1e-10),
        ];
        assert_eq!(label_insertional(&mut domains, 15), 0);
        assert!(domains[1].topology.is_empty());
    }

    #[test]
    fn test_nested_guest_is_tagged() {
        // 20 residues in a 30 residue gap; 20 > 20 - 15
        let mut domains = vec![host(), Domain::new("guest", 12..32, (0, 20), 1e-10)];
        assert_eq!(label_insertional(&mut domains, 15), 1);
        assert!(domains[1].has_topology(Topology::Insertional));
        assert!(!domains[0].has_topology(Topology::Insertional));
    }

    #[test]
    fn test_guest_mostly_outside_gap_is_not_tagged() {
        let mut domains = vec![host(), Domain::new("guest", 30..70, (0, 40), 1e-10)];
        assert_eq!(label_insertional(&mut domains, 15), 0);
    }

    #[test]
    fn test_guest_tagged_once_for_many_hosts() {
        let mut domains = vec![
            host(),
            Domain::new("host2", (5..12).chain(38..60), (0, 20), 1e-10),
            Domain::new("guest", 12..32, (0, 20), 1e-10),
        ];
        assert_eq!(label_insertional(&mut domains, 15), 1);
        assert_eq!(domains[2].topology.len(), 1);
    }

    #[test]
    fn test_single_call_is_ignored() {
        let mut domains = vec![host()];
        assert_eq!(label_insertional(&mut domains, 0), 0);
    }
}
