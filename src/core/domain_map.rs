use crate::core::domain::Domain;
use crate::mapping::overlap::{OverlapMatrix, OverlapTolerance};

/// Candidate domain calls for one query, addressed by stable slot index.
///
/// Eliminated or folded calls leave an empty slot behind; slots are never
/// compacted, so indices stay valid for the lifetime of the map.
#[derive(Debug, Clone, Default)]
pub struct DomainMap {
    slots: Vec<Option<Domain>>,
    matrix: Option<OverlapMatrix>,
}

impl DomainMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call and return its slot index
    pub fn push(&mut self, domain: Domain) -> usize {
        self.matrix = None;
        self.slots.push(Some(domain));
        self.slots.len() - 1
    }

    /// Number of slots, present or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_present(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Some(_)))
    }

    pub fn get(&self, idx: usize) -> Option<&Domain> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Mutable access to a present call; any cached overlap matrix is dropped
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Domain> {
        self.matrix = None;
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Mark a slot absent, returning what it held; any cached overlap matrix is dropped
    pub fn take(&mut self, idx: usize) -> Option<Domain> {
        let taken = self.slots.get_mut(idx).and_then(Option::take);
        if taken.is_some() {
            self.matrix = None;
        }
        taken
    }

    /// Present calls with their slot indices, in slot order
    pub fn iter_present(&self) -> impl Iterator<Item = (usize, &Domain)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|d| (i, d)))
    }

    /// Consume the map, keeping present calls in slot order
    pub fn into_present(self) -> Vec<Domain> {
        self.slots.into_iter().flatten().collect()
    }

    /// Conflict matrix over all slots, computed on first use.
    ///
    /// The cache is not keyed on `tolerance`; a map is resolved under one tolerance.
    pub fn overlap_matrix(&mut self, tolerance: &OverlapTolerance) -> &OverlapMatrix {
        let slots = &self.slots;
        self.matrix
            .get_or_insert_with(|| OverlapMatrix::compute(slots, tolerance))
    }
}

impl From<Vec<Domain>> for DomainMap {
    fn from(domains: Vec<Domain>) -> Self {
        Self {
            slots: domains.into_iter().map(Some).collect(),
            matrix: None,
        }
    }
}

impl FromIterator<Domain> for DomainMap {
    fn from_iter<I: IntoIterator<Item = Domain>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
