use serde::{Deserialize, Serialize};

/// Qualitative topology tag attached to a domain call
///
/// The declaration order is the order tags are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Topology {
    /// Sequence positions contain at least one internal break
    #[serde(rename = "NC")]
    NonContiguous,
    /// Two fragments of one family matched in reversed sequence/model order
    #[serde(rename = "CP")]
    CircularPermutant,
    /// Nested inside the internal gap of another call
    #[serde(rename = "IS")]
    Insertional,
}

impl Topology {
    /// Short code used in reports
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NonContiguous => "NC",
            Self::CircularPermutant => "CP",
            Self::Insertional => "IS",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Per-topology counts of final domain calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCounts {
    pub total: usize,
    pub non_contiguous: usize,
    pub circular_permutant: usize,
    pub insertional: usize,
}

impl DomainCounts {
    /// Count one call carrying the given tags
    pub fn record<'a>(&mut self, tags: impl IntoIterator<Item = &'a Topology>) {
        self.total += 1;
        for tag in tags {
            match tag {
                Topology::NonContiguous => self.non_contiguous += 1,
                Topology::CircularPermutant => self.circular_permutant += 1,
                Topology::Insertional => self.insertional += 1,
            }
        }
    }

    /// Fraction of all calls, or 0.0 when there are none
    #[must_use]
    pub fn fraction(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            count as f64 / self.total as f64
        }
    }
}

impl std::ops::AddAssign for DomainCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.non_contiguous += rhs.non_contiguous;
        self.circular_permutant += rhs.circular_permutant;
        self.insertional += rhs.insertional;
    }
}

impl std::iter::Sum for DomainCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}
