use serde::{Deserialize, Serialize};

/// One high-scoring pair (HSP) between a query sequence and a profile model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentFragment {
    /// Query residues covered, half-open and 0-based
    pub query_range: (usize, usize),

    /// Model columns covered, half-open and 0-based
    pub model_range: (usize, usize),

    /// Conditional E-value of this fragment
    pub significance: f64,

    /// Name of the matched model (the ECOD F-group)
    pub family_id: String,

    /// Aligned model row; insert columns are `.`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_aln: String,

    /// Aligned query row; deletion columns are `-`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query_aln: String,
}

impl AlignmentFragment {
    pub fn new(
        family_id: impl Into<String>,
        query_range: (usize, usize),
        model_range: (usize, usize),
        significance: f64,
    ) -> Self {
        Self {
            query_range,
            model_range,
            significance,
            family_id: family_id.into(),
            model_aln: String::new(),
            query_aln: String::new(),
        }
    }

    /// Attach the aligned model and query rows
    #[must_use]
    pub fn with_alignment(mut self, model_aln: impl Into<String>, query_aln: impl Into<String>) -> Self {
        self.model_aln = model_aln.into();
        self.query_aln = query_aln.into();
        self
    }

    pub fn query_len(&self) -> usize {
        self.query_range.1.saturating_sub(self.query_range.0)
    }

    pub fn model_len(&self) -> usize {
        self.model_range.1.saturating_sub(self.model_range.0)
    }

    /// Query positions lying under model insert runs of at least `intra_gap` columns.
    ///
    /// Nothing is reported unless the query span exceeds the model span by
    /// `intra_gap` or more; shorter inserts never fragment a domain.
    pub fn insert_positions(&self, intra_gap: usize) -> Vec<usize> {
        let mut gapped = Vec::new();
        if self.query_len() < self.model_len() + intra_gap {
            return gapped;
        }

        let model = self.model_aln.as_bytes();
        let query = self.query_aln.as_bytes();
        let mut col = 0;
        while col < model.len() {
            if model[col] != b'.' {
                col += 1;
                continue;
            }
            let run_start = col;
            while col < model.len() && model[col] == b'.' {
                col += 1;
            }
            let run_len = col - run_start;
            if run_len < intra_gap.max(1) {
                continue;
            }
            let deletions = query[..run_start.min(query.len())]
                .iter()
                .filter(|&&c| c == b'-')
                .count();
            let first = (self.query_range.0 + run_start).saturating_sub(deletions);
            gapped.extend(first..first + run_len);
        }
        gapped
    }
}

/// All fragments one model produced against a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub model: String,
    pub fragments: Vec<AlignmentFragment>,
}

impl Hit {
    pub fn new(model: impl Into<String>, fragments: Vec<AlignmentFragment>) -> Self {
        Self {
            model: model.into(),
            fragments,
        }
    }
}

/// Everything reported for one query sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub accession: String,
    pub hits: Vec<Hit>,
}

impl QueryResult {
    pub fn new(accession: impl Into<String>, hits: Vec<Hit>) -> Self {
        Self {
            accession: accession.into(),
            hits,
        }
    }

    pub fn fragment_count(&self) -> usize {
        self.hits.iter().map(|h| h.fragments.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_positions_excised() {
        // 10 model columns, then 5 inserts, then 5 model columns
        let frag = AlignmentFragment::new("f", (100, 120), (0, 15), 1e-10)
            .with_alignment("abcdefghij.....klmno", "ABCDEFGHIJKLMNOPQRST");
        assert_eq!(frag.insert_positions(5), vec![110, 111, 112, 113, 114]);
    }

    #[test]
    fn test_insert_positions_short_run_tolerated() {
        let frag = AlignmentFragment::new("f", (100, 120), (0, 15), 1e-10)
            .with_alignment("abcdefghij.....klmno", "ABCDEFGHIJKLMNOPQRST");
        assert!(frag.insert_positions(6).is_empty());
    }

    #[test]
    fn test_insert_positions_shift_by_deletions() {
        // Two query deletions before the insert run shift it left
        let frag = AlignmentFragment::new("f", (0, 10), (0, 6), 1e-10)
            .with_alignment("abcd......ef", "AB--CDEFGHIJ");
        assert_eq!(frag.insert_positions(4), vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_insert_positions_length_mismatch_guard() {
        // Query span barely exceeds model span, so the run is left alone
        let frag = AlignmentFragment::new("f", (0, 12), (0, 10), 1e-10)
            .with_alignment("abcd......ef", "ABCDEFGHIJKL");
        assert!(frag.insert_positions(6).is_empty());
    }

    #[test]
    fn test_query_result_fragment_count() {
        let q = QueryResult::new(
            "sp|P1",
            vec![
                Hit::new("a", vec![AlignmentFragment::new("a", (0, 5), (0, 5), 1.0)]),
                Hit::new(
                    "b",
                    vec![
                        AlignmentFragment::new("b", (0, 5), (0, 5), 1.0),
                        AlignmentFragment::new("b", (6, 9), (0, 3), 1.0),
                    ],
                ),
            ],
        );
        assert_eq!(q.fragment_count(), 3);
    }
}
