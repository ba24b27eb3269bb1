use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::store::{Classification, DomainDefinitions, NOT_AVAILABLE};
use crate::core::domain::{Domain, DomainError};
use crate::core::domain_map::DomainMap;
use crate::core::fragment::QueryResult;
use crate::core::types::{DomainCounts, Topology};
use crate::mapping::fragments::consolidate_fragments;
use crate::mapping::insertional::label_insertional;
use crate::mapping::overlap::OverlapTolerance;
use crate::mapping::resolver::eliminate_overlapping;
use crate::mapping::scoring::format_significance;
use crate::utils::validation::{
    validate_cutoff, validate_fraction, validate_non_negative, ConfigError,
};

/// Default minimum model-insert run carved out of a fragment
pub const DEFAULT_INTRA_GAP: usize = 30;
/// Default gap below which split fragments are joined into one contiguous call
pub const DEFAULT_INTER_GAP: usize = 30;
/// Default residue overlap tolerated between calls
pub const DEFAULT_OVERLAP: usize = 40;
/// Default fractional overlap that forces a conflict
pub const DEFAULT_FRAC_OVERLAP: f64 = 0.7;
/// Default E-value cutoff
pub const DEFAULT_EVAL_CUTOFF: f64 = 1e-5;

/// Tolerances and cutoffs for domain mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Model-insert runs at least this long are excised from a fragment
    pub intra_gap: usize,
    /// Fragments closer than this are joined into one contiguous call
    pub inter_gap: usize,
    /// Residues two calls may share without conflicting
    pub overlap: usize,
    /// Shared fraction of either call that forces a conflict
    pub frac_overlap: f64,
    /// Calls with a larger E-value are dropped
    pub eval_cutoff: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            intra_gap: DEFAULT_INTRA_GAP,
            inter_gap: DEFAULT_INTER_GAP,
            overlap: DEFAULT_OVERLAP,
            frac_overlap: DEFAULT_FRAC_OVERLAP,
            eval_cutoff: DEFAULT_EVAL_CUTOFF,
        }
    }
}

impl MappingConfig {
    /// Validate user-supplied values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any tolerance or the cutoff is negative or not
    /// finite, or if the fractional overlap lies outside `[0, 1]`.
    pub fn from_raw(
        intra_gap: i64,
        inter_gap: i64,
        overlap: i64,
        frac_overlap: f64,
        eval_cutoff: f64,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            intra_gap: validate_non_negative("intra_gap", intra_gap)?,
            inter_gap: validate_non_negative("inter_gap", inter_gap)?,
            overlap: validate_non_negative("overlap", overlap)?,
            frac_overlap: validate_fraction("frac_overlap", frac_overlap)?,
            eval_cutoff: validate_cutoff("eval_cutoff", eval_cutoff)?,
        })
    }

    pub fn tolerance(&self) -> OverlapTolerance {
        OverlapTolerance::new(self.overlap, self.frac_overlap)
    }
}

/// A final domain call, decorated for output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedDomain {
    pub accession: String,
    pub significance: f64,
    /// 1-based residue ranges, e.g. `5-124,200-250`
    pub residue_range: String,
    pub topology: Vec<Topology>,
    pub architecture: String,
    pub x_group: String,
    pub t_group: String,
    pub f_group: String,
    pub f_id: String,
}

impl MappedDomain {
    pub fn new(accession: &str, domain: &Domain, definitions: &DomainDefinitions) -> Self {
        let class = definitions.get(&domain.family_id);
        let field = |pick: fn(&Classification) -> &str| {
            class.map_or(NOT_AVAILABLE, pick).to_string()
        };

        Self {
            accession: accession.to_string(),
            significance: domain.significance,
            residue_range: domain.residue_range_string(),
            topology: domain.topology.iter().copied().collect(),
            architecture: field(|c| c.architecture.as_str()),
            x_group: field(|c| c.x_group.as_str()),
            t_group: field(|c| c.t_group.as_str()),
            f_group: domain.family_id.clone(),
            f_id: field(|c| c.f_id.as_str()),
        }
    }

    /// Space-separated topology codes
    pub fn topology_string(&self) -> String {
        self.topology
            .iter()
            .map(|t| t.code())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Tab-separated report row
    pub fn to_tsv_row(&self) -> String {
        [
            self.accession.as_str(),
            &format_significance(self.significance),
            &self.residue_range,
            &self.topology_string(),
            &self.architecture,
            &self.x_group,
            &self.t_group,
            &self.f_group,
            &self.f_id,
        ]
        .join("\t")
    }
}

/// Column names of a report row
pub const REPORT_COLUMNS: [&str; 9] = [
    "Accession",
    "E-Value",
    "Residue Range",
    "Property",
    "Architecture",
    "X-group",
    "T-group",
    "F-group",
    "F-id",
];

/// Final calls for one query sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMapping {
    pub accession: String,
    pub domains: Vec<MappedDomain>,
    pub counts: DomainCounts,
}

/// Totals over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub proteins: usize,
    pub counts: DomainCounts,
}

impl RunSummary {
    pub fn from_mappings(mappings: &[QueryMapping]) -> Self {
        Self {
            proteins: mappings.len(),
            counts: mappings.iter().map(|m| m.counts).sum(),
        }
    }
}

/// Turns the hits of each query into a final, non-conflicting set of calls
pub struct DomainMapper<'a> {
    definitions: &'a DomainDefinitions,
    config: MappingConfig,
}

impl<'a> DomainMapper<'a> {
    pub fn new(definitions: &'a DomainDefinitions, config: MappingConfig) -> Self {
        Self {
            definitions,
            config,
        }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// Resolve the calls of one query sequence
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMerge` if a hit mixes fragments of different families.
    pub fn map_query(&self, query: &QueryResult) -> Result<QueryMapping, DomainError> {
        let domains = self.resolve(query)?;

        let mut counts = DomainCounts::default();
        let records: Vec<MappedDomain> = domains
            .iter()
            .map(|d| {
                counts.record(&d.topology);
                MappedDomain::new(&query.accession, d, self.definitions)
            })
            .collect();

        debug!(
            "{}: {} fragments -> {} domains",
            query.accession,
            query.fragment_count(),
            records.len()
        );

        Ok(QueryMapping {
            accession: query.accession.clone(),
            domains: records,
            counts,
        })
    }

    /// Resolve every query in parallel, keeping input order
    ///
    /// # Errors
    ///
    /// Returns the first `DomainError` raised by any query.
    pub fn map_all(&self, queries: &[QueryResult]) -> Result<Vec<QueryMapping>, DomainError> {
        queries.par_iter().map(|q| self.map_query(q)).collect()
    }

    /// Surviving calls for a query, tagged and ordered by first residue
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidMerge` if a hit mixes fragments of different families.
    pub fn resolve(&self, query: &QueryResult) -> Result<Vec<Domain>, DomainError> {
        let config = &self.config;
        let mut candidates = DomainMap::new();

        for hit in &query.hits {
            let fragments: Vec<Domain> = hit
                .fragments
                .iter()
                .map(|f| Domain::from_fragment(f, config.intra_gap))
                .filter(|d| !d.is_empty() && d.significance <= config.eval_cutoff)
                .collect();

            let kept = if hit.fragments.len() > 1 {
                consolidate_fragments(fragments, config)?
            } else {
                fragments
            };
            for domain in kept {
                candidates.push(domain);
            }
        }

        eliminate_overlapping(&mut candidates, &config.tolerance());

        let mut domains = candidates.into_present();
        label_insertional(&mut domains, config.overlap);
        for domain in &mut domains {
            if domain.is_non_contiguous() {
                domain.update_topology(Topology::NonContiguous);
            }
        }
        domains.sort_by_key(Domain::first);

        Ok(domains)
    }
}
