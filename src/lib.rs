//! # dommap
//!
//! A library for mapping ECOD protein domains from HMMER3 `hmmscan` output.
//!
//! Searching a protein against a profile database reports every alignment
//! that clears the reporting threshold: the same domain split over several
//! fragments, neighboring families competing for the same residues, and
//! domains interrupted by inserted ones. `dommap` reconciles those raw hits
//! into one clean annotation per protein.
//!
//! ## Features
//!
//! - **Fragment merging**: Joins split alignments of one domain and folds
//!   distant pieces into a single non-contiguous call
//! - **Circular permutation detection**: Flags domains whose pieces align in
//!   reversed model order
//! - **Conflict resolution**: Keeps the most significant of overlapping calls,
//!   tolerating small edge overlaps
//! - **Insertion detection**: Flags domains nested inside another domain's gap
//! - **ECOD classification**: Decorates calls with architecture, X-, T- and
//!   F-group from the ECOD domains table
//!
//! ## Example
//!
//! ```rust,no_run
//! use dommap::{DomainDefinitions, DomainMapper, MappingConfig};
//! use dommap::parsing::hmmscan::parse_file;
//! use std::path::Path;
//!
//! let queries = parse_file(Path::new("proteins.hmmscan.txt")).unwrap();
//! let definitions = DomainDefinitions::new();
//!
//! let mapper = DomainMapper::new(&definitions, MappingConfig::default());
//! for mapping in mapper.map_all(&queries).unwrap() {
//!     for domain in &mapping.domains {
//!         println!("{}\t{}", domain.accession, domain.residue_range);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: ECOD classification dictionary
//! - [`core`]: Fragments, candidate domains and their collection
//! - [`mapping`]: Merging, conflict resolution and topology tagging
//! - [`parsing`]: Readers for hmmscan reports and ECOD tables
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod mapping;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::DomainDefinitions;
pub use core::domain::{Domain, DomainError};
pub use core::fragment::{AlignmentFragment, Hit, QueryResult};
pub use core::types::*;
pub use mapping::engine::{DomainMapper, MappedDomain, MappingConfig, QueryMapping, RunSummary};
