//! Reconciliation of hmmscan hits into a final set of domain calls.
//!
//! For each query sequence:
//!
//! 1. every fragment becomes a call, with long model inserts carved out
//! 2. fragments of the same hit are merged ([`fragments`]): close pieces are
//!    joined, permuted pieces are tagged `CP`, distant pieces are folded into
//!    one non-contiguous call
//! 3. conflicting calls are eliminated in favor of the most significant
//!    ([`overlap`], [`resolver`])
//! 4. calls nested in another call's gap are tagged `IS` ([`insertional`]),
//!    calls with a gap are tagged `NC`
//!
//! [`engine::DomainMapper`] drives these steps for one query or, in parallel,
//! for a whole report.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dommap::catalog::store::DomainDefinitions;
//! use dommap::mapping::engine::{DomainMapper, MappingConfig};
//! use dommap::parsing::hmmscan::parse_file;
//! use std::path::Path;
//!
//! let queries = parse_file(Path::new("proteins.hmmscan.txt")).unwrap();
//! let defs = DomainDefinitions::new();
//! let mapper = DomainMapper::new(&defs, MappingConfig::default());
//! for mapping in mapper.map_all(&queries).unwrap() {
//!     for domain in &mapping.domains {
//!         println!("{}", domain.to_tsv_row());
//!     }
//! }
//! ```

pub mod engine;
pub mod fragments;
pub mod insertional;
pub mod overlap;
pub mod resolver;
pub mod scoring;
