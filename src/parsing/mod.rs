//! Readers for the tool's two inputs.
//!
//! - **hmmscan reports**: HMMER3 `hmmscan -o` plain-text output, one record
//!   per query sequence, with per-domain alignments
//! - **ECOD domain tables**: `ecod.latest.domains.txt`, the source of the
//!   classification dictionary
//!
//! Both accept gzip-compressed files (`.gz`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use dommap::parsing::hmmscan::parse_file;
//! use std::path::Path;
//!
//! let queries = parse_file(Path::new("proteins.hmmscan.txt")).unwrap();
//! for query in &queries {
//!     println!("{}: {} fragments", query.accession, query.fragment_count());
//! }
//! ```
//!
//! ## Fragment coordinates
//!
//! | Field | Source column | Convention |
//! |-------|---------------|------------|
//! | `query_range` | `alifrom`, `ali to` | 0-based, half-open |
//! | `model_range` | `hmmfrom`, `hmm to` | 0-based, half-open |
//! | `significance` | `c-Evalue` | as reported |

pub mod ecod;
pub mod hmmscan;
