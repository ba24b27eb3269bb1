//! Core data types for domain mapping.
//!
//! - [`fragment`]: alignment fragments (HSPs), hits and per-query results as
//!   read from an hmmscan report
//! - [`domain`]: a candidate domain call, the unit every mapping step works on
//! - [`domain_map`]: an indexed collection of calls with stable slots and a
//!   cached overlap matrix
//! - [`types`]: topology tags and run counters
//!
//! ## Coordinates
//!
//! All positions are 0-based. Fragment and model ranges are half-open; a
//! call's residue coverage is an explicit sorted set, since excised inserts
//! and merges leave it with holes. Only reports switch to 1-based inclusive
//! runs such as `5-124,200-250`.

pub mod domain;
pub mod domain_map;
pub mod fragment;
pub mod types;
