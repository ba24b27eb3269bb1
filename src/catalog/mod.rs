//! ECOD classification dictionary.
//!
//! Final calls are decorated with the architecture, X-group, T-group and F-id
//! of their F-group. The dictionary is built from ECOD's "latest domains"
//! table (see [`crate::parsing::ecod`]) and can be cached as JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dommap::catalog::store::DomainDefinitions;
//! use std::path::Path;
//!
//! let defs = DomainDefinitions::load_from_file(Path::new("ecod_defs.json")).unwrap();
//! if let Some(class) = defs.get("GFP") {
//!     println!("{} / {}", class.architecture, class.x_group);
//! }
//! ```

pub mod store;
