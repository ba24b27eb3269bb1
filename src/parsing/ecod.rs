//! Parser for ECOD "latest domains" tables (`ecod.latest.domains.txt`).

use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::store::{Classification, DomainDefinitions};
use crate::parsing::hmmscan::{read_input, ParseError};

const COL_F_ID: usize = 3;
const COL_ARCHITECTURE: usize = 9;
const COL_X_GROUP: usize = 10;
const COL_H_GROUP: usize = 11;
const COL_T_GROUP: usize = 12;
const COL_F_GROUP: usize = 13;

/// Placeholder ECOD uses for an unnamed X-group
const NO_X_NAME: &str = "NO_X_NAME";
/// Placeholder ECOD uses for an unnamed H-group
const NO_H_NAME: &str = "NO_H_NAME";

/// Parse an ECOD domains table from a file (optionally gzipped)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::EmptyFile`
/// if it holds no data rows, or `ParseError::InvalidFormat` if no row is usable.
pub fn parse_ecod_file(path: &Path) -> Result<DomainDefinitions, ParseError> {
    let text = read_input(path)?;
    let mut defs = parse_ecod_text(&text).map_err(|e| match e {
        ParseError::EmptyFile(_) => ParseError::EmptyFile(path.display().to_string()),
        other => other,
    })?;
    if let Some(name) = path.file_name() {
        defs.set_source(name.to_string_lossy());
    }
    Ok(defs)
}

/// Parse an ECOD domains table from text
///
/// # Errors
///
/// Returns `ParseError::EmptyFile` if there are no data rows, or
/// `ParseError::InvalidFormat` if none of them has enough columns.
pub fn parse_ecod_text(text: &str) -> Result<DomainDefinitions, ParseError> {
    let mut defs = DomainDefinitions::new();
    let mut rows = 0usize;
    let mut short_rows = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        rows += 1;

        let fields: Vec<&str> = line
            .split('\t')
            .map(|f| f.trim().trim_matches('"'))
            .collect();
        if fields.len() <= COL_F_GROUP {
            if short_rows == 0 {
                warn!(
                    "line {}: expected at least {} columns, found {}; skipping",
                    line_no + 1,
                    COL_F_GROUP + 1,
                    fields.len()
                );
            }
            short_rows += 1;
            continue;
        }

        defs.insert(fields[COL_F_GROUP], classify(&fields));
    }

    if rows == 0 {
        return Err(ParseError::EmptyFile("<text>".to_string()));
    }
    if short_rows > 1 {
        warn!("Skipped {} ECOD rows with too few columns", short_rows);
    }
    if defs.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No usable rows in ECOD domains table".to_string(),
        ));
    }

    debug!("Loaded {} ECOD families from {} rows", defs.len(), rows);
    Ok(defs)
}

/// Build the classification of one row, naming unnamed X-groups after the
/// H-group or, failing that, the T-group
fn classify(fields: &[&str]) -> Classification {
    let x_group = match (fields[COL_X_GROUP], fields[COL_H_GROUP]) {
        (NO_X_NAME, NO_H_NAME) => fields[COL_T_GROUP],
        (NO_X_NAME, h_group) => h_group,
        (x_group, _) => x_group,
    };

    Classification {
        f_id: fields[COL_F_ID].to_string(),
        architecture: fields[COL_ARCHITECTURE].to_string(),
        x_group: x_group.to_string(),
        t_group: fields[COL_T_GROUP].to_string(),
    }
}

/// Load definitions from either a JSON cache or a raw ECOD table
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed in either format.
pub fn load_definitions(path: &Path) -> anyhow::Result<DomainDefinitions> {
    let name = path.to_string_lossy().to_lowercase();
    let defs = if name.ends_with(".json") {
        DomainDefinitions::load_from_file(path)?
    } else {
        parse_ecod_file(path)?
    };
    Ok(defs)
}
