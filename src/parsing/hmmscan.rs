//! Reader for HMMER3 `hmmscan -o` plain-text reports.
//!
//! Each `Query:` record becomes a [`QueryResult`]; each `>> model` block in it
//! becomes a [`Hit`] whose fragments are the rows of the block's domain table,
//! joined with the matching `== domain N` alignment. Everything outside those
//! sections (headers, per-sequence score tables, pipeline statistics) is
//! skipped.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::fragment::{AlignmentFragment, Hit, QueryResult};
use crate::utils::validation::looks_like_text;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Input file is empty: {0}")]
    EmptyFile(String),

    #[error(
        "No query records found in {0}. One common reason is providing a \
         `hmmscan --domtblout` table instead of `hmmscan -o` output"
    )]
    NoQueries(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Domain table row: `# ! score bias c-Evalue i-Evalue hmmfrom hmmto .. alifrom alito .. envfrom envto .. acc`
const DOMAIN_ROW: &str = r"^\s*(\d+)\s+[!?]\s+\S+\s+\S+\s+(\S+)\s+\S+\s+(\d+)\s+(\d+)\s+\S+\s+(\d+)\s+(\d+)\s+\S+\s+\d+\s+\d+\s+\S+\s+\S+\s*$";

/// Alignment row: `name start residues end`
const ALIGNMENT_ROW: &str = r"^\s*\S+\s+(?:\d+|-)\s+(\S+)\s+(?:\d+|-)\s*$";

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a text input, transparently decompressing `.gz` files
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read or decompressed, or
/// `ParseError::InvalidFormat` if the content is binary.
pub fn read_input(path: &Path) -> Result<String, ParseError> {
    let file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    if is_gzipped(path) {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        std::io::BufReader::new(file).read_to_end(&mut bytes)?;
    }

    if !looks_like_text(&bytes) {
        return Err(ParseError::InvalidFormat(format!(
            "{} does not look like a text file",
            path.display()
        )));
    }
    String::from_utf8(bytes).map_err(|e| {
        ParseError::InvalidFormat(format!("{} is not valid UTF-8: {e}", path.display()))
    })
}

/// Parse an hmmscan report from a file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::EmptyFile`
/// for an empty input, `ParseError::NoQueries` if no query records are found,
/// or `ParseError::InvalidFormat` for malformed domain rows.
pub fn parse_file(path: &Path) -> Result<Vec<QueryResult>, ParseError> {
    let text = read_input(path)?;
    let source = path.display().to_string();
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile(source));
    }
    let queries = HmmscanParser::new()?.parse(&text)?;
    if queries.is_empty() {
        return Err(ParseError::NoQueries(source));
    }
    Ok(queries)
}

/// Parse an hmmscan report held in memory
///
/// # Errors
///
/// Returns `ParseError::EmptyFile` for blank text, `ParseError::NoQueries` if
/// no query records are found, or `ParseError::InvalidFormat` for malformed
/// domain rows.
pub fn parse_text(text: &str) -> Result<Vec<QueryResult>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyFile("<text>".to_string()));
    }
    let queries = HmmscanParser::new()?.parse(text)?;
    if queries.is_empty() {
        return Err(ParseError::NoQueries("<text>".to_string()));
    }
    Ok(queries)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Between records, or in per-sequence tables
    Outside,
    /// Domain table of the current hit
    DomainTable,
    /// Alignments of the current hit; holds the 0-based domain index
    Alignment(usize),
}

/// Alignment rows collected for one domain
#[derive(Debug, Default)]
struct AlignmentRows {
    model: String,
    query: String,
    /// Next row belongs to the model
    expect_model: bool,
}

/// Line-oriented state machine over an hmmscan report
pub struct HmmscanParser {
    domain_row: Regex,
    alignment_row: Regex,
}

impl HmmscanParser {
    /// # Errors
    ///
    /// Returns `ParseError::Pattern` if a row pattern fails to compile.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            domain_row: Regex::new(DOMAIN_ROW)?,
            alignment_row: Regex::new(ALIGNMENT_ROW)?,
        })
    }

    /// Parse every query record in `text`
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for a domain row with impossible
    /// coordinates or an unreadable E-value.
    pub fn parse(&self, text: &str) -> Result<Vec<QueryResult>, ParseError> {
        let mut queries = Vec::new();
        let mut current: Option<QueryResult> = None;
        let mut alignments: Vec<AlignmentRows> = Vec::new();
        let mut section = Section::Outside;

        for (line_no, line) in text.lines().enumerate() {
            let trimmed = line.trim_start();

            if let Some(rest) = trimmed.strip_prefix("Query:") {
                finish_hit(current.as_mut(), &mut alignments);
                queries.extend(current.take());
                let accession = rest.split_whitespace().next().unwrap_or_default();
                if accession.is_empty() {
                    return Err(ParseError::InvalidFormat(format!(
                        "line {}: Query record without a name",
                        line_no + 1
                    )));
                }
                current = Some(QueryResult::new(accession, Vec::new()));
                section = Section::Outside;
                continue;
            }

            let Some(query) = current.as_mut() else {
                continue;
            };

            if trimmed.starts_with("//") {
                finish_hit(Some(query), &mut alignments);
                queries.extend(current.take());
                section = Section::Outside;
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix(">>") {
                finish_hit(Some(&mut *query), &mut alignments);
                let model = rest.split_whitespace().next().unwrap_or_default();
                query.hits.push(Hit::new(model, Vec::new()));
                section = Section::DomainTable;
                continue;
            }

            if trimmed.starts_with("Internal pipeline statistics") {
                finish_hit(Some(query), &mut alignments);
                section = Section::Outside;
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("== domain") {
                let index = rest
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|&n| n > 0);
                section = match index {
                    Some(n) => {
                        if alignments.len() < n {
                            alignments.resize_with(n, AlignmentRows::default);
                        }
                        alignments[n - 1].expect_model = true;
                        Section::Alignment(n - 1)
                    }
                    None => {
                        warn!("line {}: unreadable domain alignment header", line_no + 1);
                        Section::Outside
                    }
                };
                continue;
            }

            match section {
                Section::Outside => {}
                Section::DomainTable => {
                    if let Some(caps) = self.domain_row.captures(line) {
                        let fragment = fragment_from_row(&caps, query, line_no + 1)?;
                        if let Some(hit) = query.hits.last_mut() {
                            hit.fragments.push(fragment);
                        }
                    }
                }
                Section::Alignment(idx) => {
                    if let (Some(caps), Some(rows)) =
                        (self.alignment_row.captures(line), alignments.get_mut(idx))
                    {
                        let residues = &caps[1];
                        if rows.expect_model {
                            rows.model.push_str(residues);
                        } else {
                            rows.query.push_str(residues);
                        }
                        rows.expect_model = !rows.expect_model;
                    }
                }
            }
        }

        // Tolerate a truncated final record
        finish_hit(current.as_mut(), &mut alignments);
        queries.extend(current);

        debug!("Parsed {} query records", queries.len());
        Ok(queries)
    }
}

/// Build a fragment from a captured domain table row
fn fragment_from_row(
    caps: &regex::Captures<'_>,
    query: &QueryResult,
    line_no: usize,
) -> Result<AlignmentFragment, ParseError> {
    let invalid = |what: &str| {
        ParseError::InvalidFormat(format!(
            "line {line_no}: {what} in domain table of {}",
            query.accession
        ))
    };
    let number = |i: usize| -> Result<usize, ParseError> {
        caps[i]
            .parse::<usize>()
            .map_err(|_| invalid("coordinate out of range"))
    };

    let c_evalue: f64 = caps[2]
        .parse()
        .map_err(|_| invalid(&format!("unreadable c-Evalue '{}'", &caps[2])))?;
    let (hmm_from, hmm_to) = (number(3)?, number(4)?);
    let (ali_from, ali_to) = (number(5)?, number(6)?);

    if hmm_from == 0 || ali_from == 0 || hmm_to < hmm_from || ali_to < ali_from {
        return Err(invalid("impossible coordinates"));
    }

    let model = query.hits.last().map_or("", |h| h.model.as_str());
    Ok(AlignmentFragment::new(
        model,
        (ali_from - 1, ali_to),
        (hmm_from - 1, hmm_to),
        c_evalue,
    ))
}

/// Attach collected alignments to the fragments of the last hit
fn finish_hit(query: Option<&mut QueryResult>, alignments: &mut Vec<AlignmentRows>) {
    let rows = std::mem::take(alignments);
    let Some(hit) = query.and_then(|q| q.hits.last_mut()) else {
        return;
    };
    if rows.is_empty() {
        return;
    }
    if rows.len() != hit.fragments.len() {
        warn!(
            "{}: {} domain rows but {} alignments",
            hit.model,
            hit.fragments.len(),
            rows.len()
        );
    }
    for (fragment, aln) in hit.fragments.iter_mut().zip(rows) {
        if aln.model.len() == aln.query.len() {
            fragment.model_aln = aln.model;
            fragment.query_aln = aln.query;
        } else {
            warn!(
                "{}: alignment rows differ in length ({} vs {}), ignoring",
                hit.model,
                aln.model.len(),
                aln.query.len()
            );
        }
    }
}
