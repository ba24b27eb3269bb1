//! Command-line interface for dommap.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **map**: Reconcile an hmmscan report into non-conflicting domain calls
//! - **defs**: Convert an ECOD domains table into a JSON dictionary, or look
//!   up one family
//!
//! ## Usage
//!
//! ```text
//! # Map domains, classifications from an ECOD table
//! dommap map -i proteins.hmmscan.txt --dom-def ecod.latest.domains.txt -o domains.txt
//!
//! # Stricter overlap handling, JSON output for scripting
//! dommap map -i proteins.hmmscan.txt.gz --overlap 20 --format json
//!
//! # Cache the ECOD table as JSON for faster reuse
//! dommap defs ecod.latest.domains.txt -o ecod_defs.json
//! ```

use clap::{Parser, Subcommand};

pub mod defs;
pub mod map;

#[derive(Parser)]
#[command(name = "dommap")]
#[command(author)]
#[command(version)]
#[command(about = "Map ECOD domains onto proteins from hmmscan output")]
#[command(
    long_about = "dommap turns the raw hits of an hmmscan search against an ECOD profile database into a clean per-protein domain annotation.\n\nIt:\n- Merges split alignments of one domain and detects circular permutations\n- Resolves overlapping hits in favor of the most significant\n- Flags non-contiguous and insertional domains"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map domains from an hmmscan report
    Map(map::MapArgs),

    /// Convert or query ECOD domain definitions
    Defs(defs::DefsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
