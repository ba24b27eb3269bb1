use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::catalog::store::DomainDefinitions;
use crate::cli::OutputFormat;
use crate::mapping::engine::{
    DomainMapper, MappedDomain, MappingConfig, QueryMapping, RunSummary, DEFAULT_EVAL_CUTOFF,
    DEFAULT_FRAC_OVERLAP, DEFAULT_INTER_GAP, DEFAULT_INTRA_GAP, DEFAULT_OVERLAP, REPORT_COLUMNS,
};
use crate::parsing::{ecod, hmmscan};

const RULE: &str =
    "#===========================================================================================";

#[derive(Args)]
pub struct MapArgs {
    /// hmmscan report produced with `-o` (optionally gzipped)
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Output file. If not specified, prints to stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// ECOD domain definitions: a `ecod.latest.domains.txt` table or a JSON
    /// dictionary written by `dommap defs`
    #[arg(long)]
    pub dom_def: Option<PathBuf>,

    /// Minimum run of model insert states excised from a single alignment
    #[arg(long, default_value_t = DEFAULT_INTRA_GAP as i64, allow_negative_numbers = true)]
    pub intra_gap: i64,

    /// Maximum gap between alignments of one domain that is filled when merging
    #[arg(long, default_value_t = DEFAULT_INTER_GAP as i64, allow_negative_numbers = true)]
    pub inter_gap: i64,

    /// Residues two domains may share without conflicting
    #[arg(long, default_value_t = DEFAULT_OVERLAP as i64, allow_negative_numbers = true)]
    pub overlap: i64,

    /// Fraction of either domain that, when shared, forces a conflict (0-1)
    #[arg(long, default_value_t = DEFAULT_FRAC_OVERLAP, allow_negative_numbers = true)]
    pub frac_overlap: f64,

    /// Conditional E-value cutoff; less significant alignments are discarded
    #[arg(long, default_value_t = DEFAULT_EVAL_CUTOFF, allow_negative_numbers = true)]
    pub eval_cutoff: f64,
}

/// Everything the report header describes
pub struct ReportContext<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub config: &'a MappingConfig,
    pub summary: &'a RunSummary,
    pub executed_on: String,
}

/// JSON report document
#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    executed_on: &'a str,
    input: &'a str,
    options: &'a MappingConfig,
    summary: &'a RunSummary,
    domains: Vec<&'a MappedDomain>,
}

/// Execute map subcommand
///
/// # Errors
///
/// Returns an error if an option is invalid, an input cannot be parsed, or the
/// report cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MapArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    // Options are checked before any input is touched
    let config = MappingConfig::from_raw(
        args.intra_gap,
        args.inter_gap,
        args.overlap,
        args.frac_overlap,
        args.eval_cutoff,
    )?;

    let definitions = match &args.dom_def {
        Some(path) => ecod::load_definitions(path)?,
        None => {
            if verbose {
                eprintln!("No --dom-def given; classification columns will be N/A");
            }
            DomainDefinitions::new()
        }
    };

    let queries = hmmscan::parse_file(&args.input)?;
    if verbose {
        eprintln!(
            "Parsed {} proteins ({} alignments), {} ECOD families loaded",
            queries.len(),
            queries.iter().map(|q| q.fragment_count()).sum::<usize>(),
            definitions.len()
        );
    }

    let mapper = DomainMapper::new(&definitions, config);
    let mappings = mapper.map_all(&queries)?;
    let summary = RunSummary::from_mappings(&mappings);
    info!(
        "Mapped {} domains across {} proteins (NC {}, CP {}, IS {})",
        summary.counts.total,
        summary.proteins,
        summary.counts.non_contiguous,
        summary.counts.circular_permutant,
        summary.counts.insertional
    );

    let input = args.input.display().to_string();
    let output = args
        .output
        .as_ref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    let context = ReportContext {
        input: &input,
        output: &output,
        config: &config,
        summary: &summary,
        executed_on: chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
    };

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    match format {
        OutputFormat::Text => write_text_report(&mut writer, &context, &mappings)?,
        OutputFormat::Tsv => write_tsv_report(&mut writer, &mappings)?,
        OutputFormat::Json => write_json_report(&mut writer, &context, &mappings)?,
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        if verbose {
            eprintln!("Wrote {} domains to {}", summary.counts.total, path.display());
        }
    }

    Ok(())
}

/// Commented run header followed by one row per domain
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_text_report<W: Write>(
    w: &mut W,
    context: &ReportContext<'_>,
    mappings: &[QueryMapping],
) -> std::io::Result<()> {
    let config = context.config;
    let counts = &context.summary.counts;
    let pct = |n: usize| counts.fraction(n) * 100.0;

    writeln!(w, "{RULE}")?;
    writeln!(w, "#  dommap v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "#  Executed on:")?;
    writeln!(w, "#               {}", context.executed_on)?;
    writeln!(w, "#  Input HMM:")?;
    writeln!(w, "#               {}", context.input)?;
    writeln!(w, "#  Output:")?;
    writeln!(w, "#               {}", context.output)?;
    writeln!(w, "#  Options:")?;
    writeln!(w, "#               Intra domain gap = {:2}", config.intra_gap)?;
    writeln!(w, "#               Inter domain gap = {:2}", config.inter_gap)?;
    writeln!(w, "#               Overlap = {:2}", config.overlap)?;
    writeln!(w, "#               Fractional overlap = {:.2}", config.frac_overlap)?;
    writeln!(
        w,
        "#               E-value cutoff = {}",
        crate::mapping::scoring::format_significance(config.eval_cutoff)
    )?;
    writeln!(w, "#  Domain Counts:")?;
    writeln!(
        w,
        "#               Total Proteins: {:6}         Total Domains:  {:6}",
        context.summary.proteins, counts.total
    )?;
    for (code, n) in [
        ("NC", counts.non_contiguous),
        ("CP", counts.circular_permutant),
        ("IS", counts.insertional),
    ] {
        writeln!(
            w,
            "#                                                        {code} : {n:3} ({:.2}%)",
            pct(n)
        )?;
    }
    writeln!(w, "#  Property Definitions:")?;
    writeln!(w, "#               CP = Circular Permutant Domain")?;
    writeln!(w, "#               NC = Non-Contiguous Domain")?;
    writeln!(w, "#               IS = InSertional Domain")?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "# {}", REPORT_COLUMNS.join("\t"))?;

    write_rows(w, mappings)
}

/// Column-name line followed by one row per domain
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tsv_report<W: Write>(w: &mut W, mappings: &[QueryMapping]) -> std::io::Result<()> {
    writeln!(w, "{}", REPORT_COLUMNS.join("\t"))?;
    write_rows(w, mappings)
}

fn write_rows<W: Write>(w: &mut W, mappings: &[QueryMapping]) -> std::io::Result<()> {
    for domain in mappings.iter().flat_map(|m| &m.domains) {
        writeln!(w, "{}", domain.to_tsv_row())?;
    }
    Ok(())
}

/// Options, counts and domains as one JSON document
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json_report<W: Write>(
    w: &mut W,
    context: &ReportContext<'_>,
    mappings: &[QueryMapping],
) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        executed_on: &context.executed_on,
        input: context.input,
        options: context.config,
        summary: context.summary,
        domains: mappings.iter().flat_map(|m| &m.domains).collect(),
    };
    serde_json::to_writer_pretty(&mut *w, &report)?;
    writeln!(w)?;
    Ok(())
}
