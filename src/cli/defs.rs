use std::path::PathBuf;

use clap::Args;

use crate::catalog::store::{Classification, DomainDefinitions};
use crate::cli::OutputFormat;
use crate::parsing::ecod;

#[derive(Args)]
pub struct DefsArgs {
    /// ECOD domains table (`ecod.latest.domains.txt`, optionally gzipped) or a
    /// JSON dictionary written by this command
    #[arg(required = true)]
    pub input: PathBuf,

    /// Write the dictionary as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show the classification of a single F-group
    #[arg(long)]
    pub family: Option<String>,
}

/// Execute defs subcommand
///
/// # Errors
///
/// Returns an error if the definitions cannot be read, the family is unknown,
/// or the JSON file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DefsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let defs = ecod::load_definitions(&args.input)?;

    if verbose {
        eprintln!(
            "Loaded {} ECOD families from {}",
            defs.len(),
            args.input.display()
        );
    }

    if let Some(family) = &args.family {
        let class = defs
            .get(family)
            .ok_or_else(|| anyhow::anyhow!("Family '{}' not found in {}", family, args.input.display()))?;
        return print_family(family, class, format);
    }

    if let Some(output) = &args.output {
        std::fs::write(output, defs.to_json()?)?;
        println!("Exported {} families to {}", defs.len(), output.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", defs.to_json()?),
        OutputFormat::Tsv => print_tsv(&defs),
        OutputFormat::Text => {
            println!("ECOD domain definitions\n");
            if let Some(source) = defs.source() {
                println!("Source:   {source}");
            }
            println!("Families: {}", defs.len());
            println!("\nUse --family <NAME> to show one family, or -o <FILE> to export JSON.");
        }
    }

    Ok(())
}

fn print_family(family: &str, class: &Classification, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("F-group:      {family}");
            println!("F-id:         {}", class.f_id);
            println!("Architecture: {}", class.architecture);
            println!("X-group:      {}", class.x_group);
            println!("T-group:      {}", class.t_group);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "f_group": family,
                "f_id": class.f_id,
                "architecture": class.architecture,
                "x_group": class.x_group,
                "t_group": class.t_group,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Tsv => {
            println!("F-group\tF-id\tArchitecture\tX-group\tT-group");
            println!("{}", tsv_row(family, class));
        }
    }
    Ok(())
}

fn print_tsv(defs: &DomainDefinitions) {
    println!("F-group\tF-id\tArchitecture\tX-group\tT-group");
    for (family, class) in defs.iter() {
        println!("{}", tsv_row(family, class));
    }
}

fn tsv_row(family: &str, class: &Classification) -> String {
    format!(
        "{family}\t{}\t{}\t{}\t{}",
        class.f_id, class.architecture, class.x_group, class.t_group
    )
}
