use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use flate2::read::MultiGzDecoder;
use serde_json::json;
use tracing::{info, warn};

use crate::checks::{AssemblyStats, ContentChecks};
use crate::cli::OutputFormat;
use crate::config::ValidatorConfig;
use crate::core::types::AgpVersion;
use crate::diagnostics::report::ReportFormat;
use crate::parsing::reader::{AgpReader, StreamOutcome};

#[derive(Args)]
pub struct ValidateArgs {
    /// AGP files to validate (plain or .gz)
    /// Use '-' or no file for stdin
    pub inputs: Vec<PathBuf>,

    /// AGP version to validate against (default: from a ##agp-version
    /// comment, or inferred from the first gap line)
    #[arg(long = "agp-version", value_name = "VERSION")]
    pub agp_version: Option<AgpVersion>,

    /// JSON settings file; command-line options override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report most warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Show at most this many messages per code (0 = no limit)
    #[arg(long)]
    pub max_repeat: Option<usize>,

    /// Do not show messages matching this code, keyword or text (repeatable)
    #[arg(long, value_name = "CODE")]
    pub skip: Vec<String>,

    /// Show only messages matching this code, keyword or text (repeatable)
    #[arg(long, value_name = "CODE")]
    pub only: Vec<String>,

    /// Stop after this many lines with errors (0 = no limit)
    #[arg(long)]
    pub max_errors: Option<usize>,

    /// Largest accepted sequence position
    #[arg(long)]
    pub max_position: Option<u64>,

    /// Print object, scaffold, component and gap counts
    #[arg(long)]
    pub stats: bool,
}

/// Execute validate subcommand
///
/// Returns `Ok(true)` when no errors were reported.
///
/// # Errors
///
/// Returns an error if the settings are invalid or an input cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ValidateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<bool> {
    let config = build_config(&args)?;
    let format = ReportFormat::from(format);

    let out = BufWriter::new(io::stdout().lock());
    let mut log = config.build_log(out, format)?;
    log.begin_report();

    let checks = ContentChecks::new().with_max_errors(config.max_errors);
    let mut reader = AgpReader::with_observer(log, checks)
        .with_version(config.version)
        .with_parser(config.row_parser());

    let inputs = if args.inputs.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        args.inputs.clone()
    };

    for input in &inputs {
        if inputs.len() > 1 {
            reader.sink_mut().start_file(input.display().to_string());
        }
        let source = open_input(input)?;
        info!(input = %input.display(), "validating");

        let outcome = reader
            .read_stream(source, true)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        if let StreamOutcome::Stopped { line } = outcome {
            warn!(
                input = %input.display(),
                line,
                "stopped after {} lines with errors",
                config.max_errors
            );
            break;
        }
    }

    if verbose {
        eprintln!(
            "Validated {} input(s) as AGP {}",
            inputs.len(),
            reader
                .version()
                .locked()
                .map_or_else(|| "(undetermined)".to_string(), |v| v.to_string())
        );
    }

    let (mut log, checks) = reader.into_parts();
    if args.stats {
        write_stats(log.output_mut(), format, checks.stats())?;
    }
    log.write_summary();
    let summary = log.summary();
    log.finish().context("Failed to write report")?;

    Ok(summary.errors == 0)
}

fn build_config(args: &ValidateArgs) -> anyhow::Result<ValidatorConfig> {
    let mut config = match &args.config {
        Some(path) => ValidatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };

    if args.agp_version.is_some() {
        config.version = args.agp_version;
    }
    config.strict |= args.strict;
    if let Some(max_repeat) = args.max_repeat {
        config.max_repeat = max_repeat;
    }
    config.skip.extend(args.skip.iter().cloned());
    config.only.extend(args.only.iter().cloned());
    if let Some(max_errors) = args.max_errors {
        config.max_errors = max_errors;
    }
    if let Some(max_position) = args.max_position {
        config.max_position = max_position;
    }
    config.validate()?;
    Ok(config)
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let is_gzip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn write_stats(
    out: &mut impl Write,
    format: ReportFormat,
    stats: &AssemblyStats,
) -> anyhow::Result<()> {
    match format {
        ReportFormat::Text => {
            writeln!(out)?;
            writeln!(out, "Objects:     {}", stats.objects)?;
            writeln!(
                out,
                "Scaffolds:   {} ({} singletons)",
                stats.scaffolds, stats.singletons
            )?;
            writeln!(out, "Components:  {}", stats.components)?;
            for (component_type, count) in &stats.component_types {
                writeln!(out, "  {component_type}: {count}")?;
            }
            writeln!(out, "Gaps:        {}", stats.gaps)?;
            for (gap_type, count) in &stats.gap_types {
                writeln!(out, "  {gap_type}: {count}")?;
            }
        }
        ReportFormat::Xml => {
            writeln!(out, "<stats>")?;
            writeln!(out, " <objects>{}</objects>", stats.objects)?;
            writeln!(out, " <scaffolds>{}</scaffolds>", stats.scaffolds)?;
            writeln!(out, " <singletons>{}</singletons>", stats.singletons)?;
            writeln!(out, " <components>{}</components>", stats.components)?;
            writeln!(out, " <gaps>{}</gaps>", stats.gaps)?;
            writeln!(out, "</stats>")?;
        }
        ReportFormat::Json => {
            writeln!(out, "{}", json!({ "stats": stats }))?;
        }
    }
    Ok(())
}
