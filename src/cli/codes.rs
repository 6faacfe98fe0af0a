use std::collections::HashSet;
use std::io::{self, Write};

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::config::resolve_codes;
use crate::diagnostics::codes::ErrorCode;
use crate::diagnostics::report::{write_catalogue, ReportFormat};
use crate::diagnostics::sink::DEFAULT_STRICT_MODE_WARNINGS;

#[derive(Args)]
pub struct CodesArgs {
    /// Only list codes matching this code, keyword or text (repeatable)
    #[arg(value_name = "CODE")]
    pub selectors: Vec<String>,
}

/// Execute codes subcommand
///
/// # Errors
///
/// Returns an error if a selector matches no code or stdout cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CodesArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let strict_mode_warnings: HashSet<ErrorCode> =
        DEFAULT_STRICT_MODE_WARNINGS.into_iter().collect();
    let selected = if args.selectors.is_empty() {
        None
    } else {
        Some(resolve_codes(&args.selectors)?)
    };

    let mut out = io::stdout().lock();
    match selected {
        None => write_catalogue(&mut out, ReportFormat::from(format), &strict_mode_warnings)?,
        Some(codes) => {
            for code in codes {
                writeln!(out, "{code}\t{}\t{}", code.severity(), code.template())?;
            }
        }
    }
    out.flush().context("Failed to write to stdout")?;
    Ok(())
}
