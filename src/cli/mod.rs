//! Command-line interface for agp-validate.
//!
//! Available commands:
//!
//! - **validate**: Check one or more AGP files and report problems line by line
//! - **codes**: List every message code with its description
//!
//! ## Usage
//!
//! ```text
//! # Validate a file
//! agp-validate validate assembly.agp
//!
//! # Read from stdin, strict mode, XML report
//! zcat assembly.agp.gz | agp-validate validate - --strict --format xml
//!
//! # Hide short-gap notes and stop after 100 errors
//! agp-validate validate assembly.agp --skip w52 --max-errors 100
//!
//! # List message codes
//! agp-validate codes
//! ```

use clap::{Parser, Subcommand};

use crate::diagnostics::report::ReportFormat;

pub mod codes;
pub mod validate;

#[derive(Parser)]
#[command(name = "agp-validate")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Validate AGP (A Golden Path) assembly files")]
#[command(
    long_about = "agp-validate checks AGP files line by line and across lines.\n\nIt reports:\n- Malformed lines (column counts, invalid values, bad coordinates)\n- Continuity problems between consecutive lines of an object\n- Suspicious content such as gaps at object ends or duplicate objects"
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
    /// Validate AGP files
    Validate(validate::ValidateArgs),

    /// List message codes
    Codes(codes::CodesArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Xml,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Xml => Self::Xml,
            OutputFormat::Json => Self::Json,
        }
    }
}
