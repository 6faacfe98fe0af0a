use std::process::ExitCode;

use agp_validate::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("agp_validate=debug,info")
    } else {
        EnvFilter::new("agp_validate=warn")
    };

    // Reports go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Validate(args) => {
            if !cli::validate::run(args, cli.format, cli.verbose)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        cli::Commands::Codes(args) => {
            cli::codes::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
