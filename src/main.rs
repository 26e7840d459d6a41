// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

mod cli;
mod core;
mod logging;
mod summary;

use crate::cli::{Cli, Command};
use crate::core::report;
use crate::core::scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::initialize_logging(cli.verbose)?;

    match cli.command {
        Command::Scan(args) => {
            let config = args.to_config()?;
            let mut scanner = Scanner::new(config);
            let report = scanner.run(&args.url).await?;

            let output = args
                .output
                .clone()
                .unwrap_or_else(|| report::default_output_path(&report.metadata.target));
            report::write_report(&report, &output)
                .wrap_err_with(|| format!("failed to write report to {}", output.display()))?;

            info!(path = %output.display(), risk = %report.metadata.risk_level, "Scan complete.");
            print!("{}", summary::render_summary(&report, &output));
        }
    }

    Ok(())
}
