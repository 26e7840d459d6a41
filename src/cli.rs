// src/cli.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::core::catalog;
use crate::core::config::{self, ScanConfig};
use crate::core::error::ScanError;

#[derive(Parser, Debug)]
#[command(
    name = "vanguard-recon",
    version,
    about = "HTTP reconnaissance and heuristic risk scoring for a single origin"
)]
pub struct Cli {
    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe a target and write a JSON risk report
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Target origin, e.g. https://example.com (https is assumed without a scheme)
    pub url: String,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    pub timeout: u64,

    /// Report file (default: report/<host>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of probes in flight
    #[arg(short, long, default_value_t = config::DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Stop probing after this many seconds and write an incomplete report
    #[arg(long)]
    pub deadline: Option<u64>,

    /// File with one path per line replacing the built-in catalog
    #[arg(long)]
    pub paths: Option<PathBuf>,

    /// Skip the PUT/DELETE/PATCH/TRACE/OPTIONS probes against /
    #[arg(long)]
    pub no_method_checks: bool,

    /// Read at most this many bytes of each response body
    #[arg(long, default_value_t = config::DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Send all probes through this proxy
    #[arg(long)]
    pub proxy: Option<String>,
}

impl ScanArgs {
    /// Builds the engine configuration. Loads the catalog override if one was given.
    pub fn to_config(&self) -> Result<ScanConfig, ScanError> {
        let paths = match &self.paths {
            Some(file) => catalog::load_override(file)?,
            None => catalog::candidate_paths(),
        };
        let config = ScanConfig {
            timeout: Duration::from_secs(self.timeout),
            concurrency: self.concurrency,
            deadline: self.deadline.map(Duration::from_secs),
            paths,
            method_checks: !self.no_method_checks,
            max_body_bytes: self.max_body_bytes,
            proxy: self.proxy.clone(),
            ..ScanConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}
