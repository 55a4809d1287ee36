//! Per-metric accuracy aggregation.
//!
//! Scans a sweep output directory, averages each named metric (by default
//! the trainer's overall `average` accuracy) across trials per task, then
//! across tasks, and writes the table to `collect_results.txt` in the
//! scanned root. The cross-task average leads each row.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(about = "collect per-task metric accuracies into a summary table")]
struct Cli {
    /// Sweep output directory containing one subdirectory per task
    #[arg(long, short = 'p')]
    path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    tools::collect::collect_results(&cli.path)?;
    Ok(())
}
