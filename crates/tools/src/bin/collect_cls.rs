//! Per-class accuracy aggregation.
//!
//! Scans a sweep output directory (one subdirectory per task, one trial
//! subdirectory each), averages each class's accuracy across trials and
//! writes the cross-task table to `collect_cls.txt` in the scanned root.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(about = "collect per-class accuracies into a summary table")]
struct Cli {
    /// Sweep output directory containing one subdirectory per task
    #[arg(long, short = 'p')]
    path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    tools::collect::collect_cls(&cli.path)?;
    Ok(())
}
