//! Seed/hyperparameter sweep driver.
//!
//! Enumerates every (trial, source, target) combination for the chosen
//! dataset and launches one external trainer process per combination,
//! sequentially. The trainer itself lives in the external framework; this
//! tool only builds the invocations and blocks on each one.
//!
//! Usage:
//! ```shell
//! cargo run -p tools --release --bin run_sweep -- \
//!   --method DAPL --dataset officehome --backbone RN50 \
//!   --n_trials 3 --seed -1 --gpu 0
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use tools::sweep::{Backbone, DatasetArg, SweepConfig, SweepMeta, plan_runs};

#[derive(Parser, Debug)]
#[command(about = "seed/hyperparameter sweep driver for domain-adaptation training")]
struct Cli {
    /// Trainer method name
    #[arg(long, short = 'm', default_value = "DAPL")]
    method: String,

    /// Dataset
    #[arg(long, short = 'd', value_enum, default_value = "officehome")]
    dataset: DatasetArg,

    /// GPU id pinned via CUDA_VISIBLE_DEVICES
    #[arg(long, short = 'g', default_value_t = 0)]
    gpu: u32,

    /// Vision backbone
    #[arg(long, short = 'b', value_enum, default_value = "RN50")]
    backbone: Backbone,

    /// Repeat count; trials run from --n_start up to this, exclusive
    #[arg(long = "n_trials", short = 'n', default_value_t = 3)]
    n_trials: u32,

    /// First trial index
    #[arg(long = "n_start", default_value_t = 0)]
    n_start: u32,

    /// Experiment-name suffix appended to the output directory
    #[arg(long = "exp_name", default_value = "")]
    exp_name: String,

    /// Base seed; negative derives a per-run seed by hashing the configuration
    #[arg(long, default_value_t = 2023, allow_hyphen_values = true)]
    seed: i64,

    /// Trainer config identifier
    #[arg(long = "CFG", default_value = "ep25-32-csc")]
    cfg: String,

    /// Softmax temperature override
    #[arg(long = "T", default_value_t = 1.0)]
    t: f64,

    /// Pseudo-label confidence threshold override
    #[arg(long = "TAU", default_value_t = 0.5)]
    tau: f64,

    /// Unlabeled-loss weight override
    #[arg(long = "U", default_value_t = 1.0)]
    u: f64,

    /// Dataset root passed through to the trainer
    #[arg(long = "data_root", default_value = "~/data/bbda")]
    data_root: String,

    /// Python interpreter used to launch the trainer
    #[arg(long, default_value = "python")]
    python: String,

    /// Trainer entry script
    #[arg(long = "train_script", default_value = "train.py")]
    train_script: PathBuf,

    /// Print the planned commands without launching anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = SweepConfig {
        method: cli.method,
        dataset: cli.dataset.kind(),
        gpu: cli.gpu,
        backbone: cli.backbone,
        n_trials: cli.n_trials,
        n_start: cli.n_start,
        exp_name: cli.exp_name,
        seed: cli.seed,
        cfg: cli.cfg,
        t: cli.t,
        tau: cli.tau,
        u: cli.u,
        data_root: cli.data_root,
        python: cli.python,
        train_script: cli.train_script,
    };

    let runs = plan_runs(&cfg);
    let base_dir = cfg.base_dir();
    println!("planned {} runs under {}", runs.len(), base_dir.display());
    if runs.is_empty() {
        log::warn!("nothing to do (check --n_start/--n_trials)");
        return Ok(());
    }

    if !cli.dry_run {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create {}", base_dir.display()))?;
        let meta = SweepMeta::new(&cfg, Local::now().to_rfc3339(), runs.len());
        let meta_path = base_dir.join("sweep_meta.json");
        fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("failed to write {}", meta_path.display()))?;
    }

    for (idx, run) in runs.iter().enumerate() {
        println!("[{}/{}] {}", idx + 1, runs.len(), run.render(&cfg));
        if cli.dry_run {
            continue;
        }
        // Block on each run; the sweep is deliberately sequential.
        let status = run.command(&cfg).status().with_context(|| {
            format!("failed to launch trainer for {}", run.output_dir.display())
        })?;
        if !status.success() {
            log::warn!("trainer exited with {status} for {}", run.output_dir.display());
        }
    }

    Ok(())
}
