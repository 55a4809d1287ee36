//! Sweep planning: enumerating (trial, source, target) combinations and
//! building the trainer invocation for each.
//!
//! Planning is pure; only the `run_sweep` binary actually spawns processes.

use std::path::PathBuf;
use std::process::Command;

use clap::ValueEnum;
use serde::Serialize;

use dabench_core::dataset::DatasetKind;
use dabench_core::seed::seed_hash;
use dabench_core::task::pair_dir_name;

/// Dataset choice as it appears on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatasetArg {
    #[value(name = "office31")]
    Office31,
    #[value(name = "officehome")]
    OfficeHome,
    #[value(name = "visda")]
    Visda,
    #[value(name = "domainnet")]
    DomainNet,
    #[value(name = "cs")]
    CrossScene,
    #[value(name = "minidomainnet")]
    MiniDomainNet,
}

impl DatasetArg {
    pub fn kind(self) -> DatasetKind {
        match self {
            DatasetArg::Office31 => DatasetKind::Office31,
            DatasetArg::OfficeHome => DatasetKind::OfficeHome,
            DatasetArg::Visda => DatasetKind::Visda,
            DatasetArg::DomainNet => DatasetKind::DomainNet,
            DatasetArg::CrossScene => DatasetKind::CrossScene,
            DatasetArg::MiniDomainNet => DatasetKind::MiniDomainNet,
        }
    }
}

/// CLIP vision backbones the trainer accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backbone {
    #[value(name = "RN50")]
    Rn50,
    #[value(name = "RN101")]
    Rn101,
    #[value(name = "RN50x4")]
    Rn50x4,
    #[value(name = "RN50x16")]
    Rn50x16,
    #[value(name = "RN50x64")]
    Rn50x64,
    #[value(name = "ViT-B/32")]
    VitB32,
    #[value(name = "ViT-B/16")]
    VitB16,
    #[value(name = "ViT-L/14")]
    VitL14,
    #[value(name = "ViT-L/14@336px")]
    VitL14At336,
}

impl Backbone {
    pub fn as_str(self) -> &'static str {
        match self {
            Backbone::Rn50 => "RN50",
            Backbone::Rn101 => "RN101",
            Backbone::Rn50x4 => "RN50x4",
            Backbone::Rn50x16 => "RN50x16",
            Backbone::Rn50x64 => "RN50x64",
            Backbone::VitB32 => "ViT-B/32",
            Backbone::VitB16 => "ViT-B/16",
            Backbone::VitL14 => "ViT-L/14",
            Backbone::VitL14At336 => "ViT-L/14@336px",
        }
    }
}

/// Everything a sweep needs to enumerate and launch its runs.
#[derive(Clone, Debug)]
pub struct SweepConfig {
    pub method: String,
    pub dataset: DatasetKind,
    pub gpu: u32,
    pub backbone: Backbone,
    pub n_trials: u32,
    pub n_start: u32,
    pub exp_name: String,
    /// Negative: derive a per-run seed by hashing the configuration.
    /// Non-negative: use `seed + trial`.
    pub seed: i64,
    pub cfg: String,
    pub t: f64,
    pub tau: f64,
    pub u: f64,
    pub data_root: String,
    pub python: String,
    pub train_script: PathBuf,
}

impl SweepConfig {
    /// Base output directory shared by every run of this sweep:
    /// `output/UDA/{method}/{dataset}/{backbone}_{cfg}_{T}_{TAU}_{U}[_{exp}]`.
    pub fn base_dir(&self) -> PathBuf {
        let exp = if self.exp_name.is_empty() {
            String::new()
        } else {
            format!("_{}", self.exp_name)
        };
        PathBuf::from("output/UDA")
            .join(&self.method)
            .join(self.dataset.cli_name())
            .join(format!(
                "{}_{}_{}_{}_{}{}",
                self.backbone.as_str(),
                self.cfg,
                fmt_hparam(self.t),
                fmt_hparam(self.tau),
                fmt_hparam(self.u),
                exp
            ))
    }
}

/// One planned trainer invocation.
#[derive(Clone, Debug, Serialize)]
pub struct TrainRun {
    pub trial: u32,
    pub source: String,
    pub target: String,
    pub seed: i64,
    pub output_dir: PathBuf,
}

impl TrainRun {
    /// Builds the external trainer command for this run. The GPU is pinned
    /// via `CUDA_VISIBLE_DEVICES`; trailing arguments are framework config
    /// overrides for the three hyperparameters.
    pub fn command(&self, cfg: &SweepConfig) -> Command {
        let mut cmd = Command::new(&cfg.python);
        cmd.arg(&cfg.train_script)
            .arg("--root")
            .arg(&cfg.data_root)
            .arg("--trainer")
            .arg(&cfg.method)
            .arg("--backbone")
            .arg(cfg.backbone.as_str())
            .arg("--source-domains")
            .arg(&self.source)
            .arg("--target-domains")
            .arg(&self.target)
            .arg("--dataset-config-file")
            .arg(format!("configs/datasets/{}.yaml", cfg.dataset.config_name()))
            .arg("--config-file")
            .arg(format!("configs/trainers/{}/{}.yaml", cfg.method.to_lowercase(), cfg.cfg))
            .arg("--output-dir")
            .arg(&self.output_dir)
            .arg("--seed")
            .arg(self.seed.to_string())
            .arg("TRAINER.DAPL.T")
            .arg(fmt_hparam(cfg.t))
            .arg("TRAINER.DAPL.TAU")
            .arg(fmt_hparam(cfg.tau))
            .arg("TRAINER.DAPL.U")
            .arg(fmt_hparam(cfg.u));
        cmd.env("CUDA_VISIBLE_DEVICES", cfg.gpu.to_string());
        cmd
    }

    /// Shell-style rendering for dry runs and progress output.
    pub fn render(&self, cfg: &SweepConfig) -> String {
        let cmd = self.command(cfg);
        let mut parts = vec![
            format!("CUDA_VISIBLE_DEVICES={}", cfg.gpu),
            cmd.get_program().to_string_lossy().into_owned(),
        ];
        parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Enumerates every run of the sweep: trials `n_start..n_trials`, ordered
/// (source, target) domain pairs with source != target, minus pairs the
/// dataset disallows (VisDA never adapts *from* the real domain).
pub fn plan_runs(cfg: &SweepConfig) -> Vec<TrainRun> {
    let domains = cfg.dataset.domains();
    let base_dir = cfg.base_dir();
    let mut runs = Vec::new();

    for trial in cfg.n_start..cfg.n_trials {
        for &source in domains {
            for &target in domains {
                if source == target {
                    continue;
                }
                if cfg.dataset.excluded_source() == Some(source) {
                    log::info!("skip {source} as source");
                    continue;
                }
                let seed = if cfg.seed < 0 {
                    i64::from(seed_hash(
                        &cfg.method,
                        cfg.backbone.as_str(),
                        cfg.dataset.cli_name(),
                        source,
                        target,
                        trial,
                    ))
                } else {
                    cfg.seed + i64::from(trial)
                };
                // Trial directories are numbered from 1.
                let output_dir = base_dir
                    .join(pair_dir_name(source, target))
                    .join((trial + 1).to_string());
                runs.push(TrainRun {
                    trial,
                    source: source.to_string(),
                    target: target.to_string(),
                    seed,
                    output_dir,
                });
            }
        }
    }

    runs
}

/// Metadata record written into the sweep base directory before launching.
#[derive(Serialize)]
pub struct SweepMeta {
    pub timestamp: String,
    pub method: String,
    pub dataset: &'static str,
    pub backbone: &'static str,
    pub cfg: String,
    pub t: f64,
    pub tau: f64,
    pub u: f64,
    pub seed: i64,
    pub n_start: u32,
    pub n_trials: u32,
    pub data_root: String,
    pub total_runs: usize,
}

impl SweepMeta {
    pub fn new(cfg: &SweepConfig, timestamp: String, total_runs: usize) -> Self {
        Self {
            timestamp,
            method: cfg.method.clone(),
            dataset: cfg.dataset.cli_name(),
            backbone: cfg.backbone.as_str(),
            cfg: cfg.cfg.clone(),
            t: cfg.t,
            tau: cfg.tau,
            u: cfg.u,
            seed: cfg.seed,
            n_start: cfg.n_start,
            n_trials: cfg.n_trials,
            data_root: cfg.data_root.clone(),
            total_runs,
        }
    }
}

/// Hyperparameter rendering for directory names and config overrides:
/// whole numbers keep one decimal (`1.0`), everything else prints plainly.
pub fn fmt_hparam(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
