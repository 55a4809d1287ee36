//! Benchmark dataset descriptors and split loading.
//!
//! Datasets are an explicit static dispatch table rather than a plugin
//! registry: each [`DatasetKind`] knows its domain list, on-disk directory
//! and manifest layout.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::datum::{Datum, read_image_list};

/// Supported domain-adaptation benchmarks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Office31,
    OfficeHome,
    Visda,
    DomainNet,
    CrossScene,
    MiniDomainNet,
}

impl DatasetKind {
    /// Short name used on the command line and in output paths.
    pub fn cli_name(self) -> &'static str {
        match self {
            DatasetKind::Office31 => "office31",
            DatasetKind::OfficeHome => "officehome",
            DatasetKind::Visda => "visda",
            DatasetKind::DomainNet => "domainnet",
            DatasetKind::CrossScene => "cs",
            DatasetKind::MiniDomainNet => "minidomainnet",
        }
    }

    /// Domain names, in canonical order.
    pub fn domains(self) -> &'static [&'static str] {
        match self {
            DatasetKind::Office31 => &["amazon", "dslr", "webcam"],
            DatasetKind::OfficeHome => &["art", "clipart", "product", "real_world"],
            DatasetKind::Visda => &["synthetic", "real"],
            DatasetKind::DomainNet => &["dpainting", "dreal", "dsketch"],
            DatasetKind::CrossScene => &["AID", "Merced", "NWPU"],
            DatasetKind::MiniDomainNet => &["clipart", "painting", "real", "sketch"],
        }
    }

    /// Dataset directory name under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            DatasetKind::Office31 => "office31",
            DatasetKind::OfficeHome => "office_home",
            DatasetKind::Visda => "visda",
            DatasetKind::DomainNet => "domainnet",
            DatasetKind::CrossScene => "cross_scene",
            DatasetKind::MiniDomainNet => "mini_domainnet",
        }
    }

    /// Stem of the trainer framework's dataset config file.
    pub fn config_name(self) -> &'static str {
        match self {
            DatasetKind::Office31 => "office31",
            DatasetKind::OfficeHome => "officehome",
            DatasetKind::Visda => "visda",
            DatasetKind::DomainNet => "domainnet",
            DatasetKind::CrossScene => "cross_scene",
            DatasetKind::MiniDomainNet => "mini_domainnet",
        }
    }

    /// A domain that must never serve as a sweep source, if any.
    /// For VisDA the real domain is adaptation target only.
    pub fn excluded_source(self) -> Option<&'static str> {
        match self {
            DatasetKind::Visda => Some("real"),
            _ => None,
        }
    }

    /// Whether derived class names are folded to lower case.
    fn lowercase_classnames(self) -> bool {
        matches!(self, DatasetKind::OfficeHome)
    }
}

/// The three partitions a trainer run consumes: labeled source samples,
/// unlabeled target samples used as training input, and target test samples.
#[derive(Clone, Debug)]
pub struct DatasetSplits {
    pub train_x: Vec<Datum>,
    pub train_u: Vec<Datum>,
    pub test: Vec<Datum>,
}

/// Loads the source/target splits for one task.
///
/// `root` may start with `~`; it is expanded against `$HOME` and made
/// absolute before manifests are resolved. Unknown domain names are a fatal
/// configuration error.
pub fn load_splits(
    kind: DatasetKind,
    root: &str,
    source_domains: &[String],
    target_domains: &[String],
) -> Result<DatasetSplits> {
    check_input_domains(kind, source_domains)?;
    check_input_domains(kind, target_domains)?;

    let dataset_dir = absolute_root(root)?.join(kind.dir_name());

    if kind == DatasetKind::Visda {
        // Single source domain; manifests are named after the split rather
        // than the domain.
        let train_x = read_visda_list(&dataset_dir, "synthetic")?;
        let train_u = read_visda_list(&dataset_dir, "real")?;
        let test = read_visda_list(&dataset_dir, "real")?;
        return Ok(DatasetSplits {
            train_x,
            train_u,
            test,
        });
    }

    let train_x = read_domains(kind, &dataset_dir, source_domains)?;
    let train_u = read_domains(kind, &dataset_dir, target_domains)?;
    let test = read_domains(kind, &dataset_dir, target_domains)?;
    log::debug!(
        "{}: {} train_x / {} train_u / {} test samples",
        kind.cli_name(),
        train_x.len(),
        train_u.len(),
        test.len()
    );
    Ok(DatasetSplits {
        train_x,
        train_u,
        test,
    })
}

fn read_domains(kind: DatasetKind, dataset_dir: &Path, domains: &[String]) -> Result<Vec<Datum>> {
    let mut items = Vec::new();
    for (domain, dname) in domains.iter().enumerate() {
        let list_path = dataset_dir.join("image_list").join(format!("{dname}.txt"));
        let mut batch =
            read_image_list(&list_path, dataset_dir, domain, kind.lowercase_classnames())
                .with_context(|| format!("loading domain '{dname}'"))?;
        items.append(&mut batch);
    }
    Ok(items)
}

fn read_visda_list(dataset_dir: &Path, dname: &str) -> Result<Vec<Datum>> {
    let filename = if dname == "synthetic" { "train" } else { "validation" };
    let list_path = dataset_dir.join("image_list").join(format!("{filename}.txt"));
    read_image_list(&list_path, dataset_dir, 0, false)
        .with_context(|| format!("loading domain '{dname}'"))
}

fn check_input_domains(kind: DatasetKind, domains: &[String]) -> Result<()> {
    if domains.is_empty() {
        bail!("empty domain list for dataset '{}'", kind.cli_name());
    }
    for d in domains {
        if !kind.domains().contains(&d.as_str()) {
            bail!(
                "unknown domain '{}' for dataset '{}' (expected one of {:?})",
                d,
                kind.cli_name(),
                kind.domains()
            );
        }
    }
    Ok(())
}

/// `~`-expanded, absolute form of the configured data root.
fn absolute_root(root: &str) -> Result<PathBuf> {
    let expanded = if let Some(rest) = root.strip_prefix("~/") {
        let home = env::var("HOME").context("HOME is not set, cannot expand '~' in data root")?;
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(root)
    };
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(env::current_dir()
            .context("failed to resolve current directory")?
            .join(expanded))
    }
}
