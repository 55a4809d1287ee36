//! Task naming: `(source, target)` pairs and their two-letter codes.

use anyhow::{Result, bail};

/// Directory name for one task, e.g. `art_to_clipart`.
pub fn pair_dir_name(source: &str, target: &str) -> String {
    format!("{source}_to_{target}")
}

/// Two-letter task code from a task directory name:
/// `art_to_clipart` -> `A2C`, `real_world_to_art` -> `R2A`.
pub fn task_code(dir_name: &str) -> Result<String> {
    let Some((source, target)) = dir_name.split_once("_to_") else {
        bail!("task directory name '{dir_name}' does not contain '_to_'");
    };
    let (Some(s), Some(t)) = (source.chars().next(), target.chars().next()) else {
        bail!("task directory name '{dir_name}' has an empty source or target");
    };
    Ok(format!("{}2{}", s.to_ascii_uppercase(), t.to_ascii_uppercase()))
}
