//! Trainer log scraping and per-task aggregation.
//!
//! Each task directory holds one subdirectory per trial, each with a
//! `log.txt`. A log is only trusted after the sentinel line marking the end
//! of training has been seen; metric lines before it are ignored. Per-task
//! results are averaged over all trials that produced entries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

/// Literal line after which metric reports are final.
pub const END_SIGNAL: &str = "Finish training";

/// Name of the per-trial log file inside each trial subdirectory.
pub const LOG_FILE: &str = "log.txt";

static CLASS_ACC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\* class: \d+ \(([A-Za-z_]+)\).*acc: ([\.\deE+-]+)%")
        .expect("invalid CLASS_ACC_RE pattern")
});

/// One named metric scraped by its own regex, e.g. `* average: 91.2%`.
pub struct MetricPattern {
    pub name: String,
    regex: Regex,
}

/// Builds one [`MetricPattern`] per metric name.
pub fn metric_patterns(names: &[&str]) -> Result<Vec<MetricPattern>> {
    names
        .iter()
        .map(|name| {
            let regex = Regex::new(&format!(r"\* {}: ([\.\deE+-]+)%", regex::escape(name)))
                .with_context(|| format!("invalid metric pattern for '{name}'"))?;
            Ok(MetricPattern {
                name: name.to_string(),
                regex,
            })
        })
        .collect()
}

/// How metric lines are recognized in a log file.
pub enum LineMatcher {
    /// Per-class accuracy lines; the metric name is the class name.
    ClassAcc,
    /// A fixed set of named metrics, one regex each.
    Metrics(Vec<MetricPattern>),
}

impl LineMatcher {
    fn match_line(&self, line: &str, path: &Path) -> Result<Vec<(String, f64)>> {
        let mut found = Vec::new();
        match self {
            LineMatcher::ClassAcc => {
                if let Some(caps) = CLASS_ACC_RE.captures(line) {
                    let name = caps[1].to_string();
                    let value = parse_pct(&caps[2], path, line)?;
                    found.push((name, value));
                }
            }
            LineMatcher::Metrics(patterns) => {
                for pat in patterns {
                    if let Some(caps) = pat.regex.captures(line) {
                        let value = parse_pct(&caps[1], path, line)?;
                        found.push((pat.name.clone(), value));
                    }
                }
            }
        }
        Ok(found)
    }
}

fn parse_pct(raw: &str, path: &Path, line: &str) -> Result<f64> {
    raw.parse::<f64>()
        .with_context(|| format!("bad metric value '{raw}' in {} ('{line}')", path.display()))
}

/// Scraped entries from one trial log, in first-seen order.
pub struct RunLog {
    pub path: PathBuf,
    pub entries: Vec<(String, f64)>,
}

/// Parses one log file.
///
/// State machine: ignore everything until the sentinel line, then scrape
/// every matching line. A log without the sentinel yields zero entries.
/// A repeated metric name overwrites the earlier value in place.
pub fn parse_log(path: &Path, matcher: &LineMatcher) -> Result<RunLog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read log {}", path.display()))?;

    let mut matching = false;
    let mut entries: Vec<(String, f64)> = Vec::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line == END_SIGNAL {
            matching = true;
            continue;
        }
        if !matching {
            continue;
        }
        for (name, value) in matcher.match_line(line, path)? {
            match entries.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = value,
                None => entries.push((name, value)),
            }
        }
    }

    Ok(RunLog {
        path: path.to_path_buf(),
        entries,
    })
}

/// Per-task aggregation result: each metric's mean over trials,
/// in first-seen order.
#[derive(Debug)]
pub struct TaskSummary {
    pub metrics: Vec<(String, f64)>,
}

/// Parses every trial log under one task directory and averages the metrics.
///
/// Trial subdirectories are scanned in sorted order, hidden entries skipped.
/// A trial directory without its log file is fatal; a task where no log
/// produced any entries is fatal ("nothing found"). Per-trial values and the
/// mean ± standard deviation summary are printed to stdout.
pub fn parse_task_dir(dir: &Path, matcher: &LineMatcher) -> Result<TaskSummary> {
    println!("Parsing files in {}", dir.display());

    let mut runs: Vec<RunLog> = Vec::new();
    for subdir in list_subdirs(dir)? {
        let fpath = subdir.join(LOG_FILE);
        if !fpath.is_file() {
            bail!("missing log file {}", fpath.display());
        }
        let run = parse_log(&fpath, matcher)?;
        if !run.entries.is_empty() {
            runs.push(run);
        }
    }

    if runs.is_empty() {
        bail!("nothing found in {}", dir.display());
    }

    // Accumulate values per metric, preserving the order of first appearance.
    let mut collected: Vec<(String, Vec<f64>)> = Vec::new();
    for run in &runs {
        let mut msg = format!("file: {}.", run.path.display());
        for (name, value) in &run.entries {
            msg.push_str(&format!(" {name}: {value:.1}%."));
            match collected.iter_mut().find(|(n, _)| n == name) {
                Some((_, values)) => values.push(*value),
                None => collected.push((name.clone(), vec![*value])),
            }
        }
        println!("{msg}");
    }

    println!("===");
    println!("Summary of directory: {}", dir.display());
    let mut metrics = Vec::with_capacity(collected.len());
    for (name, values) in &collected {
        let avg = mean(values);
        let std = std_dev(values);
        println!("* {name}: {avg:.1}% +- {std:.1}%");
        metrics.push((name.clone(), avg));
    }
    println!("===");

    Ok(TaskSummary { metrics })
}

/// Sorted, non-hidden subdirectories of `dir`.
pub fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

/// Method name by path convention: the second path component of the scanned
/// root, e.g. `output/DAPL/officehome/...` -> `DAPL`. Assumes the fixed
/// directory layout the sweep driver produces.
pub fn method_from_path(path: &Path) -> String {
    path.iter()
        .nth(1)
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_trial(task_dir: &Path, trial: &str, log: &str) {
        let dir = task_dir.join(trial);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOG_FILE), log).unwrap();
    }

    fn average_matcher() -> LineMatcher {
        LineMatcher::Metrics(metric_patterns(&["average"]).unwrap())
    }

    #[test]
    fn averages_across_trials() {
        let tmp = tempfile::tempdir().unwrap();
        let task = tmp.path().join("art_to_clipart");
        write_trial(&task, "1", "epoch 25 done\nFinish training\n* average: 90.0%\n");
        write_trial(&task, "2", "epoch 25 done\nFinish training\n* average: 92.0%\n");

        let summary = parse_task_dir(&task, &average_matcher()).unwrap();
        assert_eq!(summary.metrics.len(), 1);
        assert_eq!(summary.metrics[0].0, "average");
        assert!((summary.metrics[0].1 - 91.0).abs() < 1e-9);
    }

    #[test]
    fn lines_before_sentinel_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join(LOG_FILE);
        fs::write(&log, "* average: 10.0%\nFinish training\n* average: 90.0%\n").unwrap();

        let run = parse_log(&log, &average_matcher()).unwrap();
        assert_eq!(run.entries, vec![("average".to_string(), 90.0)]);
    }

    #[test]
    fn missing_sentinel_yields_no_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join(LOG_FILE);
        fs::write(&log, "* average: 90.0%\n").unwrap();

        let run = parse_log(&log, &average_matcher()).unwrap();
        assert!(run.entries.is_empty());
    }

    #[test]
    fn task_with_no_parsed_logs_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let task = tmp.path().join("art_to_clipart");
        write_trial(&task, "1", "* average: 90.0%\n");

        let err = parse_task_dir(&task, &average_matcher()).unwrap_err();
        assert!(err.to_string().contains("nothing found"));
    }

    #[test]
    fn missing_log_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let task = tmp.path().join("art_to_clipart");
        fs::create_dir_all(task.join("1")).unwrap();

        assert!(parse_task_dir(&task, &average_matcher()).is_err());
    }

    #[test]
    fn class_matcher_keeps_log_order_and_last_value() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join(LOG_FILE);
        fs::write(
            &log,
            "Finish training\n\
             * class: 0 (alarm_clock) total: 20. correct: 18. acc: 90.0%\n\
             * class: 1 (backpack) total: 10. correct: 7. acc: 70.0%\n\
             * class: 0 (alarm_clock) total: 20. correct: 17. acc: 85.0%\n",
        )
        .unwrap();

        let run = parse_log(&log, &LineMatcher::ClassAcc).unwrap();
        assert_eq!(
            run.entries,
            vec![
                ("alarm_clock".to_string(), 85.0),
                ("backpack".to_string(), 70.0)
            ]
        );
    }

    #[test]
    fn scientific_notation_values_parse() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join(LOG_FILE);
        fs::write(&log, "Finish training\n* average: 9.1e+1%\n").unwrap();

        let run = parse_log(&log, &average_matcher()).unwrap();
        assert!((run.entries[0].1 - 91.0).abs() < 1e-9);
    }

    #[test]
    fn subdirs_are_sorted_and_hidden_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("2")).unwrap();
        fs::create_dir_all(tmp.path().join("1")).unwrap();
        fs::create_dir_all(tmp.path().join(".cache")).unwrap();
        fs::write(tmp.path().join("stray.txt"), "x").unwrap();

        let dirs = list_subdirs(tmp.path()).unwrap();
        let names: Vec<_> =
            dirs.iter().map(|p| p.file_name().unwrap().to_str().unwrap().to_owned()).collect();
        assert_eq!(names, vec!["1", "2"]);
    }

    #[test]
    fn method_follows_path_convention() {
        assert_eq!(method_from_path(Path::new("output/DAPL/officehome/run1")), "DAPL");
        assert_eq!(method_from_path(Path::new("output")), "unknown");
    }

    #[test]
    fn std_dev_is_population() {
        let values = [90.0, 92.0];
        assert!((std_dev(&values) - 1.0).abs() < 1e-9);
        assert!((mean(&values) - 91.0).abs() < 1e-9);
    }
}
