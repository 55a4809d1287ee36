//! Driver logic for the two result collectors.
//!
//! Both scan a sweep output directory laid out as
//! `<root>/<source>_to_<target>/<trial>/log.txt`, aggregate with
//! [`dabench_core::collect`] and write a fixed-width summary table back into
//! the scanned root. Kept out of the binaries so the end-to-end table
//! output is unit-testable.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use dabench_core::collect::{
    LineMatcher, TaskSummary, list_subdirs, mean, method_from_path, metric_patterns,
    parse_task_dir,
};
use dabench_core::report::{float_cell, format_row};
use dabench_core::task::task_code;

/// Metrics the per-metric collector scrapes.
pub const METRIC_NAMES: &[&str] = &["average"];

/// Output file name of the per-class collector.
pub const CLS_OUTPUT: &str = "collect_cls.txt";

/// Output file name of the per-metric collector.
pub const RESULTS_OUTPUT: &str = "collect_results.txt";

fn print_banner(base_dir: &Path) {
    println!("*****************************************************************");
    println!("Extract results from {}", base_dir.display());
    println!("*****************************************************************\n");
}

fn scan_tasks(base_dir: &Path, matcher: &LineMatcher) -> Result<Vec<(String, TaskSummary)>> {
    let mut tasks = Vec::new();
    for dir in list_subdirs(base_dir)? {
        let summary = parse_task_dir(&dir, matcher)?;
        let name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .context("task directory has a non-UTF-8 name")?;
        tasks.push((task_code(name)?, summary));
    }
    if tasks.is_empty() {
        bail!("no task directories found in {}", base_dir.display());
    }
    Ok(tasks)
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Per-class collector: one row per task, one column per class, a trailing
/// row-average column. Writes [`CLS_OUTPUT`] into `base_dir` and returns its
/// path.
pub fn collect_cls(base_dir: &Path) -> Result<PathBuf> {
    let method = method_from_path(base_dir);
    print_banner(base_dir);

    let tasks = scan_tasks(base_dir, &LineMatcher::ClassAcc)?;

    // Class columns come from the first task; every log is expected to
    // report the same classes in the same order.
    let class_names: Vec<String> =
        tasks[0].1.metrics.iter().map(|(name, _)| name.clone()).collect();
    println!("{class_names:?}");

    println!("Average performance");
    let mut rows: Vec<(String, Vec<f64>)> = Vec::new();
    for (task, summary) in &tasks {
        let mut accs: Vec<f64> = summary.metrics.iter().map(|(_, v)| *v).collect();
        let avg = mean(&accs);
        println!("* {task}: {avg:.1}%");
        accs.push(avg);
        rows.push((task.clone(), accs));
    }

    let out_path = base_dir.join(CLS_OUTPUT);
    let mut out = create_output(&out_path)?;
    let mut header = vec![method];
    header.extend(class_names);
    header.push("AVG".to_string());
    out.write_all(format_row(&header).as_bytes())?;
    for (task, accs) in &rows {
        let mut cells = vec![task.clone()];
        cells.extend(accs.iter().map(|v| float_cell(*v)));
        out.write_all(format_row(&cells).as_bytes())?;
    }
    out.flush()?;

    println!("wrote {}", out_path.display());
    Ok(out_path)
}

/// Per-metric collector: one row per metric, one column per task, the
/// cross-task average leading each row. Writes [`RESULTS_OUTPUT`] into
/// `base_dir` and returns its path.
pub fn collect_results(base_dir: &Path) -> Result<PathBuf> {
    let method = method_from_path(base_dir);
    print_banner(base_dir);

    let matcher = LineMatcher::Metrics(metric_patterns(METRIC_NAMES)?);
    let tasks = scan_tasks(base_dir, &matcher)?;

    // Metric name -> per-task means, in task order.
    let mut final_results: Vec<(String, Vec<f64>)> = Vec::new();
    let mut task_codes: Vec<String> = vec!["Avg".to_string()];
    for (task, summary) in tasks {
        for (name, value) in summary.metrics {
            match final_results.iter_mut().find(|(n, _)| *n == name) {
                Some((_, values)) => values.push(value),
                None => final_results.push((name, vec![value])),
            }
        }
        task_codes.push(task);
    }

    println!("Average performance");
    for (name, values) in &mut final_results {
        let avg = mean(values);
        println!("* {name}: {avg:.1}%");
        values.insert(0, avg);
    }

    let out_path = base_dir.join(RESULTS_OUTPUT);
    let mut out = create_output(&out_path)?;
    let mut header = vec![method];
    header.extend(task_codes);
    out.write_all(format_row(&header).as_bytes())?;
    for name in METRIC_NAMES {
        let mut cells = vec![name.to_string()];
        if let Some((_, values)) = final_results.iter().find(|(n, _)| n == name) {
            cells.extend(values.iter().map(|v| float_cell(*v)));
        }
        out.write_all(format_row(&cells).as_bytes())?;
    }
    out.flush()?;

    println!("wrote {}", out_path.display());
    Ok(out_path)
}
