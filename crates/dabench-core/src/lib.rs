//! Support library for domain-adaptation benchmark experiments.
//!
//! Covers the three concerns the experiment tools share: reading image-list
//! manifests into labeled sample records, deriving reproducible seeds and
//! task codes for sweep runs, and scraping/aggregating trainer log files
//! into summary tables.

pub mod collect;
pub mod dataset;
pub mod datum;
pub mod report;
pub mod seed;
pub mod task;
