// src/analysis/response_stats.rs
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::data::BEHAVIORAL_DIR;
use crate::error::{ExperimentError, Result};

pub type Row = HashMap<String, String>;

pub const EXPERIMENT_BLOCK: &str = "experiment";

/// Most recently created `*.csv` in `<results_dir>/behavioral_data`.
pub fn most_recent_file<P: AsRef<Path>>(results_dir: P) -> Result<PathBuf> {
    let data_dir = results_dir.as_ref().join(BEHAVIORAL_DIR);
    if !data_dir.is_dir() {
        return Err(ExperimentError::NoResults(data_dir.display().to_string()));
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(&data_dir)? {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "csv") {
            continue;
        }
        let metadata = fs::metadata(&path)?;
        // Creation time is not available on every filesystem.
        let created = metadata.created().or_else(|_| metadata.modified())?;
        if newest.as_ref().map_or(true, |(time, _)| created >= *time) {
            newest = Some((created, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| ExperimentError::NoResults(data_dir.display().to_string()))
}

pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: Row = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Rows whose `block_type` equals `block_type`, in file order.
pub fn filter_block_type(rows: &[Row], block_type: &str) -> Vec<Row> {
    rows.iter()
        .filter(|row| row.get("block_type").map(String::as_str) == Some(block_type))
        .cloned()
        .collect()
}

/// Rows whose `block_type` is anything but `excluded`, in file order.
pub fn filter_other_block_types(rows: &[Row], excluded: &str) -> Vec<Row> {
    rows.iter()
        .filter(|row| row.get("block_type").map(String::as_str) != Some(excluded))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub n_trials: usize,
    pub feedback_counts: BTreeMap<String, usize>,
    pub acc_counts: BTreeMap<String, usize>,
    pub n_responses: usize,
    pub mean_rt: Option<f64>,
}

pub fn summarize(rows: &[Row]) -> Summary {
    let mut summary = Summary {
        n_trials: rows.len(),
        ..Summary::default()
    };

    let mut rt_sum = 0.0;
    for row in rows {
        if let Some(feedback) = row.get("feedback") {
            *summary.feedback_counts.entry(feedback.clone()).or_insert(0) += 1;
        }
        if let Some(acc) = row.get("acc") {
            *summary.acc_counts.entry(acc.clone()).or_insert(0) += 1;
        }
        if let Some(rt) = row.get("rt").and_then(|rt| rt.parse::<f64>().ok()) {
            rt_sum += rt;
            summary.n_responses += 1;
        }
    }
    if summary.n_responses > 0 {
        summary.mean_rt = Some(rt_sum / summary.n_responses as f64);
    }
    summary
}
