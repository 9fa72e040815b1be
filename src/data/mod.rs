// src/data/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::task::trial::TrialRecord;
use crate::triggers::TriggerEvent;

pub const BEHAVIORAL_DIR: &str = "behavioral_data";
pub const TRIGGERS_DIR: &str = "triggers_maps";
pub const LOGS_DIR: &str = "logs";

/// Session log plus the files it is written to.
pub struct DataSaver {
    pub beh: Vec<TrialRecord>,
    results_dir: PathBuf,
    session_id: String,
}

impl DataSaver {
    pub fn new<P: AsRef<Path>>(results_dir: P, session_id: &str) -> Self {
        Self {
            beh: Vec::new(),
            results_dir: results_dir.as_ref().to_path_buf(),
            session_id: session_id.to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_dir(&self) -> PathBuf {
        self.results_dir.join(LOGS_DIR)
    }

    pub fn beh_path(&self) -> PathBuf {
        self.results_dir
            .join(BEHAVIORAL_DIR)
            .join(format!("{}.csv", self.session_id))
    }

    pub fn triggers_path(&self) -> PathBuf {
        self.results_dir
            .join(TRIGGERS_DIR)
            .join(format!("{}.csv", self.session_id))
    }

    pub fn save_beh(&self) -> Result<PathBuf> {
        let path = self.beh_path();
        write_csv(&path, &self.beh)?;
        tracing::info!("saved {} trials to {}", self.beh.len(), path.display());
        Ok(path)
    }

    pub fn save_triggers(&self, events: &[TriggerEvent]) -> Result<PathBuf> {
        let path = self.triggers_path();
        write_csv(&path, events)?;
        tracing::info!("saved {} triggers to {}", events.len(), path.display());
        Ok(path)
    }
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
