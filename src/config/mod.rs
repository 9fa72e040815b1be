// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ExperimentError, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub triggers: TriggersConfig,
    pub timing: TimingConfig,
    pub adaptation: AdaptationConfig,
    pub procedure: ProcedureConfig,
    pub texts: TextsConfig,
    pub stimuli: StimuliConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    Usb,
    Parport,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TriggersConfig {
    pub trigger_type: TriggerType,
    pub send_eeg_trigg: bool,
    #[serde(default = "default_usb_port")]
    pub usb_port: PathBuf,
    #[serde(default = "default_usb_baud_rate")]
    pub usb_baud_rate: u32,
    #[serde(default = "default_parport_device")]
    pub parport_device: PathBuf,
    #[serde(default = "default_parport_address")]
    pub parport_address: u64,
    #[serde(default = "default_trigger_time_ms")]
    pub trigger_time_ms: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimingConfig {
    pub iti_min: f64,
    pub iti_max: f64,
    pub star_duration: f64,
    pub max_wait: f64,
    pub feedback_duration: f64,
    pub speed_feedback_duration: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdaptationConfig {
    /// Interval (s) the participant tries to hit after the go cue.
    #[serde(default = "default_target_interval")]
    pub target_interval: f64,
    /// Starting tolerance in ms, restored after training.
    #[serde(default = "default_allowed_error")]
    pub initial_allowed_error: f64,
    #[serde(default = "default_allowed_error_step")]
    pub allowed_error_step: f64,
    #[serde(default)]
    pub allowed_error_min: Option<f64>,
    #[serde(default)]
    pub allowed_error_max: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcedureConfig {
    pub response_key: String,
    #[serde(default = "default_exit_key")]
    pub exit_key: String,
    pub speed_feedback: bool,
    pub n_train_trials: usize,
    pub n_trials_per_block: usize,
    pub n_neutral_trials_per_block: usize,
    #[serde(default = "default_block_repetitions")]
    pub n_block_repetitions: usize,
    pub feedback_types: Vec<String>,
    pub feedback_explanations: BTreeMap<String, String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TextsConfig {
    #[serde(default)]
    pub greeting_texts: Vec<String>,
    pub post_training_text: String,
    /// Formatted with `{block_num}` and `{f_expl}`.
    pub new_block_text: String,
    pub end_text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StimuliConfig {
    #[serde(default = "default_stimuli_dir")]
    pub stimuli_dir: PathBuf,
    pub experiment_version: String,
    pub screen_distance: f64,
    pub screen_height: f64,
    pub fixation_size: f64,
    pub star_size: f64,
    pub feedback_size: f64,
    pub face_feedback_size: f64,
    pub text_feedback_size: f64,
}

fn default_usb_port() -> PathBuf {
    PathBuf::from("/dev/ttyUSB0")
}

fn default_usb_baud_rate() -> u32 {
    115_200
}

fn default_parport_device() -> PathBuf {
    PathBuf::from("/dev/port")
}

fn default_parport_address() -> u64 {
    0x378
}

fn default_trigger_time_ms() -> f64 {
    3.0
}

fn default_target_interval() -> f64 {
    1.0
}

fn default_allowed_error() -> f64 {
    100.0
}

fn default_allowed_error_step() -> f64 {
    10.0
}

fn default_exit_key() -> String {
    "escape".to_string()
}

fn default_block_repetitions() -> usize {
    3
}

fn default_stimuli_dir() -> PathBuf {
    PathBuf::from("stimuli")
}

/// Block types that have a feedback stimulus set.
pub const FEEDBACK_TYPES: [&str; 6] = [
    "number",
    "facesimple",
    "facecomplex",
    "symbol",
    "color",
    "text",
];

/// Config durations are given in seconds.
pub fn seconds(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;
        for (name, value) in [
            ("iti_min", timing.iti_min),
            ("iti_max", timing.iti_max),
            ("star_duration", timing.star_duration),
            ("max_wait", timing.max_wait),
            ("feedback_duration", timing.feedback_duration),
            ("speed_feedback_duration", timing.speed_feedback_duration),
            ("trigger_time_ms", self.triggers.trigger_time_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ExperimentError::Config(format!(
                    "{} must be a finite non-negative duration, got {}",
                    name, value
                )));
            }
        }
        if timing.iti_min > timing.iti_max {
            return Err(ExperimentError::Config(format!(
                "iti_min ({}) is above iti_max ({})",
                timing.iti_min, timing.iti_max
            )));
        }

        let adaptation = &self.adaptation;
        for (name, value) in [
            ("target_interval", Some(adaptation.target_interval)),
            ("initial_allowed_error", Some(adaptation.initial_allowed_error)),
            ("allowed_error_step", Some(adaptation.allowed_error_step)),
            ("allowed_error_min", adaptation.allowed_error_min),
            ("allowed_error_max", adaptation.allowed_error_max),
        ] {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ExperimentError::Config(format!(
                        "{} must be finite, got {}",
                        name, value
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (adaptation.allowed_error_min, adaptation.allowed_error_max)
        {
            if min > max {
                return Err(ExperimentError::Config(format!(
                    "allowed_error_min ({}) is above allowed_error_max ({})",
                    min, max
                )));
            }
        }

        let procedure = &self.procedure;
        if procedure.response_key.is_empty() {
            return Err(ExperimentError::Config("response_key is empty".to_string()));
        }
        if procedure.response_key == procedure.exit_key {
            return Err(ExperimentError::Config(
                "response_key and exit_key must differ".to_string(),
            ));
        }
        if procedure.n_neutral_trials_per_block > procedure.n_trials_per_block {
            return Err(ExperimentError::Config(format!(
                "n_neutral_trials_per_block ({}) exceeds n_trials_per_block ({})",
                procedure.n_neutral_trials_per_block, procedure.n_trials_per_block
            )));
        }
        for block_type in &procedure.feedback_types {
            if !FEEDBACK_TYPES.contains(&block_type.as_str()) {
                return Err(ExperimentError::Config(format!(
                    "unknown feedback type: {}",
                    block_type
                )));
            }
            if !procedure.feedback_explanations.contains_key(block_type) {
                return Err(ExperimentError::Config(format!(
                    "missing feedback explanation for {}",
                    block_type
                )));
            }
        }

        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let config_str = fs::read_to_string(path.as_ref()).map_err(|e| {
        ExperimentError::Config(format!(
            "failed to read config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;

    let config: Config = serde_yaml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)?;
    fs::write(path, yaml)?;
    Ok(())
}
