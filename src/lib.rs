pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod frontend;
pub mod stimuli;
pub mod task;
pub mod triggers;
pub mod utils;

pub use error::{ExperimentError, Result};
