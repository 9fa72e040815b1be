//! Presentation and input collaborators of the task.
//!
//! # Components
//! - `Frontend`: what the trial controller and session driver need from a display
//! - `terminal.rs`: crossterm implementation used by the binary

pub mod terminal;

use std::time::{Duration, Instant};

use crate::error::Result;
use crate::stimuli::Stimulus;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyPress {
    pub key: String,
    /// Seconds since the reference instant passed to `wait_keys`.
    pub rt: f64,
}

pub trait Frontend {
    /// Keep `stimulus` on screen for every following flip (or stop drawing it).
    fn set_auto_draw(&mut self, stimulus: &Stimulus, on: bool);

    /// Present the next frame; returns the flip time.
    fn flip(&mut self) -> Result<Instant>;

    fn wait(&mut self, duration: Duration) -> Result<()>;

    /// Drop pending key events.
    fn clear_events(&mut self);

    /// Block until a key from `keys` is pressed or `max_wait` elapses.
    /// Returns `None` on timeout; reaction times are measured from `since`.
    fn wait_keys(
        &mut self,
        keys: &[String],
        max_wait: Duration,
        since: Instant,
    ) -> Result<Option<Vec<KeyPress>>>;

    /// Non-blocking check for the operator's exit key.
    fn exit_requested(&mut self) -> Result<bool>;

    /// Show an instruction screen for `duration`, or until a key is pressed when `None`.
    fn show_info(&mut self, text: &str, duration: Option<Duration>) -> Result<()>;
}
