use serde::Serialize;
use std::time::Duration;

use super::{TriggerKind, TriggerPort};
use crate::error::{ExperimentError, Result};

/// Codes cycle through 1..=MAX_TRIGGER_CODE in order of preparation.
pub const MAX_TRIGGER_CODE: u8 = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerEvent {
    pub code: u8,
    pub name: String,
}

pub struct TriggerHandler {
    port: Option<Box<dyn TriggerPort>>,
    pulse: Duration,
    last_code: u8,
    pending: Option<TriggerEvent>,
    events: Vec<TriggerEvent>,
    trial_start: Option<usize>,
}

impl TriggerHandler {
    pub fn new(port: Option<Box<dyn TriggerPort>>, pulse: Duration) -> Self {
        Self {
            port,
            pulse,
            last_code: 0,
            pending: None,
            events: Vec::new(),
            trial_start: None,
        }
    }

    /// Marks the start of a trial; triggers sent until `close_trial` are tagged with its outcome.
    pub fn open_trial(&mut self) {
        self.trial_start = Some(self.events.len());
    }

    pub fn prepare_trigger(&mut self, kind: TriggerKind) {
        self.last_code = self.last_code % MAX_TRIGGER_CODE + 1;
        self.pending = Some(TriggerEvent {
            code: self.last_code,
            name: kind.name().to_string(),
        });
    }

    pub fn send_trigger(&mut self) -> Result<()> {
        let event = self.pending.take().ok_or_else(|| {
            ExperimentError::Trigger("send_trigger called without a prepared trigger".to_string())
        })?;

        if let Some(port) = self.port.as_mut() {
            port.write_code(event.code)?;
            port.finish_pulse(self.pulse)?;
        }
        tracing::debug!("trigger {} ({})", event.code, event.name);
        self.events.push(event);
        Ok(())
    }

    /// Appends the trial outcome to every trigger name sent since `open_trial`.
    pub fn close_trial(&mut self, outcome: &str) {
        if let Some(start) = self.trial_start.take() {
            for event in &mut self.events[start..] {
                event.name = format!("{}*{}", event.name, outcome);
            }
        }
    }

    pub fn events(&self) -> &[TriggerEvent] {
        &self.events
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }
}
