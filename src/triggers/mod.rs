pub mod handler;
pub mod parport;
pub mod usb;

pub use handler::{TriggerEvent, TriggerHandler};

use crate::config::{TriggerType, TriggersConfig};
use crate::error::Result;

use std::time::Duration;

/// Phase markers sent to the EEG recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Fixation,
    StarStart,
    StarEnd,
    Reaction,
    FeedbackPos,
    FeedbackNeg,
    FeedbackNeu,
    TooSlow,
    TooFast,
    BlockStart,
}

impl TriggerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TriggerKind::Fixation => "fixation",
            TriggerKind::StarStart => "star_start",
            TriggerKind::StarEnd => "star_end",
            TriggerKind::Reaction => "reaction",
            TriggerKind::FeedbackPos => "feedback_pos",
            TriggerKind::FeedbackNeg => "feedback_neg",
            TriggerKind::FeedbackNeu => "feedback_neu",
            TriggerKind::TooSlow => "too_slow",
            TriggerKind::TooFast => "too_fast",
            TriggerKind::BlockStart => "block_start",
        }
    }
}

/// A device that can put a trigger code on the EEG amplifier's input.
pub trait TriggerPort: Send {
    fn write_code(&mut self, code: u8) -> Result<()>;

    /// Called after `write_code`; ports whose lines stay latched return them to zero.
    fn finish_pulse(&mut self, _pulse: Duration) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> String;
}

/// Opens the port selected by the trigger type, or `None` when EEG triggers are off.
pub fn create_eeg_port(config: &TriggersConfig) -> Result<Option<Box<dyn TriggerPort>>> {
    if !config.send_eeg_trigg {
        return Ok(None);
    }

    let port: Box<dyn TriggerPort> = match config.trigger_type {
        TriggerType::Usb => Box::new(usb::UsbTriggerPort::open(
            &config.usb_port,
            config.usb_baud_rate,
        )?),
        TriggerType::Parport => Box::new(parport::ParallelPort::open(
            &config.parport_device,
            config.parport_address,
        )?),
    };
    tracing::info!("EEG trigger port opened: {}", port.name());
    Ok(Some(port))
}
