use std::io::Write;
use std::path::Path;
use std::time::Duration;

use super::TriggerPort;
use crate::error::{ExperimentError, Result};

const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// USB trigger box exposed as a serial device. The box resets its
/// output lines itself, so a code is a single byte write.
pub struct UsbTriggerPort {
    name: String,
    device: Box<dyn Write + Send>,
}

impl UsbTriggerPort {
    /// Opens the device in raw mode at `baud_rate`.
    pub fn open(path: &Path, baud_rate: u32) -> Result<Self> {
        if !path.exists() {
            return Err(ExperimentError::Trigger(format!(
                "USB trigger device {} not found",
                path.display()
            )));
        }
        let device = serialport::new(path.to_string_lossy().into_owned(), baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| {
                ExperimentError::Trigger(format!("failed to open {}: {}", path.display(), e))
            })?;

        Ok(Self::from_writer(
            format!("usb:{}@{}", path.display(), baud_rate),
            Box::new(device),
        ))
    }

    pub fn from_writer(name: String, device: Box<dyn Write + Send>) -> Self {
        Self { name, device }
    }
}

impl TriggerPort for UsbTriggerPort {
    fn write_code(&mut self, code: u8) -> Result<()> {
        self.device.write_all(&[code])?;
        self.device.flush()?;
        Ok(())
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
