use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use super::TriggerPort;
use crate::error::{ExperimentError, Result};

/// Parallel port data register, written through an I/O port device
/// (`/dev/port` at the port's base address). Data lines stay latched,
/// so every pulse is followed by a zero.
pub struct ParallelPort {
    path: PathBuf,
    address: u64,
    device: File,
}

impl ParallelPort {
    pub fn open(path: &Path, address: u64) -> Result<Self> {
        let device = OpenOptions::new().write(true).open(path).map_err(|e| {
            ExperimentError::Trigger(format!(
                "failed to open parallel port device {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut port = Self {
            path: path.to_path_buf(),
            address,
            device,
        };
        port.set_data(0)?;
        Ok(port)
    }

    fn set_data(&mut self, value: u8) -> Result<()> {
        self.device.seek(SeekFrom::Start(self.address))?;
        self.device.write_all(&[value])?;
        self.device.flush()?;
        Ok(())
    }
}

impl TriggerPort for ParallelPort {
    fn write_code(&mut self, code: u8) -> Result<()> {
        self.set_data(code)
    }

    fn finish_pulse(&mut self, pulse: Duration) -> Result<()> {
        thread::sleep(pulse);
        self.set_data(0)
    }

    fn name(&self) -> String {
        format!("parport:{}@{:#x}", self.path.display(), self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_writes_code_then_clears_at_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("port");
        File::create(&path).unwrap();

        let mut port = ParallelPort::open(&path, 4).unwrap();
        port.write_code(5).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0, 0, 5]);

        port.finish_pulse(Duration::ZERO).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0, 0, 0]);
        assert_eq!(port.name(), format!("parport:{}@0x4", path.display()));
    }
}
