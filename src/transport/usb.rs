//! # USB Bulk Transport
//!
//! Writes jobs to the bulk OUT endpoint of a USB printer found by vendor and
//! product id. Used on macOS, where receipt printers get no device file.
//!
//! ```text
//! open(vid, pid) → detach kernel driver (if any) → claim interface
//!   → write_bulk × n → release interface
//! ```

use std::time::Duration;

use rusb::UsbContext;

use super::Transport;
use crate::error::PrintError;
use crate::printer::UsbDevice;

/// Bytes per bulk transfer.
const CHUNK_SIZE: usize = 4096;

/// Timeout for one bulk transfer.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct UsbPrinter {
    device: UsbDevice,
}

impl UsbPrinter {
    pub fn new(device: UsbDevice) -> Self {
        Self { device }
    }

    fn name(&self) -> String {
        format!("{:04x}:{:04x}", self.device.vendor_id, self.device.product_id)
    }

    fn map_error(&self, call: &str, e: rusb::Error) -> PrintError {
        match e {
            rusb::Error::Access => PrintError::PermissionDenied(self.name()),
            rusb::Error::NoDevice | rusb::Error::NotFound => {
                PrintError::DeviceNotFound(self.name())
            }
            other => {
                PrintError::Transport(format!("{} failed for {}: {}", call, self.name(), other))
            }
        }
    }
}

impl Transport for UsbPrinter {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        let context = rusb::GlobalContext::default();
        let mut handle = context
            .open_device_with_vid_pid(self.device.vendor_id, self.device.product_id)
            .ok_or_else(|| PrintError::DeviceNotFound(self.name()))?;

        let interface = self.device.interface;
        if handle.kernel_driver_active(interface).unwrap_or(false) {
            handle
                .detach_kernel_driver(interface)
                .map_err(|e| self.map_error("detach_kernel_driver", e))?;
        }
        handle
            .claim_interface(interface)
            .map_err(|e| self.map_error("claim_interface", e))?;

        log::info!("sending {} bytes to USB printer {}", data.len(), self.name());
        let mut result = Ok(());
        'chunks: for chunk in data.chunks(CHUNK_SIZE) {
            let mut offset = 0;
            while offset < chunk.len() {
                match handle.write_bulk(self.device.endpoint, &chunk[offset..], WRITE_TIMEOUT) {
                    Ok(0) => {
                        result = Err(PrintError::Transport(format!(
                            "USB printer {} accepted no data",
                            self.name()
                        )));
                        break 'chunks;
                    }
                    Ok(n) => offset += n,
                    Err(e) => {
                        result = Err(self.map_error("write_bulk", e));
                        break 'chunks;
                    }
                }
            }
        }

        if let Err(e) = handle.release_interface(interface) {
            log::warn!("release_interface failed for {}: {}", self.name(), e);
        }
        result
    }
}
