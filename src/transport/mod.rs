//! # Printer Transport Layer
//!
//! This module moves finished print jobs to the printer. Every backend
//! implements [`Transport`]; [`open`] picks the backend for the configured
//! platform once, when a session is created.
//!
//! ## Available Transports
//!
//! | Platform | Transport | Addressed by |
//! |----------|-----------|--------------|
//! | linux    | [`device::DeviceFile`] | device path (`/dev/usb/lp0`, `/dev/ttyUSB0`) |
//! | windows  | `spooler::Spooler` (Windows builds) | printer queue name |
//! | macos    | `usb::UsbPrinter` (`usb` feature) | USB vendor/product ids |
//!
//! [`capture::Capture`] records jobs in memory instead of printing them.

pub mod capture;
pub mod device;
#[cfg(windows)]
pub mod spooler;
#[cfg(feature = "usb")]
pub mod usb;

pub use capture::Capture;
pub use device::DeviceFile;

use crate::error::PrintError;
use crate::printer::{Platform, PrinterConfig};

/// Something a complete print job can be written to.
pub trait Transport {
    /// Deliver `data` to the printer in one job.
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError>;
}

/// Open the transport for the configured (or detected) platform.
///
/// Nothing is opened on the device yet; the first [`Transport::send`] does
/// that, so a session can be built while the printer is still off.
pub fn open(config: &PrinterConfig) -> Result<Box<dyn Transport>, PrintError> {
    let platform = config.resolved_platform()?;
    log::debug!("transport: platform {}", platform);

    match platform {
        Platform::Linux => Ok(Box::new(DeviceFile::new(&config.printer_name))),
        Platform::Windows => open_spooler(config),
        Platform::Macos => match config.usb {
            Some(usb) => open_usb(usb),
            None => Err(PrintError::UsbInfoMissing(platform.to_string())),
        },
    }
}

#[cfg(windows)]
fn open_spooler(config: &PrinterConfig) -> Result<Box<dyn Transport>, PrintError> {
    Ok(Box::new(spooler::Spooler::new(&config.printer_name)))
}

#[cfg(not(windows))]
fn open_spooler(_config: &PrinterConfig) -> Result<Box<dyn Transport>, PrintError> {
    Err(PrintError::UnsupportedPlatform(
        "windows (the spooler transport needs a Windows build)".to_string(),
    ))
}

#[cfg(feature = "usb")]
fn open_usb(device: crate::printer::UsbDevice) -> Result<Box<dyn Transport>, PrintError> {
    Ok(Box::new(usb::UsbPrinter::new(device)))
}

#[cfg(not(feature = "usb"))]
fn open_usb(_device: crate::printer::UsbDevice) -> Result<Box<dyn Transport>, PrintError> {
    Err(PrintError::UnsupportedPlatform(
        "macos (rebuild with the `usb` feature)".to_string(),
    ))
}
