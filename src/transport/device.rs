//! # Device File Transport
//!
//! Writes jobs straight to a character device, the way Linux exposes
//! receipt printers:
//!
//! | Device            | Printer connection |
//! |-------------------|--------------------|
//! | `/dev/usb/lp0`    | USB printer class  |
//! | `/dev/ttyUSB0`    | USB serial adapter |
//! | `/dev/rfcomm0`    | Bluetooth SPP      |
//!
//! ## TTY Configuration
//!
//! Serial devices are switched to raw mode before the first write so the
//! binary raster data reaches the printer unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL off
//! - **No flow control**: IXON, IXOFF, IXANY off (0x11 and 0x13 occur in
//!   raster data)
//! - **No output processing**: OPOST off (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN off
//!
//! Non-TTY devices (`lp`) are written as they are.

use std::fs::OpenOptions;
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

use super::Transport;
use crate::error::PrintError;

/// Bytes per `write` call.
const CHUNK_SIZE: usize = 4096;

/// # Device File Printer
///
/// Opens the device for every job and closes it afterwards.
///
/// ## Example
///
/// ```no_run
/// use rollprint::transport::{DeviceFile, Transport};
///
/// let mut printer = DeviceFile::new("/dev/usb/lp0");
/// printer.send(&[0x1B, 0x40])?;
/// # Ok::<(), rollprint::error::PrintError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeviceFile {
    path: PathBuf,
}

impl DeviceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Transport for DeviceFile {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        let name = self.path.display().to_string();
        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PrintError::DeviceNotFound(name.clone()),
                ErrorKind::PermissionDenied => PrintError::PermissionDenied(name.clone()),
                _ => PrintError::Transport(format!("Failed to open {}: {}", name, e)),
            })?;

        configure_if_tty(&file)?;

        log::info!("sending {} bytes to {}", data.len(), name);
        for chunk in data.chunks(CHUNK_SIZE) {
            file.write_all(chunk)
                .map_err(|e| PrintError::Transport(format!("Write failed: {}", e)))?;
        }
        file.flush()
            .map_err(|e| PrintError::Transport(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

#[cfg(unix)]
fn configure_if_tty(file: &std::fs::File) -> Result<(), PrintError> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    if unsafe { libc::isatty(fd) } == 1 {
        log::debug!("device is a tty, switching to raw mode");
        configure_tty_raw(fd)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn configure_if_tty(_file: &std::fs::File) -> Result<(), PrintError> {
    Ok(())
}

/// Put a terminal file descriptor in raw 8-bit mode.
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), PrintError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PrintError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PrintError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}
