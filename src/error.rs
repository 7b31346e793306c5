//! # Error Types
//!
//! This module defines error types used throughout the rollprint library.
//!
//! Failures fall into three families:
//!
//! - **Configuration**: a bad paper width, platform, alignment or size preset.
//!   Reported by the call that introduced the value.
//! - **Resource**: the printer device is missing, not writable, or needs USB
//!   ids that were not given. Never retried.
//! - **Layout**: content that cannot be turned into a canvas (QR payload too
//!   large, groups nested too deep). No canvas is produced and nothing is sent.
//!
//! An unloadable font is not an error: the built-in bitmap font is used instead.

use thiserror::Error;

/// Main error type for rollprint operations
#[derive(Debug, Error)]
pub enum PrintError {
    /// Invalid configuration value (paper width, platform, preset name)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The printer device or queue does not exist
    #[error("Printer '{0}' not found")]
    DeviceNotFound(String),

    /// The printer device exists but cannot be opened for writing
    #[error("Permission denied to access printer '{0}'")]
    PermissionDenied(String),

    /// The selected platform talks to the printer over USB and needs its ids
    #[error("USB vendor/product ids are required on platform '{0}'")]
    UsbInfoMissing(String),

    /// The selected platform has no transport in this build
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Transport-level errors (write, flush, spooler calls)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Content that cannot be laid out
    #[error("Layout error: {0}")]
    Layout(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed receipt document
    #[error("Document error: {0}")]
    Document(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
