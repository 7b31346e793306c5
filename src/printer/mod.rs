//! # Printer Module
//!
//! This module provides the printer configuration and the named presets.
//!
//! ## Modules
//!
//! - [`config`]: Paper width, platform, padding, fonts, size presets

pub mod config;

pub use config::{FontSize, PaperWidth, Platform, PrinterConfig, QrSize, UsbDevice};
