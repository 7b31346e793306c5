//! # Printer Configuration
//!
//! This module defines the public configuration surface of a print session
//! and the named presets the builder methods accept.
//!
//! ## Paper Widths
//!
//! | Preset | Width (dots) | Width (bytes) |
//! |--------|--------------|---------------|
//! | 58mm   | 384          | 48            |
//! | 80mm   | 512          | 64            |
//!
//! ## Usage
//!
//! ```
//! use rollprint::printer::{PaperWidth, Platform, PrinterConfig};
//!
//! let config = PrinterConfig::new("/dev/usb/lp0", PaperWidth::Mm58)
//!     .with_padding(8)
//!     .with_platform(Platform::Linux);
//! assert_eq!(config.width_dots(), 384);
//! assert_eq!(config.content_width(), 368);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PrintError;

// ============================================================================
// PAPER WIDTH
// ============================================================================

/// Paper roll width preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperWidth {
    /// 58mm roll, 384 dots at 203 DPI
    #[serde(rename = "58mm")]
    Mm58,
    /// 80mm roll, 512 dots at 203 DPI
    #[serde(rename = "80mm")]
    Mm80,
}

impl PaperWidth {
    /// Printable width in dots.
    #[inline]
    pub const fn dots(self) -> u32 {
        match self {
            Self::Mm58 => 384,
            Self::Mm80 => 512,
        }
    }
}

impl Default for PaperWidth {
    fn default() -> Self {
        Self::Mm58
    }
}

impl FromStr for PaperWidth {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "58mm" => Ok(Self::Mm58),
            "80mm" => Ok(Self::Mm80),
            other => Err(PrintError::Config(format!(
                "Invalid paper width '{}'. Choose '58mm' or '80mm'",
                other
            ))),
        }
    }
}

impl fmt::Display for PaperWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mm58 => f.write_str("58mm"),
            Self::Mm80 => f.write_str("80mm"),
        }
    }
}

// ============================================================================
// PLATFORM
// ============================================================================

/// Host platform, which decides how bytes reach the printer.
///
/// | Platform | Transport |
/// |----------|-----------|
/// | windows  | Print spooler, RAW datatype |
/// | linux    | Device file (`/dev/usb/lp0`, `/dev/ttyUSB0`, ...) |
/// | macos    | USB bulk endpoint (needs vendor/product ids) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Macos,
}

impl Platform {
    /// Detect the platform from the operating system this binary was built for.
    pub fn detect() -> Result<Self, PrintError> {
        if cfg!(target_os = "windows") {
            Ok(Self::Windows)
        } else if cfg!(target_os = "linux") {
            Ok(Self::Linux)
        } else if cfg!(target_os = "macos") {
            Ok(Self::Macos)
        } else {
            Err(PrintError::UnsupportedPlatform(
                std::env::consts::OS.to_string(),
            ))
        }
    }

    /// Whether this platform's transport addresses the printer by USB ids.
    pub fn needs_usb_ids(self) -> bool {
        matches!(self, Self::Macos)
    }
}

impl FromStr for Platform {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Macos),
            other => Err(PrintError::Config(format!(
                "Unsupported platform '{}'. Use 'windows', 'linux' or 'macos'",
                other
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::Linux => f.write_str("linux"),
            Self::Macos => f.write_str("macos"),
        }
    }
}

// ============================================================================
// USB DEVICE
// ============================================================================

fn default_usb_endpoint() -> u8 {
    0x01
}

/// USB addressing for printers reached over a bulk endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Interface to claim (usually 0 on receipt printers)
    #[serde(default)]
    pub interface: u8,
    /// Bulk OUT endpoint address
    #[serde(default = "default_usb_endpoint")]
    pub endpoint: u8,
}

impl UsbDevice {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            interface: 0,
            endpoint: default_usb_endpoint(),
        }
    }
}

// ============================================================================
// PRINTER CONFIG
// ============================================================================

/// # Printer Configuration
///
/// Everything a session needs to know about the printer it drives.
///
/// - **printer_name**: spooler queue name on Windows, device path on Linux
/// - **paper_width**: roll preset, fixes the receipt canvas width
/// - **default_font**: TrueType/OpenType file used when content names no font;
///   `None` selects the built-in bitmap font
/// - **padding_x**: blank dots kept on both sides of text and flex groups
/// - **platform**: transport selector, detected from the host when unset
/// - **usb**: ids for platforms that write to a USB endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterConfig {
    #[serde(default)]
    pub printer_name: String,
    #[serde(default)]
    pub paper_width: PaperWidth,
    #[serde(default)]
    pub default_font: Option<PathBuf>,
    #[serde(default)]
    pub padding_x: u32,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub usb: Option<UsbDevice>,
}

impl PrinterConfig {
    pub fn new(printer_name: impl Into<String>, paper_width: PaperWidth) -> Self {
        Self {
            printer_name: printer_name.into(),
            paper_width,
            default_font: None,
            padding_x: 0,
            platform: None,
            usb: None,
        }
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_font = Some(path.into());
        self
    }

    pub fn with_padding(mut self, padding_x: u32) -> Self {
        self.padding_x = padding_x;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_usb(mut self, usb: UsbDevice) -> Self {
        self.usb = Some(usb);
        self
    }

    /// Receipt canvas width in dots.
    #[inline]
    pub fn width_dots(&self) -> u32 {
        self.paper_width.dots()
    }

    /// Width left for text and flex groups once padding is removed.
    #[inline]
    pub fn content_width(&self) -> u32 {
        self.width_dots().saturating_sub(self.padding_x.saturating_mul(2))
    }

    /// The explicit platform, or the detected one.
    pub fn resolved_platform(&self) -> Result<Platform, PrintError> {
        match self.platform {
            Some(platform) => Ok(platform),
            None => Platform::detect(),
        }
    }

    /// Check values that serde or the builders cannot rule out.
    pub fn validate(&self) -> Result<(), PrintError> {
        if self.content_width() == 0 {
            return Err(PrintError::Config(format!(
                "Padding of {} dots leaves no room on {} paper",
                self.padding_x, self.paper_width
            )));
        }
        let platform = self.resolved_platform()?;
        if platform.needs_usb_ids() && self.usb.is_none() {
            return Err(PrintError::UsbInfoMissing(platform.to_string()));
        }
        Ok(())
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::new(String::new(), PaperWidth::default())
    }
}

// ============================================================================
// PRESETS
// ============================================================================

/// Named font sizes, in pixels per em.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Xxs,
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl FontSize {
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Xxs => 16,
            Self::Xs => 20,
            Self::Sm => 24,
            Self::Md => 28,
            Self::Lg => 32,
            Self::Xl => 36,
            Self::Xxl => 40,
        }
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::Md
    }
}

impl FromStr for FontSize {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xxs" => Ok(Self::Xxs),
            "xs" => Ok(Self::Xs),
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            "xl" => Ok(Self::Xl),
            "xxl" => Ok(Self::Xxl),
            other => Err(PrintError::Config(format!(
                "Invalid font size '{}'. Choose one of xxs, xs, sm, md, lg, xl, xxl",
                other
            ))),
        }
    }
}

/// Named QR code sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrSize {
    Sm,
    Md,
    Lg,
}

impl QrSize {
    /// Dots per QR module.
    pub const fn module_size(self) -> u32 {
        match self {
            Self::Sm => 8,
            Self::Md => 10,
            Self::Lg => 16,
        }
    }

    /// Quiet zone width in modules.
    pub const fn border_modules(self) -> u32 {
        2
    }
}

impl Default for QrSize {
    fn default() -> Self {
        Self::Lg
    }
}

impl FromStr for QrSize {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            other => Err(PrintError::Config(format!(
                "Invalid QR size '{}'. Choose 'sm', 'md' or 'lg'",
                other
            ))),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_width_dots() {
        assert_eq!(PaperWidth::Mm58.dots(), 384);
        assert_eq!(PaperWidth::Mm80.dots(), 512);
        assert_eq!("80mm".parse::<PaperWidth>().unwrap(), PaperWidth::Mm80);
    }

    #[test]
    fn test_paper_width_rejects_unknown() {
        let err = "76mm".parse::<PaperWidth>().unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("Linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert!(matches!(
            "beos".parse::<Platform>(),
            Err(PrintError::Config(_))
        ));
    }

    #[test]
    fn test_content_width_subtracts_padding() {
        let config = PrinterConfig::new("lp0", PaperWidth::Mm80).with_padding(16);
        assert_eq!(config.content_width(), 480);
    }

    #[test]
    fn test_validate_rejects_padding_that_eats_the_paper() {
        let config = PrinterConfig::new("lp0", PaperWidth::Mm58)
            .with_padding(192)
            .with_platform(Platform::Linux);
        assert!(matches!(config.validate(), Err(PrintError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_padding_too_large_to_double() {
        let config = PrinterConfig::new("", PaperWidth::Mm58)
            .with_padding(u32::MAX / 2 + 1)
            .with_platform(Platform::Linux);
        assert_eq!(config.content_width(), 0);
        assert!(matches!(config.validate(), Err(PrintError::Config(_))));
    }

    #[test]
    fn test_validate_requires_usb_ids_on_macos() {
        let config = PrinterConfig::new("", PaperWidth::Mm58).with_platform(Platform::Macos);
        assert!(matches!(
            config.validate(),
            Err(PrintError::UsbInfoMissing(_))
        ));

        let config = config.with_usb(UsbDevice::new(0x0416, 0x5011));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_font_size_presets() {
        assert_eq!(FontSize::default().pixels(), 28);
        assert_eq!("xxl".parse::<FontSize>().unwrap().pixels(), 40);
        assert!("huge".parse::<FontSize>().is_err());
    }

    #[test]
    fn test_qr_size_presets() {
        assert_eq!(QrSize::Sm.module_size(), 8);
        assert_eq!(QrSize::Md.module_size(), 10);
        assert_eq!(QrSize::Lg.module_size(), 16);
        assert_eq!(QrSize::Lg.border_modules(), 2);
        assert!("xl".parse::<QrSize>().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "printer_name": "/dev/usb/lp1",
            "paper_width": "80mm",
            "padding_x": 4,
            "platform": "linux"
        }"#;
        let config: PrinterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.width_dots(), 512);
        assert_eq!(config.platform, Some(Platform::Linux));
        assert_eq!(config.default_font, None);
    }
}
