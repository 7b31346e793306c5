//! # Rollprint - Receipt Layout and ESC/POS Raster Printing
//!
//! Rollprint lays out a receipt (text, QR codes, images, spacers and nested
//! flex groups) as one monochrome bitmap and prints it on an ESC/POS thermal
//! printer with a single `GS v 0` raster command. It provides:
//!
//! - **Layout engine**: character-wrapped text, row-wrapping flex groups,
//!   vertical composition
//! - **Raster encoder**: thresholding, byte alignment, bit packing, job framing
//! - **Transports**: device files, the Windows spooler, USB bulk endpoints
//! - **Documents**: receipts described as JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use rollprint::{
//!     layout::{Alignment, Text},
//!     printer::{PaperWidth, Platform, PrinterConfig},
//!     session::Printer,
//! };
//!
//! let config = PrinterConfig::new("/dev/usb/lp0", PaperWidth::Mm58)
//!     .with_padding(8)
//!     .with_platform(Platform::Linux);
//! let mut printer = Printer::new(config)?;
//!
//! printer
//!     .text(Text::new("CHURRA MART").align(Alignment::Center).size(36))
//!     .between("Churros x3", "4.50")
//!     .between("TOTAL", "4.50")
//!     .qrcode("https://example.invalid/r/1001");
//! printer.print()?;
//!
//! # Ok::<(), rollprint::error::PrintError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Content model, text and flex layout, composition |
//! | [`render`] | Canvas, fonts, QR symbols, pictures |
//! | [`protocol`] | ESC/POS framing and raster encoding |
//! | [`session`] | The printer session driving layout and transport |
//! | [`transport`] | Device file, spooler, USB and in-memory backends |
//! | [`document`] | JSON receipt documents |
//! | [`printer`] | Configuration and presets |
//! | [`error`] | Error types |

pub mod document;
pub mod error;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use error::PrintError;
pub use printer::PrinterConfig;
pub use session::Printer;
