//! # ESC/POS Protocol Implementation
//!
//! This module provides the byte-level side of a print job: framing commands
//! and the raster encoder that turns a receipt canvas into `GS v 0` data.
//!
//! ## Module Structure
//!
//! - [`commands`]: Job framing commands (init, feed, cut)
//! - [`graphics`]: The `GS v 0` raster bit image command
//! - [`raster`]: Binarization, width alignment, bit packing, job assembly
//!
//! ## Usage Example
//!
//! ```
//! use rollprint::protocol::raster;
//! use rollprint::render::Canvas;
//!
//! let receipt = Canvas::new(384, 120);
//! let job = raster::job(&receipt);
//!
//! // ESC @ ... GS V 0
//! assert_eq!(&job[..2], &[0x1B, 0x40]);
//! assert_eq!(&job[job.len() - 3..], &[0x1D, 0x56, 0x00]);
//! ```

pub mod commands;
pub mod graphics;
pub mod raster;
