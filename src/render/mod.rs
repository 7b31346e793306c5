//! # Rendering Module
//!
//! Pixel-level building blocks the layout engine draws with.
//!
//! ## Modules
//!
//! - [`canvas`]: 8-bit grayscale drawing surface with clipped pasting
//! - [`font`]: Glyph measurement and drawing (outline fonts, bitmap fallback)
//! - [`qr`]: QR symbol rendering
//! - [`picture`]: Image loading and aspect-preserving resize
//!
//! ## Usage Example
//!
//! ```
//! use rollprint::render::{Canvas, FontBook, FontRef, GlyphMetrics};
//!
//! let fonts = FontBook::new();
//! let mut canvas = Canvas::new(384, 40);
//! fonts.draw(&mut canvas, 0, 0, &FontRef::Builtin, 28, "TOTAL");
//!
//! assert_eq!(fonts.measure(&FontRef::Builtin, 28, "TOTAL").width, 70);
//! ```

pub mod canvas;
pub mod font;
pub mod picture;
pub mod qr;

pub use canvas::Canvas;
pub use font::{FontBook, FontRef, GlyphMetrics, TextExtent};
