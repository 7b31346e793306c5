//! # Printer Session
//!
//! A [`Printer`] collects receipt content, renders it into one bitmap and
//! sends the resulting job to its transport.
//!
//! ```text
//! text() / between() / qrcode() / image() / flex() / newline()
//!   │ append
//!   ▼
//! contents ──render()──► Canvas ──build()──► job bytes ──print()──► Transport
//! ```
//!
//! Content is only ever appended; [`Printer::clear`] is the one way to start
//! over. Rendering reads the content list without changing it, so calling
//! [`Printer::build`] twice yields the same bytes.
//!
//! ## Example
//!
//! ```
//! use rollprint::layout::{Alignment, Text};
//! use rollprint::printer::{PaperWidth, PrinterConfig};
//! use rollprint::session::Printer;
//! use rollprint::transport::Capture;
//!
//! let capture = Capture::new();
//! let config = PrinterConfig::new("", PaperWidth::Mm58).with_padding(8);
//! let mut printer = Printer::with_transport(config, Box::new(capture.clone()))?;
//!
//! printer
//!     .text(Text::new("CHURRA MART").align(Alignment::Center).size(36))
//!     .between("Churros x3", "4.50")
//!     .newline(10, 1)
//!     .qrcode("https://example.invalid/r/1001");
//! printer.print()?;
//!
//! assert_eq!(&capture.bytes()[..2], &[0x1B, 0x40]);
//! # Ok::<(), rollprint::error::PrintError>(())
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::GrayImage;

use crate::error::PrintError;
use crate::layout::{
    self, Alignment, Content, FlexGroup, Image, Justify, LayoutContext, QrCode, Spacer, Text,
};
use crate::printer::PrinterConfig;
use crate::protocol::raster;
use crate::render::{Canvas, FontBook, FontRef, GlyphMetrics, picture};
use crate::transport::{self, Transport};

/// Requested width of an appended image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageWidth {
    /// Keep the image's own width, shrinking only if it overflows the paper
    #[default]
    Natural,
    /// Shrink to at most this many dots
    Dots(u32),
    /// Shrink to the paper width
    Full,
}

impl ImageWidth {
    /// Max width in dots on paper `paper` dots wide.
    pub fn resolve(self, paper: u32) -> Option<u32> {
        match self {
            Self::Natural => None,
            Self::Dots(dots) => Some(dots),
            Self::Full => Some(paper),
        }
    }
}

impl FromStr for ImageWidth {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Natural),
            "full" => Ok(Self::Full),
            other => match other.parse::<u32>() {
                Ok(dots) if dots > 0 => Ok(Self::Dots(dots)),
                _ => Err(PrintError::Config(format!(
                    "Invalid image width '{}'. Use 'full', 'auto' or a positive number of dots",
                    other
                ))),
            },
        }
    }
}

/// # Receipt Printer Session
///
/// Owns the configuration, the ordered content list, the last built job and
/// the transport chosen for the configured platform.
pub struct Printer {
    config: PrinterConfig,
    contents: Vec<Content>,
    pending: Vec<u8>,
    glyphs: Box<dyn GlyphMetrics>,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("config", &self.config)
            .field("contents", &self.contents.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Printer {
    /// Create a session printing through the platform's transport.
    ///
    /// ## Errors
    ///
    /// - `Config` when the padding leaves no room on the paper
    /// - `UsbInfoMissing` when the platform needs USB ids that are not set
    /// - `UnsupportedPlatform` when this build has no transport for it
    pub fn new(config: PrinterConfig) -> Result<Self, PrintError> {
        config.validate()?;
        let transport = transport::open(&config)?;
        Self::with_transport(config, transport)
    }

    /// Create a session that sends jobs to `transport`.
    pub fn with_transport(
        config: PrinterConfig,
        transport: Box<dyn Transport>,
    ) -> Result<Self, PrintError> {
        if config.content_width() == 0 {
            return Err(PrintError::Config(format!(
                "Padding of {} dots leaves no room on {} paper",
                config.padding_x, config.paper_width
            )));
        }
        Ok(Self {
            config,
            contents: Vec::new(),
            pending: Vec::new(),
            glyphs: Box::new(FontBook::new()),
            transport,
        })
    }

    /// Replace the glyph backend.
    pub fn with_glyphs(mut self, glyphs: Box<dyn GlyphMetrics>) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Content appended so far, in order.
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// The job built by the last [`Printer::print`].
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    fn layout_context(&self) -> LayoutContext<'_> {
        LayoutContext::new(
            self.glyphs.as_ref(),
            FontRef::from(self.config.default_font.clone()),
        )
    }

    // ------------------------------------------------------------------------
    // Appending content
    // ------------------------------------------------------------------------

    /// Append any content node.
    pub fn push(&mut self, content: impl Into<Content>) -> &mut Self {
        self.contents.push(content.into());
        self
    }

    /// Append a text block.
    pub fn text(&mut self, text: impl Into<Text>) -> &mut Self {
        self.push(text.into())
    }

    /// Append a row with `left` flush left and `right` flush right.
    ///
    /// When the two do not fit on one row, `left` wraps left-aligned and
    /// `right` wraps right-aligned below it.
    pub fn between(&mut self, left: impl Into<Text>, right: impl Into<Text>) -> &mut Self {
        let left = left.into();
        let right = right.into().align(Alignment::Right);

        let fits = {
            let ctx = self.layout_context();
            let width = |text: &Text| {
                ctx.glyphs
                    .measure(ctx.font_for(text), text.font_size, &text.content)
                    .width as u64
            };
            !left.content.contains('\n')
                && !right.content.contains('\n')
                && width(&left) + width(&right) <= self.config.content_width() as u64
        };

        let group = if fits {
            FlexGroup::new()
                .justify(Justify::Between)
                .item(left)
                .item(right)
        } else {
            FlexGroup::new()
                .item(left)
                .item(FlexGroup::new().justify(Justify::Right).item(right))
        };
        self.push(group)
    }

    /// Append `lines` blank spaces of `height` dots each.
    pub fn newline(&mut self, height: u32, lines: u32) -> &mut Self {
        self.push(Spacer::new(height).repeat(lines))
    }

    /// Append a QR code, centered.
    pub fn qrcode(&mut self, code: impl Into<QrCode>) -> &mut Self {
        self.push(code.into())
    }

    /// Append a flex group.
    pub fn flex(&mut self, group: FlexGroup) -> &mut Self {
        self.push(group)
    }

    /// Append an image file, centered.
    pub fn image(
        &mut self,
        path: impl AsRef<Path>,
        width: ImageWidth,
    ) -> Result<&mut Self, PrintError> {
        let pixels = picture::load(path.as_ref())?;
        Ok(self.image_pixels(pixels, width))
    }

    /// Append already decoded grayscale pixels, centered.
    pub fn image_pixels(&mut self, pixels: GrayImage, width: ImageWidth) -> &mut Self {
        let image = Image {
            pixels: pixels.into(),
            max_width: width.resolve(self.config.width_dots()),
        };
        self.push(image)
    }

    // ------------------------------------------------------------------------
    // Rendering and printing
    // ------------------------------------------------------------------------

    /// Lay the content out into one receipt canvas.
    pub fn render(&self) -> Result<Canvas, PrintError> {
        layout::compose::compose(&self.layout_context(), &self.config, &self.contents)
    }

    /// Render and frame the content as a complete print job.
    pub fn build(&self) -> Result<Vec<u8>, PrintError> {
        let canvas = self.render()?;
        Ok(raster::job(&canvas))
    }

    /// Build the job and send it to the transport.
    ///
    /// Nothing is sent when layout fails.
    pub fn print(&mut self) -> Result<(), PrintError> {
        self.pending = self.build()?;
        log::info!(
            "printing {} content nodes ({} bytes)",
            self.contents.len(),
            self.pending.len()
        );
        self.transport.send(&self.pending)
    }

    /// Forget all content and the last built job.
    pub fn clear(&mut self) {
        self.contents.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{PaperWidth, Platform};
    use crate::transport::Capture;
    use pretty_assertions::assert_eq;

    fn session(padding: u32) -> (Printer, Capture) {
        let capture = Capture::new();
        let config = PrinterConfig::new("", PaperWidth::Mm58).with_padding(padding);
        let printer = Printer::with_transport(config, Box::new(capture.clone())).unwrap();
        (printer, capture)
    }

    #[test]
    fn test_image_width_parse() {
        assert_eq!("full".parse::<ImageWidth>().unwrap(), ImageWidth::Full);
        assert_eq!("200".parse::<ImageWidth>().unwrap(), ImageWidth::Dots(200));
        assert_eq!("auto".parse::<ImageWidth>().unwrap(), ImageWidth::Natural);
        assert!(matches!("0".parse::<ImageWidth>(), Err(PrintError::Config(_))));
        assert!(matches!("wide".parse::<ImageWidth>(), Err(PrintError::Config(_))));
    }

    #[test]
    fn test_padding_must_leave_room() {
        let config = PrinterConfig::new("", PaperWidth::Mm58).with_padding(192);
        let err = Printer::with_transport(config, Box::new(Capture::new())).unwrap_err();
        assert!(matches!(err, PrintError::Config(_)));
    }

    #[test]
    fn test_new_checks_usb_ids() {
        let config = PrinterConfig::new("", PaperWidth::Mm58).with_platform(Platform::Macos);
        assert!(matches!(
            Printer::new(config),
            Err(PrintError::UsbInfoMissing(_))
        ));
    }

    #[test]
    fn test_between_fits_on_one_row() {
        let (mut printer, _) = session(0);
        printer.between("Coffee", "3.50");
        let Content::Flex(group) = &printer.contents()[0] else {
            panic!("expected a flex group");
        };
        assert_eq!(group.justify, Justify::Between);
        assert_eq!(group.items.len(), 2);
    }

    #[test]
    fn test_between_wraps_when_too_long() {
        let (mut printer, _) = session(0);
        // 28px builtin: 14px per character, 384 dots hold 27
        printer.between("x".repeat(20), "y".repeat(10));
        let Content::Flex(group) = &printer.contents()[0] else {
            panic!("expected a flex group");
        };
        assert_eq!(group.justify, Justify::Left);
        let layout::FlexItem::Flex(right) = &group.items[1] else {
            panic!("expected a nested group");
        };
        assert_eq!(right.justify, Justify::Right);

        // Left line, then the right-aligned line, then a 14-row spacer
        let canvas = printer.render().unwrap();
        assert_eq!(canvas.height(), 32 + 32 + 14);
    }

    #[test]
    fn test_image_full_width() {
        let (mut printer, _) = session(16);
        printer.image_pixels(GrayImage::new(10, 10), ImageWidth::Full);
        let Content::Image(image) = &printer.contents()[0] else {
            panic!("expected an image");
        };
        assert_eq!(image.max_width, Some(384));
    }

    #[test]
    fn test_build_is_idempotent() {
        let (mut printer, _) = session(8);
        printer
            .text("Receipt #1001")
            .between("Total", "12.00")
            .qrcode("https://example.invalid/r/1001");
        let first = printer.build().unwrap();
        let second = printer.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_print_sends_job_and_keeps_pending() {
        let (mut printer, capture) = session(0);
        printer.text("hello");
        printer.print().unwrap();

        assert_eq!(capture.jobs().len(), 1);
        assert_eq!(capture.bytes(), printer.pending());
        assert_eq!(printer.pending(), printer.build().unwrap().as_slice());
    }

    #[test]
    fn test_layout_error_sends_nothing() {
        let (mut printer, capture) = session(0);
        printer.qrcode("z".repeat(5000).as_str());
        assert!(matches!(printer.print(), Err(PrintError::Layout(_))));
        assert!(capture.jobs().is_empty());
    }

    #[test]
    fn test_clear_resets_contents_and_pending() {
        let (mut printer, _) = session(0);
        printer.text("a").newline(10, 2);
        printer.print().unwrap();
        assert_eq!(printer.contents().len(), 2);
        assert!(!printer.pending().is_empty());

        printer.clear();
        assert!(printer.contents().is_empty());
        assert!(printer.pending().is_empty());
        assert_eq!(printer.render().unwrap().height(), 0);
    }

    #[test]
    fn test_missing_image_file() {
        let (mut printer, _) = session(0);
        let err = printer
            .image("/nonexistent/logo.png", ImageWidth::Natural)
            .unwrap_err();
        assert!(matches!(err, PrintError::Image(_)));
        assert!(printer.contents().is_empty());
    }
}
