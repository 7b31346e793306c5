//! # Receipt Documents
//!
//! Receipts described as JSON, for printing from scripts and other tools
//! without writing Rust.
//!
//! ## Node Types
//!
//! | `type`    | Fields |
//! |-----------|--------|
//! | `text`    | `content`, `align`, `size`, `font`, `line_spacing` |
//! | `between` | `left`, `right`, `size`, `font` |
//! | `qr_code` | `data`, `size` (`sm`/`md`/`lg`), `module_size`, `border` |
//! | `spacer`  | `height`, `repeat` |
//! | `image`   | `path`, `width` (`"full"`, `"auto"` or dots) |
//! | `flex`    | `items`, `item_gap`, `row_gap`, `justify`, `align`, `max_width` |
//!
//! `size` is a preset name (`xxs` … `xxl`) or pixels per em. Font and image
//! paths are relative to the document's directory.
//!
//! ## Example
//!
//! ```
//! use std::path::Path;
//! use rollprint::document;
//! use rollprint::printer::{PaperWidth, PrinterConfig};
//! use rollprint::session::Printer;
//! use rollprint::transport::Capture;
//!
//! let doc = document::parse(r#"{
//!     "content": [
//!         {"type": "text", "content": "CHURRA MART", "align": "center", "size": "xl"},
//!         {"type": "between", "left": "Churros x3", "right": "4.50"},
//!         {"type": "spacer", "height": 20},
//!         {"type": "qr_code", "data": "https://example.invalid/r/1", "size": "sm"}
//!     ]
//! }"#)?;
//!
//! let config = PrinterConfig::new("", PaperWidth::Mm58);
//! let mut printer = Printer::with_transport(config, Box::new(Capture::new()))?;
//! doc.apply(&mut printer, Path::new("."))?;
//! assert_eq!(printer.contents().len(), 4);
//! # Ok::<(), rollprint::error::PrintError>(())
//! ```

mod schema;

pub use schema::{
    BetweenNode, FlexNode, ImageNode, Node, QrCodeNode, ReceiptDocument, SizeValue,
    SpacerNode, TextNode, WidthValue,
};

use std::path::Path;

use crate::error::PrintError;
use crate::layout::{FlexGroup, FlexItem, Image, QrCode, Text};
use crate::printer::FontSize;
use crate::render::{FontRef, picture};
use crate::session::{ImageWidth, Printer};

/// Parse a JSON document.
pub fn parse(json: &str) -> Result<ReceiptDocument, PrintError> {
    serde_json::from_str(json).map_err(|e| PrintError::Document(e.to_string()))
}

/// Read and parse a JSON document file.
pub fn load(path: &Path) -> Result<ReceiptDocument, PrintError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| PrintError::Document(format!("Failed to read {}: {}", path.display(), e)))?;
    parse(&json).map_err(|e| match e {
        PrintError::Document(msg) => PrintError::Document(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

impl ReceiptDocument {
    /// Append every node to `printer`, resolving paths against `base_dir`.
    ///
    /// Nodes are converted one by one; on error the nodes before the failing
    /// one stay appended. Zero sizes, module sizes, repeats and widths are
    /// rejected rather than rounded up.
    pub fn apply(&self, printer: &mut Printer, base_dir: &Path) -> Result<(), PrintError> {
        let paper = printer.config().width_dots();
        for node in &self.content {
            match node {
                Node::Text(entry) => {
                    printer.text(text(entry, base_dir)?);
                }
                Node::Between(entry) => {
                    let size = size_pixels(entry.size)?;
                    let font = entry.font.as_ref().map(|f| FontRef::File(base_dir.join(f)));
                    let mut left = Text::new(entry.left.as_str()).size(size);
                    let mut right = Text::new(entry.right.as_str()).size(size);
                    left.font = font.clone();
                    right.font = font;
                    printer.between(left, right);
                }
                Node::QrCode(entry) => {
                    printer.qrcode(qr_code(entry)?);
                }
                Node::Spacer(entry) => {
                    printer.newline(entry.height, positive(entry.repeat, "spacer repeat")?);
                }
                Node::Image(entry) => {
                    let width = image_width(entry.width.as_ref())?;
                    printer.image(base_dir.join(&entry.path), width)?;
                }
                Node::Flex(entry) => {
                    printer.flex(flex_group(entry, base_dir, paper)?);
                }
            }
        }
        Ok(())
    }
}

fn positive(value: u32, field: &str) -> Result<u32, PrintError> {
    if value == 0 {
        return Err(PrintError::Document(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(value)
}

fn size_pixels(size: Option<SizeValue>) -> Result<u32, PrintError> {
    let pixels = size.map_or(FontSize::default().pixels(), SizeValue::pixels);
    positive(pixels, "font size")
}

fn text(entry: &TextNode, base_dir: &Path) -> Result<Text, PrintError> {
    let mut text = Text::new(entry.content.as_str())
        .align(entry.align.unwrap_or_default())
        .size(size_pixels(entry.size)?)
        .line_spacing(entry.line_spacing);
    text.font = entry.font.as_ref().map(|f| FontRef::File(base_dir.join(f)));
    Ok(text)
}

fn qr_code(entry: &QrCodeNode) -> Result<QrCode, PrintError> {
    let mut code = QrCode::with_size(entry.data.as_str(), entry.size.unwrap_or_default());
    if let Some(dots) = entry.module_size {
        code = code.module_size(positive(dots, "QR module size")?);
    }
    if let Some(modules) = entry.border {
        code = code.border(modules);
    }
    Ok(code)
}

fn image_width(entry: Option<&WidthValue>) -> Result<ImageWidth, PrintError> {
    match entry {
        None => Ok(ImageWidth::Natural),
        Some(WidthValue::Dots(dots)) => Ok(ImageWidth::Dots(positive(*dots, "image width")?)),
        Some(WidthValue::Named(name)) => name.parse(),
    }
}

fn flex_group(entry: &FlexNode, base_dir: &Path, paper: u32) -> Result<FlexGroup, PrintError> {
    let mut group = FlexGroup::new()
        .item_gap(entry.item_gap)
        .row_gap(entry.row_gap)
        .justify(entry.justify)
        .align(entry.align);
    if let Some(max) = entry.max_width {
        group = group.max_width(positive(max, "flex max_width")?);
    }

    for node in &entry.items {
        let item = match node {
            Node::Text(entry) => FlexItem::from(text(entry, base_dir)?),
            Node::QrCode(entry) => FlexItem::from(qr_code(entry)?),
            Node::Image(entry) => {
                let pixels = picture::load(&base_dir.join(&entry.path))?;
                FlexItem::from(Image {
                    pixels: pixels.into(),
                    max_width: image_width(entry.width.as_ref())?.resolve(paper),
                })
            }
            Node::Flex(entry) => FlexItem::from(flex_group(entry, base_dir, paper)?),
            other => {
                return Err(PrintError::Document(format!(
                    "'{}' nodes are not allowed inside a flex group",
                    other.kind()
                )));
            }
        };
        group.items.push(item);
    }
    Ok(group)
}
