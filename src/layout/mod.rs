//! # Receipt Layout
//!
//! The content model and the engine that turns it into one receipt canvas.
//!
//! ## Content Model
//!
//! ```text
//! Content ─┬─ Text     string, alignment, size, font, line spacing
//!          ├─ QrCode   data, module size, border
//!          ├─ Spacer   height × repeat
//!          ├─ Image    grayscale pixels, optional max width
//!          └─ Flex ─── FlexGroup ─── items: FlexItem ─┬─ Text
//!                                                     ├─ QrCode
//!                                                     ├─ Image
//!                                                     └─ Flex (boxed)
//! ```
//!
//! ## Modules
//!
//! - [`text`]: Character-granularity line wrapping and line painting
//! - [`flex`]: Row-wrapping flex groups (plan, then paint)
//! - [`compose`]: Vertical stacking of top-level content
//!
//! ## Example
//!
//! ```
//! use rollprint::layout::{self, Alignment, Content, FlexGroup, Justify, LayoutContext, Text};
//! use rollprint::printer::{PaperWidth, PrinterConfig};
//! use rollprint::render::{FontBook, FontRef};
//!
//! let config = PrinterConfig::new("", PaperWidth::Mm58);
//! let fonts = FontBook::new();
//! let ctx = LayoutContext::new(&fonts, FontRef::Builtin);
//!
//! let contents = vec![
//!     Content::from(Text::new("CHURRA MART").align(Alignment::Center).size(32)),
//!     Content::from(
//!         FlexGroup::new()
//!             .justify(Justify::Between)
//!             .item(Text::new("Coffee"))
//!             .item(Text::new("3.50")),
//!     ),
//! ];
//! let receipt = layout::compose::compose(&ctx, &config, &contents).unwrap();
//! assert_eq!(receipt.width(), 384);
//! ```

pub mod compose;
pub mod flex;
pub mod text;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::PrintError;
use crate::printer::{FontSize, QrSize};
use crate::render::{FontRef, GlyphMetrics};

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Horizontal alignment of text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(PrintError::Config(format!(
                "Invalid alignment '{}'. Choose 'left', 'center' or 'right'",
                other
            ))),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Center => f.write_str("center"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Horizontal distribution of the items in a flex row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    #[default]
    Left,
    Right,
    /// Free space split evenly between the items
    Between,
}

impl FromStr for Justify {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "between" => Ok(Self::Between),
            other => Err(PrintError::Config(format!(
                "Invalid horizontal alignment '{}'. Choose 'left', 'right' or 'between'",
                other
            ))),
        }
    }
}

/// Vertical position of an item inside its flex row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

impl FromStr for VerticalAlign {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(PrintError::Config(format!(
                "Invalid vertical alignment '{}'. Choose 'top', 'center' or 'bottom'",
                other
            ))),
        }
    }
}

// ============================================================================
// CONTENT NODES
// ============================================================================

/// A run of text.
///
/// ## Example
///
/// ```
/// use rollprint::layout::{Alignment, Text};
///
/// let total = Text::new("TOTAL 12.00")
///     .align(Alignment::Right)
///     .size(32)
///     .line_spacing(2);
/// assert_eq!(total.font_size, 32);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub align: Alignment,
    /// Pixels per em, always > 0
    pub font_size: u32,
    /// `None` uses the session's default font
    pub font: Option<FontRef>,
    /// Blank rows between consecutive lines
    pub line_spacing: u32,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            align: Alignment::Left,
            font_size: FontSize::default().pixels(),
            font: None,
            line_spacing: 0,
        }
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Font size in pixels per em.
    ///
    /// 0 is raised to 1 here; JSON documents reject it instead.
    pub fn size(mut self, font_size: u32) -> Self {
        self.font_size = font_size.max(1);
        self
    }

    pub fn preset(self, size: FontSize) -> Self {
        self.size(size.pixels())
    }

    pub fn font(mut self, font: FontRef) -> Self {
        self.font = Some(font);
        self
    }

    pub fn line_spacing(mut self, rows: u32) -> Self {
        self.line_spacing = rows;
        self
    }
}

/// A QR code symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    pub data: String,
    /// Dots per module, always > 0
    pub module_size: u32,
    /// Quiet zone in modules
    pub border_modules: u32,
}

impl QrCode {
    pub fn new(data: impl Into<String>) -> Self {
        Self::with_size(data, QrSize::default())
    }

    pub fn with_size(data: impl Into<String>, size: QrSize) -> Self {
        Self {
            data: data.into(),
            module_size: size.module_size(),
            border_modules: size.border_modules(),
        }
    }

    /// Dots per module; 0 is raised to 1.
    pub fn module_size(mut self, dots: u32) -> Self {
        self.module_size = dots.max(1);
        self
    }

    pub fn border(mut self, modules: u32) -> Self {
        self.border_modules = modules;
        self
    }
}

/// Vertical blank space of `height × repeat` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spacer {
    pub height: u32,
    pub repeat: u32,
}

impl Spacer {
    pub fn new(height: u32) -> Self {
        Self { height, repeat: 1 }
    }

    /// Repeat count; 0 is raised to 1.
    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat = count.max(1);
        self
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.height.saturating_mul(self.repeat)
    }
}

/// A grayscale picture.
///
/// Pixels are shared so the same logo can appear in many receipts without
/// copying.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub pixels: Arc<GrayImage>,
    /// Scale down to this width when wider; `None` fits the container
    pub max_width: Option<u32>,
}

impl Image {
    pub fn new(pixels: impl Into<Arc<GrayImage>>) -> Self {
        Self {
            pixels: pixels.into(),
            max_width: None,
        }
    }

    /// 0 is raised to 1.
    pub fn max_width(mut self, dots: u32) -> Self {
        self.max_width = Some(dots.max(1));
        self
    }
}

/// A row-wrapping layout container.
///
/// ## Example
///
/// ```
/// use rollprint::layout::{FlexGroup, Justify, Text, VerticalAlign};
///
/// let row = FlexGroup::new()
///     .justify(Justify::Between)
///     .align(VerticalAlign::Center)
///     .item_gap(8)
///     .item(Text::new("Qty 2"))
///     .item(Text::new("7.00"));
/// assert_eq!(row.items.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexGroup {
    pub items: Vec<FlexItem>,
    /// Horizontal gap between items in a row
    pub item_gap: u32,
    /// Vertical gap between rows
    pub row_gap: u32,
    pub justify: Justify,
    pub align: VerticalAlign,
    /// Clamped to the enclosing container's width
    pub max_width: Option<u32>,
}

impl FlexGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: impl Into<FlexItem>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = FlexItem>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn item_gap(mut self, gap: u32) -> Self {
        self.item_gap = gap;
        self
    }

    pub fn row_gap(mut self, gap: u32) -> Self {
        self.row_gap = gap;
        self
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn align(mut self, align: VerticalAlign) -> Self {
        self.align = align;
        self
    }

    /// 0 is raised to 1.
    pub fn max_width(mut self, dots: u32) -> Self {
        self.max_width = Some(dots.max(1));
        self
    }

    /// Largest font size of any text in this group or its nested groups.
    pub fn max_font_size(&self) -> Option<u32> {
        self.items
            .iter()
            .filter_map(|item| match item {
                FlexItem::Text(text) => Some(text.font_size),
                FlexItem::Flex(group) => group.max_font_size(),
                FlexItem::QrCode(_) | FlexItem::Image(_) => None,
            })
            .max()
    }
}

/// Something that can sit inside a flex group.
#[derive(Debug, Clone, PartialEq)]
pub enum FlexItem {
    Text(Text),
    QrCode(QrCode),
    Image(Image),
    Flex(Box<FlexGroup>),
}

/// One top-level entry of a receipt.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(Text),
    QrCode(QrCode),
    Spacer(Spacer),
    Image(Image),
    Flex(FlexGroup),
}

impl From<&str> for Text {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Text {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

impl From<&str> for QrCode {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl From<String> for QrCode {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<Text> for FlexItem {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

impl From<QrCode> for FlexItem {
    fn from(qr: QrCode) -> Self {
        Self::QrCode(qr)
    }
}

impl From<Image> for FlexItem {
    fn from(image: Image) -> Self {
        Self::Image(image)
    }
}

impl From<FlexGroup> for FlexItem {
    fn from(group: FlexGroup) -> Self {
        Self::Flex(Box::new(group))
    }
}

impl From<Text> for Content {
    fn from(text: Text) -> Self {
        Self::Text(text)
    }
}

impl From<QrCode> for Content {
    fn from(qr: QrCode) -> Self {
        Self::QrCode(qr)
    }
}

impl From<Spacer> for Content {
    fn from(spacer: Spacer) -> Self {
        Self::Spacer(spacer)
    }
}

impl From<Image> for Content {
    fn from(image: Image) -> Self {
        Self::Image(image)
    }
}

impl From<FlexGroup> for Content {
    fn from(group: FlexGroup) -> Self {
        Self::Flex(group)
    }
}

// ============================================================================
// LAYOUT CONTEXT
// ============================================================================

/// Read-only services shared by every layout stage.
pub struct LayoutContext<'a> {
    pub glyphs: &'a dyn GlyphMetrics,
    /// Font for text that names none
    pub default_font: FontRef,
}

impl<'a> LayoutContext<'a> {
    pub fn new(glyphs: &'a dyn GlyphMetrics, default_font: FontRef) -> Self {
        Self {
            glyphs,
            default_font,
        }
    }

    /// The font a text run is set in.
    pub fn font_for<'t>(&'t self, text: &'t Text) -> &'t FontRef {
        text.font.as_ref().unwrap_or(&self.default_font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_parse() {
        assert_eq!("CENTER".parse::<Alignment>().unwrap(), Alignment::Center);
        assert_eq!("between".parse::<Justify>().unwrap(), Justify::Between);
        assert_eq!("bottom".parse::<VerticalAlign>().unwrap(), VerticalAlign::Bottom);
    }

    #[test]
    fn test_alignment_rejects_unknown() {
        assert!(matches!(
            "justify".parse::<Alignment>(),
            Err(PrintError::Config(_))
        ));
        assert!(matches!("middle".parse::<Justify>(), Err(PrintError::Config(_))));
        assert!(matches!(
            "baseline".parse::<VerticalAlign>(),
            Err(PrintError::Config(_))
        ));
    }

    #[test]
    fn test_text_defaults() {
        let text = Text::new("hi");
        assert_eq!(text.font_size, 28);
        assert_eq!(text.align, Alignment::Left);
        assert_eq!(text.font, None);
        assert_eq!(Text::new("x").size(0).font_size, 1);
    }

    #[test]
    fn test_spacer_rows() {
        assert_eq!(Spacer::new(10).repeat(3).rows(), 30);
        assert_eq!(Spacer::new(10).repeat(0).repeat, 1);
    }

    #[test]
    fn test_max_font_size_is_recursive() {
        let group = FlexGroup::new()
            .item(Text::new("a").size(20))
            .item(FlexGroup::new().item(Text::new("b").size(36)))
            .item(QrCode::new("c"));
        assert_eq!(group.max_font_size(), Some(36));
        assert_eq!(FlexGroup::new().item(QrCode::new("c")).max_font_size(), None);
    }

    #[test]
    fn test_font_for_falls_back_to_default() {
        let fonts = crate::render::FontBook::new();
        let ctx = LayoutContext::new(&fonts, FontRef::file("/fonts/Default.ttf"));
        let plain = Text::new("a");
        let custom = Text::new("b").font(FontRef::Builtin);
        assert_eq!(ctx.font_for(&plain), &FontRef::file("/fonts/Default.ttf"));
        assert_eq!(ctx.font_for(&custom), &FontRef::Builtin);
    }
}
