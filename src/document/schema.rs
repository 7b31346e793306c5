//! JSON schema types for receipt documents.

use std::path::PathBuf;

use serde::Deserialize;

use crate::layout::{Alignment, Justify, VerticalAlign};
use crate::printer::{FontSize, QrSize};

fn default_repeat() -> u32 {
    1
}

/// Top-level JSON document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiptDocument {
    /// Content nodes, printed top to bottom.
    pub content: Vec<Node>,
}

/// A single content node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Text(TextNode),
    Between(BetweenNode),
    QrCode(QrCodeNode),
    Spacer(SpacerNode),
    Image(ImageNode),
    Flex(FlexNode),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Between(_) => "between",
            Self::QrCode(_) => "qr_code",
            Self::Spacer(_) => "spacer",
            Self::Image(_) => "image",
            Self::Flex(_) => "flex",
        }
    }
}

/// Font size: a preset name (`"md"`) or pixels per em (`28`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Preset(FontSize),
    Pixels(u32),
}

impl SizeValue {
    pub fn pixels(self) -> u32 {
        match self {
            Self::Preset(size) => size.pixels(),
            Self::Pixels(px) => px,
        }
    }
}

/// Text block.
#[derive(Debug, Clone, Deserialize)]
pub struct TextNode {
    pub content: String,
    #[serde(default)]
    pub align: Option<Alignment>,
    #[serde(default)]
    pub size: Option<SizeValue>,
    /// Font file, relative to the document.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub line_spacing: u32,
}

/// Left and right text on one row.
#[derive(Debug, Clone, Deserialize)]
pub struct BetweenNode {
    pub left: String,
    pub right: String,
    #[serde(default)]
    pub size: Option<SizeValue>,
    #[serde(default)]
    pub font: Option<PathBuf>,
}

/// QR code. `module_size` and `border` override the preset.
#[derive(Debug, Clone, Deserialize)]
pub struct QrCodeNode {
    pub data: String,
    #[serde(default)]
    pub size: Option<QrSize>,
    #[serde(default)]
    pub module_size: Option<u32>,
    #[serde(default)]
    pub border: Option<u32>,
}

/// Vertical blank space.
#[derive(Debug, Clone, Deserialize)]
pub struct SpacerNode {
    pub height: u32,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Image width: `"full"`, `"auto"` or dots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WidthValue {
    Dots(u32),
    Named(String),
}

/// Image file, relative to the document.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub path: PathBuf,
    #[serde(default)]
    pub width: Option<WidthValue>,
}

/// Flex group. Items may be text, QR codes, images or flex groups.
#[derive(Debug, Clone, Deserialize)]
pub struct FlexNode {
    pub items: Vec<Node>,
    #[serde(default)]
    pub item_gap: u32,
    #[serde(default)]
    pub row_gap: u32,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub align: VerticalAlign,
    #[serde(default)]
    pub max_width: Option<u32>,
}
