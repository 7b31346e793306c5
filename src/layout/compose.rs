//! Vertical composition of the top-level content list.
//!
//! Each content node becomes a block; blocks are measured first, then the
//! receipt canvas is allocated once and every block is pasted below the
//! previous one.
//!
//! | Content | Block                                   | Followed by          |
//! |---------|-----------------------------------------|----------------------|
//! | Text    | paper-wide, wrapped inside the padding  | font_size / 2 rows   |
//! | Flex    | content-wide, at x = padding            | max font size / 2    |
//! | Spacer  | height × repeat blank rows              |                      |
//! | QrCode  | centered, shrunk to the content width   |                      |
//! | Image   | centered, shrunk to the content width   |                      |

use super::flex::{self, fit_image};
use super::text::layout_block;
use super::{Content, LayoutContext};
use crate::error::PrintError;
use crate::printer::PrinterConfig;
use crate::render::{Canvas, qr};

enum Block {
    Paint { canvas: Canvas, x: u32 },
    Gap(u32),
}

impl Block {
    fn height(&self) -> u32 {
        match self {
            Self::Paint { canvas, .. } => canvas.height(),
            Self::Gap(rows) => *rows,
        }
    }
}

fn centered(canvas: Canvas, paper: u32) -> Block {
    let x = paper.saturating_sub(canvas.width()) / 2;
    Block::Paint { canvas, x }
}

/// Render `contents` into one receipt canvas as wide as the paper.
pub fn compose(
    ctx: &LayoutContext<'_>,
    config: &PrinterConfig,
    contents: &[Content],
) -> Result<Canvas, PrintError> {
    let paper = config.width_dots();
    let content_width = config.content_width();

    let mut blocks = Vec::with_capacity(contents.len() * 2);
    for content in contents {
        match content {
            Content::Text(text) => {
                let canvas = layout_block(ctx, text, paper, config.padding_x);
                blocks.push(Block::Paint { canvas, x: 0 });
                blocks.push(Block::Gap(text.font_size / 2));
            }
            Content::Flex(group) => {
                let canvas = flex::render(ctx, group, Some(content_width))?;
                blocks.push(Block::Paint {
                    canvas,
                    x: config.padding_x,
                });
                if let Some(size) = group.max_font_size() {
                    blocks.push(Block::Gap(size / 2));
                }
            }
            Content::Spacer(spacer) => blocks.push(Block::Gap(spacer.rows())),
            Content::QrCode(code) => {
                let symbol = qr::encode(
                    &code.data,
                    code.module_size,
                    code.border_modules,
                    content_width,
                )?;
                blocks.push(centered(symbol, paper));
            }
            Content::Image(image) => {
                blocks.push(centered(fit_image(image, Some(content_width)), paper));
            }
        }
    }

    let height = blocks
        .iter()
        .try_fold(0u32, |total, block| total.checked_add(block.height()))
        .ok_or_else(|| PrintError::Layout("Receipt is too tall to render".to_string()))?;

    let mut receipt = Canvas::new(paper, height);
    let mut y = 0u32;
    for block in &blocks {
        if let Block::Paint { canvas, x } = block {
            receipt.paste(canvas, *x as i64, y as i64);
        }
        y += block.height();
    }

    log::debug!(
        "compose: {} content nodes -> {}x{} receipt",
        contents.len(),
        paper,
        height
    );
    Ok(receipt)
}
