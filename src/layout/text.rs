//! Text wrapping and line painting.
//!
//! Lines are broken one character at a time: a character that would push the
//! line past the available width starts the next line. There is no word
//! breaking or hyphenation. `\n` always ends a line.
//!
//! Every line is `ascent + LINE_PADDING` rows tall, independent of which
//! characters it holds, so blocks of text stack on a fixed pitch.

use super::{Alignment, LayoutContext, Text};
use crate::render::{Canvas, FontRef, GlyphMetrics};

/// One wrapped line and its measured width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub width: u32,
}

/// Greedily wrap `text` to `available` pixels.
///
/// An empty string yields no lines; an empty paragraph (two consecutive
/// `\n`) yields one blank line. A single character wider than `available`
/// gets a line of its own.
pub fn wrap(
    glyphs: &dyn GlyphMetrics,
    font: &FontRef,
    size: u32,
    text: &str,
    available: u32,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut width = 0;

        for ch in paragraph.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            let candidate_width = glyphs.measure(font, size, &candidate).width;

            if candidate_width > available && !current.is_empty() {
                lines.push(TextLine {
                    text: std::mem::take(&mut current),
                    width,
                });
                current.push(ch);
                width = glyphs.measure(font, size, &current).width;
            } else {
                current = candidate;
                width = candidate_width;
            }
        }

        lines.push(TextLine {
            text: current,
            width,
        });
    }

    lines
}

/// X offset of a line inside its container.
///
/// `inset` is the container's horizontal padding; it applies to left and
/// right alignment only.
pub fn line_offset(align: Alignment, container: u32, line: u32, inset: u32) -> u32 {
    match align {
        Alignment::Left => inset,
        Alignment::Center => container.saturating_sub(line) / 2,
        Alignment::Right => container.saturating_sub(line).saturating_sub(inset),
    }
}

/// Lay out a text run as one block `container` pixels wide.
///
/// Lines wrap to `container - 2 * inset` and are aligned individually.
pub fn layout_block(ctx: &LayoutContext<'_>, text: &Text, container: u32, inset: u32) -> Canvas {
    let font = ctx.font_for(text);
    let available = container.saturating_sub(inset.saturating_mul(2));
    let lines = wrap(ctx.glyphs, font, text.font_size, &text.content, available);
    if lines.is_empty() {
        return Canvas::new(container, 0);
    }

    let line_height = ctx.glyphs.line_height(font, text.font_size);
    let pitch = line_height + text.line_spacing;
    let height = pitch * lines.len() as u32 - text.line_spacing;
    let mut canvas = Canvas::new(container, height);

    for (i, line) in lines.iter().enumerate() {
        let x = line_offset(text.align, container, line.width, inset);
        let y = i as u32 * pitch;
        ctx.glyphs.draw(
            &mut canvas,
            x as i64,
            y as i64,
            font,
            text.font_size,
            &line.text,
        );
    }

    log::debug!(
        "text block: {} lines, {}x{}",
        lines.len(),
        container,
        height
    );
    canvas
}

/// Lay out a text run as one canvas per line, each only as wide as its line.
///
/// Used inside flex groups, where every line is a separate flow item. Lines
/// are clipped to `available`.
pub fn layout_lines(ctx: &LayoutContext<'_>, text: &Text, available: u32) -> Vec<Canvas> {
    let font = ctx.font_for(text);
    let line_height = ctx.glyphs.line_height(font, text.font_size);

    wrap(ctx.glyphs, font, text.font_size, &text.content, available)
        .into_iter()
        .map(|line| {
            let mut canvas = Canvas::new(line.width.min(available), line_height);
            ctx.glyphs
                .draw(&mut canvas, 0, 0, font, text.font_size, &line.text);
            canvas
        })
        .collect()
}
