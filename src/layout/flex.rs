//! # Flex Layout
//!
//! Arranges the items of a [`FlexGroup`] left to right, wrapping into rows.
//!
//! Layout runs in two passes:
//!
//! 1. Every item is rendered to one or more canvases (a text item yields one
//!    canvas per wrapped line, a nested group yields one).
//! 2. [`plan`] places those canvases using their sizes only and returns a
//!    [`FlexPlan`]. The group itself is never modified.
//!
//! ## Row Breaking
//!
//! ```text
//! available ─────────────────────────────┐
//! ┌──────┐ gap ┌────────┐ gap ┌────┐     │
//! │ a    │     │ b      │     │ c  │     │  row 0
//! └──────┘     └────────┘     └────┘     │
//!                row_gap                 │
//! ┌───────────────┐ gap ┌──────┐         │
//! │ d             │     │ e    │         │  row 1
//! └───────────────┘     └──────┘         │
//! ```
//!
//! An item starts a new row when the current row is not empty and the item
//! would cross the available width. An item wider than the available width
//! therefore sits alone on its row and is clipped when painted.
//!
//! ## Alignment
//!
//! | Justify  | Shift of item k in a row of n items |
//! |----------|-------------------------------------|
//! | left     | 0                                   |
//! | right    | free                                |
//! | between  | free × k / (n − 1), 0 when n = 1    |
//!
//! where `free = width − row extent`. Vertically, `center` shifts an item
//! by `(row height − item height) / 2` and `bottom` by the full difference.

use super::text::layout_lines;
use super::{FlexGroup, FlexItem, Image, Justify, LayoutContext, VerticalAlign};
use crate::error::PrintError;
use crate::render::{Canvas, picture, qr};

/// Deepest allowed nesting of flex groups.
pub const MAX_DEPTH: usize = 32;

/// Where one item canvas goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One row of a plan: indices into [`FlexPlan::placements`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexRow {
    pub items: Vec<usize>,
    pub y: u32,
    pub height: u32,
    /// Right edge of the last item before justification
    pub extent: u32,
}

/// Resolved positions for every item of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexPlan {
    pub placements: Vec<Placement>,
    pub rows: Vec<FlexRow>,
    pub width: u32,
    pub height: u32,
}

/// Place items of the given `(width, height)` sizes.
///
/// With `available = None` rows never break and the plan is as wide as its
/// content.
pub fn plan(sizes: &[(u32, u32)], group: &FlexGroup, available: Option<u32>) -> FlexPlan {
    let limit = available.map_or(u64::MAX, u64::from);
    let mut placements = Vec::with_capacity(sizes.len());
    let mut rows: Vec<FlexRow> = Vec::new();
    let mut cursor_x: u64 = 0;
    let mut measured: u32 = 0;

    for (index, &(width, height)) in sizes.iter().enumerate() {
        let breaks = cursor_x > 0 && cursor_x + width as u64 > limit;
        match rows.last() {
            None => rows.push(new_row(0)),
            Some(row) if breaks => {
                let y = row.y + row.height + group.row_gap;
                rows.push(new_row(y));
                cursor_x = 0;
            }
            Some(_) => {}
        }

        let Some(row) = rows.last_mut() else {
            continue;
        };
        let x = cursor_x as u32;
        placements.push(Placement {
            x,
            y: row.y,
            width,
            height,
        });
        row.items.push(index);
        row.height = row.height.max(height);
        row.extent = x + width;
        measured = measured.max(row.extent);
        cursor_x += width as u64 + group.item_gap as u64;
    }

    let width = available.unwrap_or(measured);
    let height = rows.last().map_or(0, |row| row.y + row.height);

    for row in &rows {
        justify_row(&mut placements, row, group.justify, width);
        align_row(&mut placements, row, group.align);
    }

    FlexPlan {
        placements,
        rows,
        width,
        height,
    }
}

fn new_row(y: u32) -> FlexRow {
    FlexRow {
        items: Vec::new(),
        y,
        height: 0,
        extent: 0,
    }
}

fn justify_row(placements: &mut [Placement], row: &FlexRow, justify: Justify, width: u32) {
    let free = width.saturating_sub(row.extent) as u64;
    match justify {
        Justify::Left => {}
        Justify::Right => {
            for &index in &row.items {
                placements[index].x += free as u32;
            }
        }
        Justify::Between => {
            let gaps = row.items.len().saturating_sub(1) as u64;
            if gaps == 0 {
                return;
            }
            for (k, &index) in row.items.iter().enumerate() {
                placements[index].x += (free * k as u64 / gaps) as u32;
            }
        }
    }
}

fn align_row(placements: &mut [Placement], row: &FlexRow, align: VerticalAlign) {
    for &index in &row.items {
        let slack = row.height - placements[index].height;
        placements[index].y += match align {
            VerticalAlign::Top => 0,
            VerticalAlign::Center => slack / 2,
            VerticalAlign::Bottom => slack,
        };
    }
}

/// Render a flex group against `available` pixels.
///
/// The group's own `max_width` narrows `available`, never widens it.
pub fn render(
    ctx: &LayoutContext<'_>,
    group: &FlexGroup,
    available: Option<u32>,
) -> Result<Canvas, PrintError> {
    render_nested(ctx, group, available, 0)
}

fn render_nested(
    ctx: &LayoutContext<'_>,
    group: &FlexGroup,
    available: Option<u32>,
    depth: usize,
) -> Result<Canvas, PrintError> {
    if depth >= MAX_DEPTH {
        return Err(PrintError::Layout(format!(
            "Flex groups nested deeper than {} levels",
            MAX_DEPTH
        )));
    }

    let available = match (group.max_width, available) {
        (Some(max), Some(outer)) => Some(max.min(outer)),
        (Some(max), None) => Some(max),
        (None, outer) => outer,
    };

    let mut pieces = Vec::with_capacity(group.items.len());
    for item in &group.items {
        match item {
            FlexItem::Text(text) => {
                pieces.extend(layout_lines(ctx, text, available.unwrap_or(u32::MAX)));
            }
            FlexItem::QrCode(code) => {
                pieces.push(qr::encode(
                    &code.data,
                    code.module_size,
                    code.border_modules,
                    available.unwrap_or(u32::MAX),
                )?);
            }
            FlexItem::Image(image) => pieces.push(fit_image(image, available)),
            FlexItem::Flex(inner) => {
                pieces.push(render_nested(ctx, inner, available, depth + 1)?);
            }
        }
    }

    let sizes: Vec<(u32, u32)> = pieces.iter().map(|c| (c.width(), c.height())).collect();
    let plan = plan(&sizes, group, available);

    let mut canvas = Canvas::new(plan.width, plan.height);
    for (piece, at) in pieces.iter().zip(&plan.placements) {
        canvas.paste(piece, at.x as i64, at.y as i64);
    }

    log::debug!(
        "flex: depth {} {} items in {} rows -> {}x{}",
        depth,
        pieces.len(),
        plan.rows.len(),
        plan.width,
        plan.height
    );
    Ok(canvas)
}

/// Scale a picture down to fit its own max width and the container.
pub fn fit_image(image: &Image, available: Option<u32>) -> Canvas {
    let target = match (image.max_width, available) {
        (Some(max), Some(outer)) => Some(max.min(outer)),
        (max, outer) => max.or(outer),
    };
    let pixels = match target {
        Some(width) => picture::fit_width(&image.pixels, width),
        None => (*image.pixels).clone(),
    };
    Canvas::from_image(pixels)
}

// ============================================================================
// TESTS
// ============================================================================
