//! Glyph measurement and rendering.
//!
//! [`GlyphMetrics`] is the seam between layout and fonts: layout only ever
//! asks "how wide is this string" and "draw this string here". [`FontBook`]
//! answers with TrueType/OpenType files rendered by ab_glyph, and with the
//! Spleen 12x24 bitmap font whenever no file is given or a file cannot be
//! loaded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use spleen_font::{FONT_12X24, PSF2Font};

use super::canvas::{BLACK, Canvas};

/// Blank rows added under the ascent extent of every text line.
pub const LINE_PADDING: u32 = 4;

/// Which font a text run is set in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontRef {
    /// The built-in Spleen bitmap font
    #[default]
    Builtin,
    /// A font file on disk
    File(PathBuf),
}

impl FontRef {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

impl From<Option<PathBuf>> for FontRef {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(Self::File).unwrap_or_default()
    }
}

/// Pixel extent of a measured string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    /// Sum of the glyph advances
    pub width: u32,
    /// Ascent of the font at this size (string independent)
    pub height: u32,
}

/// Measures and draws text for the layout engine.
pub trait GlyphMetrics {
    /// Width and ascent extent of `text` set in `font` at `size` pixels per em.
    fn measure(&self, font: &FontRef, size: u32, text: &str) -> TextExtent;

    /// Draw `text` with its top-left corner at (x, y). Ink outside the canvas
    /// is dropped.
    fn draw(&self, canvas: &mut Canvas, x: i64, y: i64, font: &FontRef, size: u32, text: &str);

    /// Height of one laid-out line.
    fn line_height(&self, font: &FontRef, size: u32) -> u32 {
        self.measure(font, size, "A").height + LINE_PADDING
    }
}

/// Font cache keyed by file path.
///
/// Files are read once. A file that fails to load is remembered as missing so
/// the fallback warning is logged only once per path.
#[derive(Debug, Default)]
pub struct FontBook {
    faces: Mutex<HashMap<PathBuf, Option<FontArc>>>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn face(&self, font: &FontRef) -> Option<FontArc> {
        let FontRef::File(path) = font else {
            return None;
        };
        let mut faces = self.faces.lock().unwrap_or_else(|e| e.into_inner());
        faces
            .entry(path.clone())
            .or_insert_with(|| load_face(path))
            .clone()
    }
}

impl GlyphMetrics for FontBook {
    fn measure(&self, font: &FontRef, size: u32, text: &str) -> TextExtent {
        match self.face(font) {
            Some(face) => measure_outline(&face, size, text),
            None => measure_bitmap(size, text),
        }
    }

    fn draw(&self, canvas: &mut Canvas, x: i64, y: i64, font: &FontRef, size: u32, text: &str) {
        match self.face(font) {
            Some(face) => draw_outline(canvas, x, y, &face, size, text),
            None => draw_bitmap(canvas, x, y, size, text),
        }
    }
}

fn load_face(path: &Path) -> Option<FontArc> {
    let loaded = std::fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| FontArc::try_from_vec(bytes).map_err(|e| e.to_string()));
    match loaded {
        Ok(face) => {
            log::debug!("loaded font {}", path.display());
            Some(face)
        }
        Err(e) => {
            log::warn!(
                "font {} could not be loaded ({}), using the built-in bitmap font",
                path.display(),
                e
            );
            None
        }
    }
}

// ============================================================================
// OUTLINE FONTS
// ============================================================================

/// Scale so that one em is `size` pixels.
fn em_scale(face: &FontArc, size: u32) -> PxScale {
    let units_per_em = face.units_per_em().unwrap_or(1000.0);
    PxScale::from(size as f32 * face.height_unscaled() / units_per_em)
}

fn measure_outline(face: &FontArc, size: u32, text: &str) -> TextExtent {
    let scaled = face.as_scaled(em_scale(face, size));
    let width: f32 = text
        .chars()
        .map(|ch| scaled.h_advance(face.glyph_id(ch)))
        .sum();
    TextExtent {
        width: width.ceil().max(0.0) as u32,
        height: scaled.ascent().ceil().max(0.0) as u32,
    }
}

fn draw_outline(canvas: &mut Canvas, x: i64, y: i64, face: &FontArc, size: u32, text: &str) {
    let scale = em_scale(face, size);
    let scaled = face.as_scaled(scale);
    let baseline = scaled.ascent();
    let mut caret = 0.0f32;

    for ch in text.chars() {
        let glyph_id = face.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(glyph_id);

        let Some(outlined) = face.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|px, py, coverage| {
            let ink = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))).round() as u8;
            canvas.darken(
                x + bounds.min.x as i64 + px as i64,
                y + bounds.min.y as i64 + py as i64,
                ink,
            );
        });
    }
}

// ============================================================================
// BUILT-IN BITMAP FONT
// ============================================================================

const SPLEEN_WIDTH: usize = 12;
const SPLEEN_HEIGHT: usize = 24;

/// Cell size of the bitmap font at `size` pixels per em (1:2 aspect).
fn bitmap_cell(size: u32) -> (u32, u32) {
    ((size / 2).max(1), size.max(1))
}

fn measure_bitmap(size: u32, text: &str) -> TextExtent {
    let (cell_w, cell_h) = bitmap_cell(size);
    TextExtent {
        width: cell_w * text.chars().count() as u32,
        height: cell_h,
    }
}

fn draw_bitmap(canvas: &mut Canvas, x: i64, y: i64, size: u32, text: &str) {
    let Ok(mut spleen) = PSF2Font::new(FONT_12X24) else {
        return;
    };
    let (cell_w, cell_h) = bitmap_cell(size);

    for (i, ch) in text.chars().enumerate() {
        let mut glyph = [[false; SPLEEN_WIDTH]; SPLEEN_HEIGHT];
        let mut utf8 = [0u8; 4];
        match spleen.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()) {
            Some(rows) => {
                for (row_y, row) in rows.enumerate() {
                    for (col_x, on) in row.enumerate() {
                        if row_y < SPLEEN_HEIGHT && col_x < SPLEEN_WIDTH {
                            glyph[row_y][col_x] = on;
                        }
                    }
                }
            }
            None => draw_box(&mut glyph),
        }

        // Nearest-neighbour scale from 12x24 to the cell
        let origin_x = x + i as i64 * cell_w as i64;
        for dy in 0..cell_h {
            let sy = dy as usize * SPLEEN_HEIGHT / cell_h as usize;
            for dx in 0..cell_w {
                let sx = dx as usize * SPLEEN_WIDTH / cell_w as usize;
                if glyph[sy][sx] {
                    canvas.darken(origin_x + dx as i64, y + dy as i64, BLACK);
                }
            }
        }
    }
}

/// Box outline for characters the bitmap font does not cover.
fn draw_box(glyph: &mut [[bool; SPLEEN_WIDTH]; SPLEEN_HEIGHT]) {
    for x in 0..SPLEEN_WIDTH {
        glyph[0][x] = true;
        glyph[SPLEEN_HEIGHT - 1][x] = true;
    }
    for row in glyph.iter_mut() {
        row[0] = true;
        row[SPLEEN_WIDTH - 1] = true;
    }
}
