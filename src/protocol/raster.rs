//! # Raster Encoder
//!
//! Turns a composed receipt [`Canvas`] into `GS v 0` raster commands.
//!
//! ## Pipeline
//!
//! ```text
//! Canvas (8-bit gray)
//!   │  binarize: p < 200 → black
//!   ▼
//! 1-bit dots, width w
//!   │  stretch to ceil(w / 8) * 8 (nearest neighbour)
//!   ▼
//! 1-bit dots, byte-aligned width
//!   │  pack MSB-first, 8 dots per byte
//!   ▼
//! GS v 0 header + packed rows
//! ```
//!
//! The width is padded by *stretching* the bitmap horizontally rather than by
//! appending white columns. This is lossy, but it is what receipts printed by
//! earlier versions of this pipeline look like, so the byte stream stays
//! compatible.
//!
//! ## Tall Receipts
//!
//! The height field is 16 bits. Canvases taller than 65535 rows are sent as
//! consecutive raster commands, each at most [`MAX_ROWS_PER_COMMAND`] high.

use super::commands::{self, JOB_FEED_LINES};
use super::graphics;
use crate::render::canvas::{BLACK, Canvas, WHITE};

/// Intensities strictly below this value print as black dots.
pub const THRESHOLD: u8 = 200;

/// Largest height a single raster command can carry.
pub const MAX_ROWS_PER_COMMAND: u32 = u16::MAX as u32;

/// A 1-bit image: `true` marks a black dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub dots: Vec<bool>,
}

impl Bitmap {
    #[inline]
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        self.dots[(y * self.width + x) as usize]
    }
}

/// Threshold every pixel of the canvas.
pub fn binarize(canvas: &Canvas) -> Bitmap {
    Bitmap {
        width: canvas.width(),
        height: canvas.height(),
        dots: canvas.as_raw().iter().map(|&p| p < THRESHOLD).collect(),
    }
}

/// Width rounded up to a whole number of bytes.
#[inline]
pub fn byte_aligned_width(width: u32) -> u32 {
    width.div_ceil(8) * 8
}

/// Stretch the bitmap horizontally so its width is a multiple of 8.
///
/// Nearest-neighbour sampling from pixel centres:
/// `src_x = floor((x + 0.5) * src_w / dst_w)`.
pub fn stretch_to_byte_width(bitmap: Bitmap) -> Bitmap {
    let src_w = bitmap.width;
    let dst_w = byte_aligned_width(src_w);
    if dst_w == src_w {
        return bitmap;
    }

    let columns: Vec<u32> = (0..dst_w)
        .map(|x| ((2 * x as u64 + 1) * src_w as u64 / (2 * dst_w as u64)) as u32)
        .collect();

    let mut dots = Vec::with_capacity((dst_w * bitmap.height) as usize);
    for y in 0..bitmap.height {
        for &sx in &columns {
            dots.push(bitmap.is_black(sx, y));
        }
    }

    Bitmap {
        width: dst_w,
        height: bitmap.height,
        dots,
    }
}

/// Pack a byte-aligned bitmap, MSB = leftmost dot.
pub fn pack(bitmap: &Bitmap) -> Vec<u8> {
    debug_assert!(bitmap.width % 8 == 0, "pack() needs a byte-aligned width");

    bitmap
        .dots
        .chunks(8)
        .map(|dots| {
            dots.iter()
                .enumerate()
                .fold(0u8, |byte, (bit, &black)| {
                    if black { byte | (0x80 >> bit) } else { byte }
                })
        })
        .collect()
}

/// Expand packed rows back to a black/white canvas.
pub fn unpack(data: &[u8], row_bytes: u32, height: u32) -> Canvas {
    let width = row_bytes * 8;
    let mut canvas = Canvas::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let byte = data
                .get((y * row_bytes + x / 8) as usize)
                .copied()
                .unwrap_or(0);
            if (byte >> (7 - x % 8)) & 1 == 1 {
                canvas.put(x as i64, y as i64, BLACK);
            } else {
                canvas.put(x as i64, y as i64, WHITE);
            }
        }
    }
    canvas
}

/// The canvas exactly as the printer will receive it: thresholded and
/// stretched to the byte-aligned width.
pub fn preview(canvas: &Canvas) -> Canvas {
    let bitmap = stretch_to_byte_width(binarize(canvas));
    unpack(&pack(&bitmap), bitmap.width / 8, bitmap.height)
}

/// Encode a canvas as one or more `GS v 0` raster commands.
///
/// ## Example
///
/// ```
/// use rollprint::protocol::raster;
/// use rollprint::render::Canvas;
///
/// let canvas = Canvas::new(385, 2);
/// let cmd = raster::encode(&canvas);
/// assert_eq!(&cmd[4..6], &[49, 0]); // 385 dots → 392 → 49 bytes
/// assert_eq!(cmd.len(), 8 + 49 * 2);
/// ```
pub fn encode(canvas: &Canvas) -> Vec<u8> {
    let bitmap = stretch_to_byte_width(binarize(canvas));
    let row_bytes = bitmap.width / 8;
    assert!(
        row_bytes <= u16::MAX as u32,
        "canvas too wide for a raster command: {} dots",
        canvas.width()
    );
    let packed = pack(&bitmap);

    log::debug!(
        "raster: {}x{} canvas -> {} bytes/row, {} rows",
        canvas.width(),
        canvas.height(),
        row_bytes,
        bitmap.height
    );

    if bitmap.height == 0 {
        return graphics::raster(row_bytes as u16, 0, &[]);
    }

    let stride = row_bytes as usize;
    let mut out = Vec::with_capacity(packed.len() + graphics::RASTER_HEADER_LEN);
    let mut row = 0u32;
    while row < bitmap.height {
        let rows = (bitmap.height - row).min(MAX_ROWS_PER_COMMAND);
        let start = row as usize * stride;
        let end = start + rows as usize * stride;
        out.extend(graphics::raster(
            row_bytes as u16,
            rows as u16,
            &packed[start..end],
        ));
        row += rows;
    }
    out
}

/// Frame an encoded canvas as a complete print job.
///
/// ```text
/// ESC @ │ ESC d 4 │ GS v 0 ... │ ESC d 4 │ GS V 0
/// ```
pub fn job(canvas: &Canvas) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(commands::init());
    data.extend(commands::feed_lines(JOB_FEED_LINES));
    data.extend(encode(canvas));
    data.extend(commands::feed_lines(JOB_FEED_LINES));
    data.extend(commands::cut());
    data
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checkerboard(size: u32) -> Canvas {
        let mut canvas = Canvas::new(size, size);
        for y in 0..size {
            for x in 0..size {
                if (x + y) % 2 == 0 {
                    canvas.put(x as i64, y as i64, BLACK);
                }
            }
        }
        canvas
    }

    #[test]
    fn test_threshold_boundary() {
        let mut canvas = Canvas::new(3, 1);
        canvas.put(0, 0, 199);
        canvas.put(1, 0, 200);
        canvas.put(2, 0, 0);
        let bitmap = binarize(&canvas);
        assert_eq!(bitmap.dots, vec![true, false, true]);
    }

    #[test]
    fn test_checkerboard_bytes() {
        let cmd = encode(&checkerboard(8));
        let expected: Vec<u8> = [
            vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x08, 0x00],
            vec![0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55],
        ]
        .concat();
        assert_eq!(cmd, expected);
    }

    #[test]
    fn test_checkerboard_round_trip() {
        let canvas = checkerboard(8);
        let cmd = encode(&canvas);
        let decoded = unpack(&cmd[graphics::RASTER_HEADER_LEN..], 1, 8);
        assert_eq!(decoded, canvas);
    }

    #[test]
    fn test_width_padding() {
        assert_eq!(byte_aligned_width(385), 392);
        assert_eq!(byte_aligned_width(384), 384);

        let bitmap = stretch_to_byte_width(binarize(&Canvas::new(385, 3)));
        assert_eq!(bitmap.width, 392);
        assert_eq!(bitmap.dots.len(), 392 * 3);

        let cmd = encode(&Canvas::new(385, 3));
        assert_eq!(&cmd[4..6], &[49, 0]);
        assert_eq!(cmd.len(), 8 + 49 * 3);
    }

    #[test]
    fn test_stretch_is_nearest_neighbour() {
        // 4 dots wide: █░░█ → 8 dots wide, each source column doubled
        let mut canvas = Canvas::new(4, 1);
        canvas.put(0, 0, BLACK);
        canvas.put(3, 0, BLACK);
        let packed = pack(&stretch_to_byte_width(binarize(&canvas)));
        assert_eq!(packed, vec![0b1100_0011]);
    }

    #[test]
    fn test_stretch_keeps_rightmost_column() {
        let mut canvas = Canvas::new(385, 1);
        canvas.put(384, 0, BLACK);
        let bitmap = stretch_to_byte_width(binarize(&canvas));
        assert!(bitmap.is_black(391, 0));
        assert!(!bitmap.is_black(0, 0));
    }

    #[test]
    fn test_empty_canvas_encodes_header_only() {
        let cmd = encode(&Canvas::new(384, 0));
        assert_eq!(cmd, vec![0x1D, 0x76, 0x30, 0x00, 48, 0, 0, 0]);
    }

    #[test]
    fn test_tall_canvas_splits_commands() {
        let canvas = Canvas::new(8, MAX_ROWS_PER_COMMAND + 2);
        let cmd = encode(&canvas);
        let first_len = graphics::RASTER_HEADER_LEN + MAX_ROWS_PER_COMMAND as usize;
        assert_eq!(&cmd[6..8], &[0xFF, 0xFF]);
        assert_eq!(&cmd[first_len..first_len + 4], &graphics::RASTER_OPCODE);
        assert_eq!(&cmd[first_len + 6..first_len + 8], &[2, 0]);
        assert_eq!(cmd.len(), first_len + graphics::RASTER_HEADER_LEN + 2);
    }

    #[test]
    fn test_preview_is_black_and_white() {
        let mut canvas = Canvas::new(5, 2);
        canvas.put(0, 0, 120);
        canvas.put(4, 1, 230);
        let printed = preview(&canvas);
        assert_eq!((printed.width(), printed.height()), (8, 2));
        assert_eq!(printed.get(0, 0), BLACK);
        assert_eq!(printed.get(7, 1), WHITE);
        assert!(printed.as_raw().iter().all(|&p| p == BLACK || p == WHITE));
    }

    #[test]
    fn test_job_framing() {
        let data = job(&Canvas::new(8, 1));
        assert_eq!(&data[0..2], &[0x1B, 0x40]);
        assert_eq!(&data[2..5], &[0x1B, 0x64, 4]);
        assert_eq!(&data[5..9], &graphics::RASTER_OPCODE);
        let tail = &data[data.len() - 6..];
        assert_eq!(tail, &[0x1B, 0x64, 4, 0x1D, 0x56, 0x00]);
    }
}
