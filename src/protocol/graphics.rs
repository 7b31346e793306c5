//! # ESC/POS Raster Graphics Command
//!
//! This module implements the `GS v 0` raster bit image command, the only
//! graphics command a rollprint job uses: the whole receipt travels as one
//! monochrome bitmap.
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (horizontal, 384 or 512 dots)
//!   │
//!   │   ████████  ← Each dot is ~0.125mm (203 DPI)
//!   │   ████████
//!   ▼
//!   Y (vertical, paper feed direction)
//! ```
//!
//! ## Bit Packing
//!
//! Graphics data is packed as bytes where each bit represents one dot:
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```

use super::commands::{GS, u16_le};

/// `GS v 0 m` with m = 0 (normal density). Every raster command starts with it.
pub const RASTER_OPCODE: [u8; 4] = [GS, b'v', b'0', 0];

/// Header length: opcode, row bytes, height.
pub const RASTER_HEADER_LEN: usize = 8;

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// Prints a monochrome raster image of arbitrary height.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | GS v 0 m xL xH yL yH d1...dk |
/// | Hex     | 1D 76 30 m xL xH yL yH d1...dk |
/// | Decimal | 29 118 48 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `m`: Scaling mode, always 0 (normal)
/// - `xL, xH`: Width in bytes, little-endian
/// - `yL, yH`: Height in dots, little-endian
/// - `d1...dk`: Image data, k = row_bytes × height bytes
///
/// ## Data Layout
///
/// Row-by-row, each byte is 8 horizontal dots:
///
/// ```text
/// Row 0:    d[0]      d[1]       ... d[row_bytes-1]
/// Row 1:    d[row_bytes] ...
/// ...
/// ```
///
/// ## Example
///
/// ```
/// use rollprint::protocol::graphics;
///
/// // 384-dot wide (48 bytes), 100-row tall image
/// let data = vec![0xAA; 48 * 100];
/// let cmd = graphics::raster(48, 100, &data);
///
/// assert_eq!(&cmd[0..4], &[0x1D, 0x76, 0x30, 0x00]);
/// assert_eq!(&cmd[4..6], &[48, 0]);  // row bytes
/// assert_eq!(&cmd[6..8], &[100, 0]); // height
/// assert_eq!(cmd.len(), 8 + 48 * 100);
/// ```
pub fn raster(row_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == row_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        row_bytes as usize * height as usize,
        row_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(row_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(RASTER_HEADER_LEN + data.len());
    cmd.extend_from_slice(&RASTER_OPCODE);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}

// ============================================================================
// TESTS
// ============================================================================
