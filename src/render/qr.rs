//! QR symbol rendering.
//!
//! Symbols are always generated at error-correction level L and drawn as
//! square modules with a quiet-zone border.

use qrcode::{Color, EcLevel, QrCode};

use super::canvas::{BLACK, Canvas};
use crate::error::PrintError;

/// Render `data` as a QR symbol no wider than `available`.
///
/// The natural size is `(modules + 2 * border_modules) * module_size` dots
/// square. A symbol that would be wider is drawn straight at `available`
/// dots, sampling modules nearest-neighbour so edges stay hard. Data that
/// does not fit any symbol version is a layout error.
pub fn encode(
    data: &str,
    module_size: u32,
    border_modules: u32,
    available: u32,
) -> Result<Canvas, PrintError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| PrintError::Layout(format!("QR code generation failed: {}", e)))?;

    let modules = code.width() as u32;
    let span = border_modules
        .checked_mul(2)
        .and_then(|border| border.checked_add(modules))
        .ok_or_else(|| {
            PrintError::Layout(format!("QR border of {} modules is too wide", border_modules))
        })?;
    let side = match span.checked_mul(module_size.max(1)) {
        Some(natural) if natural <= available => natural,
        _ => available,
    };

    let mut canvas = Canvas::new(side, side);
    let module_at = |dot: u32| (u64::from(dot) * u64::from(span) / u64::from(side)) as u32;
    for y in 0..side {
        let qy = module_at(y);
        if qy < border_modules || qy - border_modules >= modules {
            continue;
        }
        for x in 0..side {
            let qx = module_at(x);
            if qx < border_modules || qx - border_modules >= modules {
                continue;
            }
            let (mx, my) = ((qx - border_modules) as usize, (qy - border_modules) as usize);
            if code[(mx, my)] == Color::Dark {
                canvas.put(x as i64, y as i64, BLACK);
            }
        }
    }

    log::debug!(
        "qr: {} modules (+{} border) at {} dots/module -> {}x{}",
        modules,
        border_modules,
        module_size,
        side,
        side
    );
    Ok(canvas)
}
