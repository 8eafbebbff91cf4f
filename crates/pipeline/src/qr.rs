//! QR encoding onto a fixed-size raster tile.

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};

use crate::compositor::ComposeError;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Quiet-zone width in modules around the code, per the QR spec.
const QUIET_ZONE: u32 = 4;

/// Encode `payload` as a `size`×`size` QR tile.
///
/// Uses error-correction level H: the flyer is meant for print, where
/// scuffs and low-light phone scans eat into the error budget.
pub fn encode_qr(payload: &str, size: u32) -> Result<RgbaImage, ComposeError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)?;
    let modules = code.to_colors();
    let width = code.width() as u32;
    let total = width + 2 * QUIET_ZONE;

    let mut tile = RgbaImage::from_pixel(size, size, WHITE);
    for y in 0..size {
        for x in 0..size {
            // Nearest-module sampling; the quiet zone stays white.
            let mx = x * total / size;
            let my = y * total / size;
            if mx < QUIET_ZONE || my < QUIET_ZONE {
                continue;
            }
            let (mx, my) = (mx - QUIET_ZONE, my - QUIET_ZONE);
            if mx >= width || my >= width {
                continue;
            }
            if modules[(my * width + mx) as usize] == Color::Dark {
                tile.put_pixel(x, y, BLACK);
            }
        }
    }
    Ok(tile)
}
