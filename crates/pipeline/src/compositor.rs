//! QR overlay compositing.
//!
//! Pastes the two QR tiles at the reserved coordinates from
//! [`postul_core::flyer::qr_regions`]. The coordinates are shared
//! constants, never derived from model output, and the overlay always
//! runs as deterministic post-processing regardless of whether the base
//! canvas came from the provider or the placeholder renderer.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

use postul_core::flyer::{
    project_url, qr_regions, survey_url, QrTarget, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use postul_core::types::DbId;

use crate::qr::encode_qr;

/// Errors from the deterministic imaging steps.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Decoding or encoding a raster failed.
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// The QR payload could not be encoded.
    #[error("QR encoding error: {0}")]
    Qr(#[from] qrcode::types::QrError),
}

/// Overlays survey and project QR tiles onto a base canvas.
pub struct Compositor {
    base_url: String,
}

impl Compositor {
    /// `base_url` is the public URL prefix encoded into both QR payloads.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Decode a base PNG, normalise it to the fixed canvas, paste both
    /// QR tiles, and re-encode.
    pub fn overlay_qr_codes(
        &self,
        base_png: &[u8],
        project_id: DbId,
    ) -> Result<Vec<u8>, ComposeError> {
        let decoded = image::load_from_memory(base_png)?;
        let mut canvas = normalize_canvas(decoded);
        self.overlay_onto(&mut canvas, project_id)?;
        encode_png(&canvas)
    }

    /// Paste both QR tiles onto an already-sized canvas in place.
    pub fn overlay_onto(
        &self,
        canvas: &mut RgbaImage,
        project_id: DbId,
    ) -> Result<(), ComposeError> {
        for region in qr_regions() {
            let payload = match region.target {
                QrTarget::Survey => survey_url(&self.base_url, project_id),
                QrTarget::Project => project_url(&self.base_url, project_id),
            };
            let tile = encode_qr(&payload, region.size)?;
            image::imageops::overlay(canvas, &tile, i64::from(region.x), i64::from(region.y));
        }
        Ok(())
    }
}

/// Resize arbitrary provider output to the fixed canvas dimensions.
///
/// The reserved coordinates only hold on the canonical canvas, so any
/// other size is stretched to fit before compositing.
fn normalize_canvas(decoded: DynamicImage) -> RgbaImage {
    if decoded.width() == CANVAS_WIDTH && decoded.height() == CANVAS_HEIGHT {
        return decoded.into_rgba8();
    }
    decoded
        .resize_exact(CANVAS_WIDTH, CANVAS_HEIGHT, FilterType::Lanczos3)
        .into_rgba8()
}

/// Encode a canvas as PNG bytes.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut buffer = Cursor::new(Vec::new());
    canvas.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
