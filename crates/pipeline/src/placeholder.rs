//! Placeholder renderer: deterministic fallback canvas.
//!
//! Invoked only when the generative step produced nothing usable. The
//! output carries the brief as text plus two dashed-outline rectangles at
//! exactly the reserved coordinates, so the QR overlay step runs
//! uniformly regardless of which path produced the base canvas.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use postul_core::flyer::{qr_regions, FlyerBrief, ReservedRegion, CANVAS_HEIGHT, CANVAS_WIDTH};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLACK: Rgba<u8> = Rgba([20, 20, 20, 255]);
const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
const DARK_BLUE: Rgba<u8> = Rgba([24, 48, 96, 255]);

const DASH_LENGTH: u32 = 10;
const GAP_LENGTH: u32 = 10;
const STROKE: u32 = 3;

/// Left margin for all text.
const TEXT_X: i32 = 200;
/// Characters per wrapped text line.
const WRAP_COLUMNS: usize = 80;

/// Renders the fallback canvas.
///
/// The font is optional: when none could be loaded the text layer is
/// skipped and the canvas still carries the dashed rectangles, which is
/// all the overlay step needs.
pub struct PlaceholderRenderer {
    font: Option<FontVec>,
}

impl PlaceholderRenderer {
    /// Load the configured font, if any.
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = font_path.and_then(|path| match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Placeholder font is not a usable font file");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Placeholder font could not be read; rendering without text");
                None
            }
        });
        Self { font }
    }

    /// Render the placeholder canvas for a brief.
    pub fn render(&self, brief: &FlyerBrief) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, WHITE);

        if let Some(font) = &self.font {
            let mut y = 300;
            draw_text_mut(
                &mut canvas,
                BLACK,
                TEXT_X,
                y,
                PxScale::from(80.0),
                font,
                &brief.project_name,
            );
            y = 500;
            for line in wrap_text(&brief.project_description, WRAP_COLUMNS, 200) {
                draw_text_mut(&mut canvas, GRAY, TEXT_X, y, PxScale::from(50.0), font, &line);
                y += 60;
            }
            y += 100;
            draw_text_mut(&mut canvas, BLACK, TEXT_X, y, PxScale::from(50.0), font, "Problem:");
            y += 70;
            for line in wrap_text(&brief.problem_statement, WRAP_COLUMNS, 300) {
                draw_text_mut(
                    &mut canvas,
                    DARK_BLUE,
                    TEXT_X,
                    y,
                    PxScale::from(40.0),
                    font,
                    &line,
                );
                y += 50;
            }
        }

        for region in qr_regions() {
            draw_dashed_outline(&mut canvas, region);
            if let Some(font) = &self.font {
                draw_text_mut(
                    &mut canvas,
                    GRAY,
                    (region.x + 50) as i32,
                    (region.y + region.size / 2 - 20) as i32,
                    PxScale::from(40.0),
                    font,
                    "QR Code",
                );
            }
        }

        canvas
    }
}

/// Draw the dashed square outline marking a reserved region.
fn draw_dashed_outline(canvas: &mut RgbaImage, region: ReservedRegion) {
    let step = DASH_LENGTH + GAP_LENGTH;
    let right = region.x + region.size;
    let bottom = region.y + region.size;

    let mut x = region.x;
    while x < right {
        let len = DASH_LENGTH.min(right - x);
        draw_filled_rect_mut(
            canvas,
            Rect::at(x as i32, region.y as i32).of_size(len, STROKE),
            GRAY,
        );
        draw_filled_rect_mut(
            canvas,
            Rect::at(x as i32, (bottom - STROKE) as i32).of_size(len, STROKE),
            GRAY,
        );
        x += step;
    }

    let mut y = region.y;
    while y < bottom {
        let len = DASH_LENGTH.min(bottom - y);
        draw_filled_rect_mut(
            canvas,
            Rect::at(region.x as i32, y as i32).of_size(STROKE, len),
            GRAY,
        );
        draw_filled_rect_mut(
            canvas,
            Rect::at((right - STROKE) as i32, y as i32).of_size(STROKE, len),
            GRAY,
        );
        y += step;
    }
}

/// Hard-wrap `text` into lines of at most `columns` characters, reading
/// at most `budget` characters of input (the brief can be arbitrarily
/// long; the canvas cannot).
fn wrap_text(text: &str, columns: usize, budget: usize) -> Vec<String> {
    let capped: String = text.chars().take(budget).collect();
    capped
        .split('\n')
        .flat_map(|paragraph| {
            let chars: Vec<char> = paragraph.chars().collect();
            chars
                .chunks(columns)
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .collect()
}
