//! Flyer constants, canvas geometry, and small domain helpers.
//!
//! The reserved QR regions are shared constants consumed by the prompt
//! builders, the compositor, and the placeholder renderer. They are never
//! derived from model output: pixel-exact placement cannot be guaranteed
//! from a generative response, so the overlay step always runs as
//! deterministic post-processing.

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Canvas geometry
// ---------------------------------------------------------------------------

/// Canvas width in pixels (A4 portrait at 300 dpi).
pub const CANVAS_WIDTH: u32 = 2480;
/// Canvas height in pixels (A4 portrait at 300 dpi).
pub const CANVAS_HEIGHT: u32 = 3508;
/// Side length of each square reserved QR region.
pub const QR_SIZE: u32 = 400;
/// Margin between a reserved region and the nearest canvas edges.
pub const QR_MARGIN: u32 = 200;

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Maximum number of successful edits permitted per flyer.
pub const MAX_EDITS: i32 = 5;
/// Persisted error messages are truncated to this many characters.
pub const ERROR_MESSAGE_CAP: usize = 500;
/// Default ceiling on a single generation or edit call, in seconds.
pub const GENERATION_TIMEOUT_SECS: u64 = 600;
/// Default public base URL encoded into the QR payloads.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://postul.app";

// ---------------------------------------------------------------------------
// Reserved regions
// ---------------------------------------------------------------------------

/// What a reserved region links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrTarget {
    /// Bottom-left region: the idea-validation survey.
    Survey,
    /// Bottom-right region: the project detail page.
    Project,
}

/// A fixed-geometry square set aside on the canvas for a QR overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservedRegion {
    pub target: QrTarget,
    /// Left edge, in pixels from the canvas left.
    pub x: u32,
    /// Top edge, in pixels from the canvas top.
    pub y: u32,
    /// Side length in pixels.
    pub size: u32,
}

/// The two reserved regions: survey bottom-left, project bottom-right.
pub fn qr_regions() -> [ReservedRegion; 2] {
    let y = CANVAS_HEIGHT - QR_SIZE - QR_MARGIN;
    [
        ReservedRegion {
            target: QrTarget::Survey,
            x: QR_MARGIN,
            y,
            size: QR_SIZE,
        },
        ReservedRegion {
            target: QrTarget::Project,
            x: CANVAS_WIDTH - QR_SIZE - QR_MARGIN,
            y,
            size: QR_SIZE,
        },
    ]
}

/// URL encoded into the survey QR code.
pub fn survey_url(base_url: &str, project_id: DbId) -> String {
    format!("{}/survey/{project_id}", base_url.trim_end_matches('/'))
}

/// URL encoded into the project QR code.
pub fn project_url(base_url: &str, project_id: DbId) -> String {
    format!("{}/project/{project_id}", base_url.trim_end_matches('/'))
}

// ---------------------------------------------------------------------------
// Brief
// ---------------------------------------------------------------------------

/// The text brief a flyer is generated from.
///
/// Assembled by the request handler from the project and idea rows and
/// carried into the background run, so the run never has to re-read the
/// upstream entities.
#[derive(Debug, Clone)]
pub struct FlyerBrief {
    pub project_name: String,
    pub project_description: String,
    pub problem_statement: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Truncate an error message to [`ERROR_MESSAGE_CAP`] characters.
///
/// Operates on characters, not bytes, so multi-byte input never splits a
/// code point.
pub fn truncate_error(message: &str) -> String {
    if message.chars().count() <= ERROR_MESSAGE_CAP {
        return message.to_string();
    }
    message.chars().take(ERROR_MESSAGE_CAP).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_sit_inside_the_canvas() {
        for region in qr_regions() {
            assert!(region.x + region.size <= CANVAS_WIDTH);
            assert!(region.y + region.size <= CANVAS_HEIGHT);
        }
    }

    #[test]
    fn regions_do_not_overlap() {
        let [survey, project] = qr_regions();
        assert!(survey.x + survey.size < project.x);
        assert_eq!(survey.y, project.y);
    }

    #[test]
    fn survey_region_is_bottom_left() {
        let [survey, _] = qr_regions();
        assert_eq!(survey.target, QrTarget::Survey);
        assert_eq!(survey.x, QR_MARGIN);
        assert_eq!(survey.y, CANVAS_HEIGHT - QR_SIZE - QR_MARGIN);
    }

    #[test]
    fn urls_embed_the_project_id() {
        assert_eq!(
            survey_url("https://postul.app", 42),
            "https://postul.app/survey/42"
        );
        assert_eq!(
            project_url("https://postul.app/", 42),
            "https://postul.app/project/42"
        );
    }

    #[test]
    fn truncate_leaves_short_messages_alone() {
        assert_eq!(truncate_error("boom"), "boom");
    }

    #[test]
    fn truncate_caps_long_messages() {
        let long = "x".repeat(2000);
        assert_eq!(truncate_error(&long).chars().count(), ERROR_MESSAGE_CAP);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(ERROR_MESSAGE_CAP + 10);
        let truncated = truncate_error(&long);
        assert_eq!(truncated.chars().count(), ERROR_MESSAGE_CAP);
    }
}
