//! Prompt builders for the generative image provider.
//!
//! Both prompts instruct the model to keep the two reserved QR regions
//! untouched; the model is only ever asked to *avoid* those areas, it
//! never draws QR content itself.

use crate::flyer::{FlyerBrief, CANVAS_HEIGHT, CANVAS_WIDTH, QR_SIZE};

/// Build the prompt for initial flyer generation from a brief.
pub fn build_generation_prompt(brief: &FlyerBrief) -> String {
    format!(
        "Create a professional, eye-catching A4-sized flyer ({CANVAS_WIDTH}x{CANVAS_HEIGHT} pixels) \
for a startup idea validation campaign.\n\
\n\
Project details:\n\
- Name: {name}\n\
- Description: {description}\n\
- Problem statement: {problem}\n\
\n\
Design requirements:\n\
1. An engaging, modern design suitable for printing.\n\
2. The project name displayed prominently.\n\
3. The problem statement highlighted.\n\
4. A clean, professional colour scheme.\n\
5. Leave TWO blank dotted rectangular areas (approximately {QR_SIZE}x{QR_SIZE} pixels each) \
in the bottom corners: the bottom-left one for a survey QR code, the bottom-right one for a \
project link QR code. Do not draw anything inside them.\n\
6. Visually appealing and suitable for sharing on social media.\n\
\n\
The flyer should attract people to scan the QR codes and engage with the idea validation process.",
        name = brief.project_name,
        description = brief.project_description,
        problem = brief.problem_statement,
    )
}

/// Build the prompt for a multi-turn edit of an existing flyer.
pub fn build_edit_prompt(instruction: &str) -> String {
    format!(
        "Edit this flyer image according to the following instruction:\n\
{instruction}\n\
\n\
Important: keep the two QR code areas in the bottom corners exactly as they are. \
Only modify other parts of the flyer design.",
    )
}
