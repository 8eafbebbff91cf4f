//! Flyer generation pipeline: image composition and the background
//! orchestrators.
//!
//! The compositor and placeholder renderer are deterministic; all
//! non-determinism (the generative provider) stays behind the
//! [`postul_genai::ImageGenerator`] seam, bounded by the orchestrators'
//! timeout ceiling.

mod compositor;
mod orchestrator;
mod placeholder;
mod qr;

pub use compositor::{encode_png, ComposeError, Compositor};
pub use orchestrator::{
    build_orchestrators, EditFlyerCommand, EditOrchestrator, GenerateFlyerCommand,
    GenerationOrchestrator, PipelineConfig,
};
pub use placeholder::PlaceholderRenderer;
pub use qr::encode_qr;
