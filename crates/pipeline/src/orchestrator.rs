//! Background orchestrators for flyer generation and editing.
//!
//! Scheduling is fire-and-forget: request handlers persist the record,
//! hand the spawned task an explicit command carrying everything it
//! needs (so the task never has to guess when the creating write becomes
//! visible), and return immediately. Each run claims its row with a
//! compare-and-set `pending → processing` transition and is guaranteed
//! to reach a terminal state: the provider call is bounded by a timeout
//! ceiling, every provider failure falls back to a deterministic path,
//! and any remaining error marks the job `failed`. A failure in one run
//! never affects another.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use postul_core::conversation::ConversationTurn;
use postul_core::flyer::{truncate_error, FlyerBrief};
use postul_core::prompt::{build_edit_prompt, build_generation_prompt};
use postul_core::types::DbId;
use postul_db::repositories::FlyerRepo;
use postul_db::DbPool;
use postul_genai::{GenerationOutcome, ImageGenerator};

use crate::compositor::{encode_png, ComposeError, Compositor};
use crate::placeholder::PlaceholderRenderer;

/// Settings for both orchestrators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Ceiling on a single provider call, enforced here independently of
    /// the adapter's own client timeout.
    pub generation_timeout: Duration,
    /// Public URL prefix encoded into the QR payloads.
    pub public_base_url: String,
    /// Optional TTF/OTF path for placeholder text.
    pub placeholder_font_path: Option<PathBuf>,
}

/// Dependencies shared by both orchestrators, built once at startup and
/// passed explicitly (no global state).
struct PipelineContext {
    pool: DbPool,
    generator: Arc<dyn ImageGenerator>,
    compositor: Compositor,
    placeholder: PlaceholderRenderer,
    ceiling: Duration,
}

/// Construct both orchestrators over one shared context.
pub fn build_orchestrators(
    pool: DbPool,
    generator: Arc<dyn ImageGenerator>,
    config: PipelineConfig,
) -> (Arc<GenerationOrchestrator>, Arc<EditOrchestrator>) {
    let ctx = Arc::new(PipelineContext {
        pool,
        generator,
        compositor: Compositor::new(config.public_base_url),
        placeholder: PlaceholderRenderer::new(config.placeholder_font_path.as_deref()),
        ceiling: config.generation_timeout,
    });
    (
        Arc::new(GenerationOrchestrator {
            ctx: Arc::clone(&ctx),
        }),
        Arc::new(EditOrchestrator { ctx }),
    )
}

/// Everything the initial-creation run needs, captured at request time.
#[derive(Debug, Clone)]
pub struct GenerateFlyerCommand {
    pub flyer_id: DbId,
    pub project_id: DbId,
    pub brief: FlyerBrief,
}

/// Everything an edit run needs, captured at request time.
#[derive(Debug, Clone)]
pub struct EditFlyerCommand {
    pub flyer_id: DbId,
    pub instruction: String,
}

/// Fatal errors inside a background run; mapped to `status = failed`.
#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Compositing error: {0}")]
    Compose(#[from] ComposeError),
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Runs the initial-creation workflow.
pub struct GenerationOrchestrator {
    ctx: Arc<PipelineContext>,
}

impl GenerationOrchestrator {
    /// Schedule a generation run; returns immediately.
    pub fn spawn(&self, command: GenerateFlyerCommand) {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            let flyer_id = command.flyer_id;
            if let Err(e) = run_generation(&ctx, command).await {
                fail_run(&ctx.pool, flyer_id, &e).await;
            }
        });
    }
}

async fn run_generation(
    ctx: &PipelineContext,
    command: GenerateFlyerCommand,
) -> Result<(), PipelineError> {
    let Some(_claimed) = FlyerRepo::begin_processing(&ctx.pool, command.flyer_id).await? else {
        tracing::warn!(
            flyer_id = command.flyer_id,
            "Generation run found no pending flyer to claim; aborting"
        );
        return Ok(());
    };

    let prompt = build_generation_prompt(&command.brief);
    let attempt = attempt_generation(ctx.generator.as_ref(), &prompt, ctx.ceiling).await;
    let (image, summary) = resolve_generation(
        &ctx.compositor,
        &ctx.placeholder,
        attempt,
        &command.brief,
        command.project_id,
    )?;

    let history = vec![
        ConversationTurn::user(prompt),
        ConversationTurn::assistant(summary),
    ];
    let completed =
        FlyerRepo::complete_generation(&ctx.pool, command.flyer_id, &image, &history).await?;
    if completed {
        tracing::info!(flyer_id = command.flyer_id, "Flyer generation completed");
    } else {
        tracing::warn!(
            flyer_id = command.flyer_id,
            "Flyer left processing before completion could be persisted"
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// Runs the multi-turn edit workflow under the edit quota.
pub struct EditOrchestrator {
    ctx: Arc<PipelineContext>,
}

impl EditOrchestrator {
    /// Schedule an edit run; returns immediately.
    pub fn spawn(&self, command: EditFlyerCommand) {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            let flyer_id = command.flyer_id;
            if let Err(e) = run_edit(&ctx, command).await {
                fail_run(&ctx.pool, flyer_id, &e).await;
            }
        });
    }
}

async fn run_edit(ctx: &PipelineContext, command: EditFlyerCommand) -> Result<(), PipelineError> {
    let Some(flyer) = FlyerRepo::begin_processing(&ctx.pool, command.flyer_id).await? else {
        tracing::warn!(
            flyer_id = command.flyer_id,
            "Edit run found no pending flyer to claim; aborting"
        );
        return Ok(());
    };

    // The submit handler guarantees an image exists before queueing.
    let Some(current_image) = flyer.image else {
        tracing::error!(flyer_id = flyer.id, "Edit run found no image to edit");
        FlyerRepo::mark_failed(&ctx.pool, flyer.id, "No image available to edit").await?;
        return Ok(());
    };

    let prompt = build_edit_prompt(&command.instruction);
    let mut history = flyer.conversation_history.0;
    let attempt = attempt_edit(
        ctx.generator.as_ref(),
        &current_image,
        &prompt,
        &history,
        ctx.ceiling,
    )
    .await;

    let resolution = resolve_edit(
        &ctx.compositor,
        attempt,
        current_image,
        flyer.project_id,
        &command.instruction,
    );

    history.push(ConversationTurn::assistant(resolution.summary));
    let completed = FlyerRepo::finish_edit(
        &ctx.pool,
        flyer.id,
        &resolution.image,
        resolution.quota_consumed,
        &history,
    )
    .await?;
    if completed {
        tracing::info!(
            flyer_id = flyer.id,
            quota_consumed = resolution.quota_consumed,
            "Flyer edit completed"
        );
    } else {
        tracing::warn!(
            flyer_id = flyer.id,
            "Flyer left processing before edit completion could be persisted"
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Provider attempt + outcome resolution
// ---------------------------------------------------------------------------

/// Why a run fell back to its deterministic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackReason {
    /// The orchestrator's timeout ceiling fired.
    Timeout,
    /// The adapter reported a transport or API failure.
    Failure,
    /// The provider answered without an image payload.
    Empty,
}

/// Result of one bounded provider call.
#[derive(Debug)]
enum Attempt {
    Image(Vec<u8>),
    Fallback(FallbackReason),
}

async fn attempt_generation(
    generator: &dyn ImageGenerator,
    prompt: &str,
    ceiling: Duration,
) -> Attempt {
    match tokio::time::timeout(ceiling, generator.generate(prompt)).await {
        Ok(Ok(GenerationOutcome::Image(bytes))) => Attempt::Image(bytes),
        Ok(Ok(GenerationOutcome::Empty)) => {
            tracing::warn!("Provider returned no image; using placeholder");
            Attempt::Fallback(FallbackReason::Empty)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Provider generation failed; using placeholder");
            Attempt::Fallback(FallbackReason::Failure)
        }
        Err(_) => {
            tracing::warn!(
                ceiling_secs = ceiling.as_secs(),
                "Provider generation timed out; using placeholder"
            );
            Attempt::Fallback(FallbackReason::Timeout)
        }
    }
}

async fn attempt_edit(
    generator: &dyn ImageGenerator,
    image: &[u8],
    prompt: &str,
    history: &[ConversationTurn],
    ceiling: Duration,
) -> Attempt {
    match tokio::time::timeout(ceiling, generator.edit(image, prompt, history)).await {
        Ok(Ok(GenerationOutcome::Image(bytes))) => Attempt::Image(bytes),
        Ok(Ok(GenerationOutcome::Empty)) => {
            tracing::warn!("Provider returned no edited image; keeping previous image");
            Attempt::Fallback(FallbackReason::Empty)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Provider edit failed; keeping previous image");
            Attempt::Fallback(FallbackReason::Failure)
        }
        Err(_) => {
            tracing::warn!(
                ceiling_secs = ceiling.as_secs(),
                "Provider edit timed out; keeping previous image"
            );
            Attempt::Fallback(FallbackReason::Timeout)
        }
    }
}

/// Turn a generation attempt into the final composited image plus the
/// assistant summary recorded in the history.
///
/// Provider bytes that fail to decode are treated like any other
/// provider failure: the placeholder takes over. Only a placeholder
/// compositing failure is fatal.
fn resolve_generation(
    compositor: &Compositor,
    placeholder: &PlaceholderRenderer,
    attempt: Attempt,
    brief: &FlyerBrief,
    project_id: DbId,
) -> Result<(Vec<u8>, &'static str), ComposeError> {
    let reason = match attempt {
        Attempt::Image(bytes) => match compositor.overlay_qr_codes(&bytes, project_id) {
            Ok(image) => return Ok((image, "Generated initial flyer with QR codes embedded")),
            Err(e) => {
                tracing::error!(error = %e, "Provider image unusable; using placeholder");
                FallbackReason::Failure
            }
        },
        Attempt::Fallback(reason) => reason,
    };

    let mut canvas = placeholder.render(brief);
    compositor.overlay_onto(&mut canvas, project_id)?;
    let image = encode_png(&canvas)?;
    let summary = match reason {
        FallbackReason::Timeout => "Generated placeholder flyer (provider timeout)",
        FallbackReason::Failure => "Generated placeholder flyer (provider error)",
        FallbackReason::Empty => "Generated placeholder flyer (provider returned no image)",
    };
    Ok((image, summary))
}

/// Outcome of an edit run, ready to persist.
struct EditResolution {
    image: Vec<u8>,
    /// 1 when the provider edit succeeded, 0 otherwise: a provider
    /// failure must not cost the user an edit.
    quota_consumed: i32,
    summary: String,
}

/// Turn an edit attempt into the image to persist.
///
/// A successful edit passes through the QR compositor again rather than
/// trusting the model to have preserved the reserved regions. Every
/// fallback retains the previous image byte-for-byte.
fn resolve_edit(
    compositor: &Compositor,
    attempt: Attempt,
    current_image: Vec<u8>,
    project_id: DbId,
    instruction: &str,
) -> EditResolution {
    let reason = match attempt {
        Attempt::Image(bytes) => match compositor.overlay_qr_codes(&bytes, project_id) {
            Ok(image) => {
                return EditResolution {
                    image,
                    quota_consumed: 1,
                    summary: format!("Edited flyer according to: {instruction}"),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Edited image unusable; keeping previous image");
                FallbackReason::Failure
            }
        },
        Attempt::Fallback(reason) => reason,
    };

    let summary = match reason {
        FallbackReason::Timeout => "Edit timed out, keeping the previous image",
        FallbackReason::Failure => "Edit failed, keeping the previous image",
        FallbackReason::Empty => "Provider returned no edited image, keeping the previous image",
    };
    EditResolution {
        image: current_image,
        quota_consumed: 0,
        summary: summary.to_string(),
    }
}

/// Terminal handler for a fatal run error: persist `failed` with a
/// truncated message. A persistence failure here can only be logged.
async fn fail_run(pool: &DbPool, flyer_id: DbId, error: &PipelineError) {
    tracing::error!(flyer_id, error = %error, "Background flyer run failed");
    let message = truncate_error(&error.to_string());
    if let Err(e) = FlyerRepo::mark_failed(pool, flyer_id, &message).await {
        tracing::error!(flyer_id, error = %e, "Failed to persist flyer failure status");
    }
}
