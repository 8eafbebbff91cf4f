//! Handlers for the flyer generation pipeline.
//!
//! Routes:
//! - `POST /flyers/generate`           — start (or return the existing) flyer
//! - `POST /flyers/{id}/edit`          — queue a conversational edit
//! - `GET  /flyers/{id}`               — poll a flyer by id
//! - `GET  /flyers/project/{id}`       — poll a project's flyer
//!
//! The generate and edit handlers persist the job, hand the background
//! orchestrator a command carrying everything the run needs, and return
//! immediately; clients observe progress by polling the read endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use postul_core::conversation::ConversationTurn;
use postul_core::error::CoreError;
use postul_core::flyer::{FlyerBrief, MAX_EDITS};
use postul_core::types::DbId;
use postul_db::models::flyer::{
    EditFlyerRequest, EditFlyerResponse, FlyerResponse, GenerateFlyerRequest,
    GenerateFlyerResponse,
};
use postul_db::models::status::FlyerStatus;
use postul_db::repositories::{FlyerRepo, IdeaRepo, ProjectRepo};
use postul_pipeline::{EditFlyerCommand, GenerateFlyerCommand};

use crate::error::{AppError, AppResult};
use crate::extract::CallerId;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/flyers/generate
///
/// Validates that the project and idea exist for the caller, then either
/// returns the project's existing flyer with 200 (one flyer per project;
/// repeat calls are idempotent and spawn nothing) or creates a `pending`
/// record, schedules the generation run, and returns 201.
pub async fn generate_flyer(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(input): Json<GenerateFlyerRequest>,
) -> AppResult<impl IntoResponse> {
    let project = ProjectRepo::find_for_user(&state.pool, input.project_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;

    let idea = IdeaRepo::find_for_project(&state.pool, input.idea_id, project.id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Idea",
            id: input.idea_id,
        }))?;

    if let Some(existing) = FlyerRepo::find_by_project(&state.pool, project.id, user_id).await? {
        tracing::debug!(flyer_id = existing.id, project_id = project.id, "Returning existing flyer");
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: GenerateFlyerResponse::from(&existing),
            }),
        ));
    }

    let flyer = FlyerRepo::create(&state.pool, user_id, project.id, idea.id).await?;

    let brief = FlyerBrief {
        project_name: project.name,
        project_description: project.description.unwrap_or_default(),
        problem_statement: idea.problem_statement(),
    };
    state.generation.spawn(GenerateFlyerCommand {
        flyer_id: flyer.id,
        project_id: project.id,
        brief,
    });
    tracing::info!(flyer_id = flyer.id, project_id = project.id, "Flyer generation scheduled");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GenerateFlyerResponse::from(&flyer),
        }),
    ))
}

/// POST /api/v1/flyers/{id}/edit
///
/// Accepts an edit instruction for a completed flyer. The preconditions
/// are checked twice: first against a fresh read to produce a specific
/// error message, then atomically inside the queueing UPDATE, so two
/// near-simultaneous submissions cannot both be accepted.
pub async fn edit_flyer(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(flyer_id): Path<DbId>,
    Json(input): Json<EditFlyerRequest>,
) -> AppResult<impl IntoResponse> {
    if input.edit_instruction.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Edit instruction must not be empty".into(),
        )));
    }

    let flyer = FlyerRepo::find_by_id(&state.pool, flyer_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flyer",
            id: flyer_id,
        }))?;

    if matches!(
        flyer.status(),
        FlyerStatus::Pending | FlyerStatus::Processing
    ) {
        return Err(AppError::Core(CoreError::Conflict(
            "A generation or edit is already queued for this flyer; wait for it to finish".into(),
        )));
    }
    if flyer.image.is_none() {
        return Err(AppError::Core(CoreError::Conflict(
            "Flyer has no image to edit yet".into(),
        )));
    }
    if flyer.edit_count >= MAX_EDITS {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Edit limit of {MAX_EDITS} reached for this flyer"
        ))));
    }

    let turn = ConversationTurn::user(input.edit_instruction.clone());
    let Some(queued) = FlyerRepo::queue_edit(&state.pool, flyer.id, user_id, &turn).await? else {
        // The guarded UPDATE re-checks every precondition; losing here
        // means another submission was accepted in between.
        return Err(AppError::Core(CoreError::Conflict(
            "Flyer state changed while accepting the edit; retry after polling".into(),
        )));
    };

    state.editing.spawn(EditFlyerCommand {
        flyer_id: queued.id,
        instruction: input.edit_instruction,
    });
    tracing::info!(flyer_id = queued.id, edit_count = queued.edit_count, "Flyer edit scheduled");

    Ok(Json(DataResponse {
        data: EditFlyerResponse {
            status: queued.status().as_str(),
            edit_count: queued.edit_count,
            conversation_history: queued.conversation_history.0,
            image: None,
        },
    }))
}

/// GET /api/v1/flyers/{id}
pub async fn get_flyer(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(flyer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let flyer = FlyerRepo::find_by_id(&state.pool, flyer_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flyer",
            id: flyer_id,
        }))?;

    Ok(Json(DataResponse {
        data: FlyerResponse::from(flyer),
    }))
}

/// GET /api/v1/flyers/project/{project_id}
pub async fn get_flyer_by_project(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let flyer = FlyerRepo::find_by_project(&state.pool, project_id, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Flyer",
            id: project_id,
        }))?;

    Ok(Json(DataResponse {
        data: FlyerResponse::from(flyer),
    }))
}
