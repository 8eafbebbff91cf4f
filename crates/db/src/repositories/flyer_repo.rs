//! Repository for the `flyers` table.
//!
//! The status lifecycle is `pending → processing → {completed, failed}`,
//! re-entering at `pending` when an edit is accepted. Every transition is
//! a single guarded UPDATE: a caller that loses a race gets `None` (or
//! `false`) back and must not proceed with its run.

use sqlx::types::Json;
use sqlx::PgPool;

use postul_core::conversation::ConversationTurn;
use postul_core::flyer::MAX_EDITS;
use postul_core::types::DbId;

use crate::models::flyer::Flyer;
use crate::models::status::FlyerStatus;

/// Column list for `flyers` queries.
const COLUMNS: &str = "\
    id, user_id, project_id, idea_id, image, edit_count, \
    conversation_history, status_id, error_message, created_at, updated_at";

/// CRUD and state transitions for flyer jobs.
pub struct FlyerRepo;

impl FlyerRepo {
    /// Insert a new flyer in `pending` with no image and an empty history.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        idea_id: DbId,
    ) -> Result<Flyer, sqlx::Error> {
        let query = format!(
            "INSERT INTO flyers (user_id, project_id, idea_id, status_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flyer>(&query)
            .bind(user_id)
            .bind(project_id)
            .bind(idea_id)
            .bind(FlyerStatus::Pending.id())
            .fetch_one(pool)
            .await
    }

    /// Fetch a flyer by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        flyer_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Flyer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM flyers WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Flyer>(&query)
            .bind(flyer_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the flyer for a project, scoped to its owner.
    ///
    /// One flyer exists per (project, owner) pair, enforced by
    /// lookup-before-create in the handler; newest-first ordering keeps
    /// the read deterministic even if that ever regresses.
    pub async fn find_by_project(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Flyer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM flyers \
             WHERE project_id = $1 AND user_id = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Flyer>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Transition `pending → processing` and return the fresh row.
    ///
    /// Returns `None` when the flyer is missing or no longer `pending`
    /// (another task won the race); the caller must abort its run without
    /// side effects.
    pub async fn begin_processing(
        pool: &PgPool,
        flyer_id: DbId,
    ) -> Result<Option<Flyer>, sqlx::Error> {
        let query = format!(
            "UPDATE flyers \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flyer>(&query)
            .bind(flyer_id)
            .bind(FlyerStatus::Processing.id())
            .bind(FlyerStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Accept an edit: append the instruction as a `user` turn and
    /// re-enter `pending`, atomically re-checking every precondition.
    ///
    /// The guard (terminal status, image present, quota not exhausted)
    /// lives inside the UPDATE so two near-simultaneous submissions
    /// cannot both pass; the loser gets `None` and is rejected with no
    /// state change. A `pending` row is excluded too: it already has a
    /// queued run, and accepting a second instruction there would leave
    /// one user turn with no outcome once the runs race for the claim.
    pub async fn queue_edit(
        pool: &PgPool,
        flyer_id: DbId,
        user_id: DbId,
        instruction_turn: &ConversationTurn,
    ) -> Result<Option<Flyer>, sqlx::Error> {
        let query = format!(
            "UPDATE flyers \
             SET status_id = $4, \
                 conversation_history = conversation_history || $3, \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
               AND status_id IN ($5, $6) \
               AND image IS NOT NULL \
               AND edit_count < $7 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Flyer>(&query)
            .bind(flyer_id)
            .bind(user_id)
            .bind(Json(instruction_turn))
            .bind(FlyerStatus::Pending.id())
            .bind(FlyerStatus::Completed.id())
            .bind(FlyerStatus::Failed.id())
            .bind(MAX_EDITS)
            .fetch_optional(pool)
            .await
    }

    /// Finish an initial generation run: set the image, replace the
    /// history, and transition `processing → completed` atomically.
    ///
    /// Returns `false` when the row was not in `processing`.
    pub async fn complete_generation(
        pool: &PgPool,
        flyer_id: DbId,
        image: &[u8],
        history: &[ConversationTurn],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE flyers \
             SET status_id = $2, image = $3, conversation_history = $4, \
                 error_message = NULL, updated_at = NOW() \
             WHERE id = $1 AND status_id = $5",
        )
        .bind(flyer_id)
        .bind(FlyerStatus::Completed.id())
        .bind(image)
        .bind(Json(history))
        .bind(FlyerStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Finish an edit run: set the (possibly retained) image, replace the
    /// history, bump `edit_count` by `increment`, and transition
    /// `processing → completed` atomically.
    ///
    /// `increment` is 1 for a successful provider edit and 0 when the
    /// previous image was retained: a provider failure must not cost the
    /// user an edit.
    pub async fn finish_edit(
        pool: &PgPool,
        flyer_id: DbId,
        image: &[u8],
        increment: i32,
        history: &[ConversationTurn],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE flyers \
             SET status_id = $2, image = $3, edit_count = edit_count + $4, \
                 conversation_history = $5, error_message = NULL, updated_at = NOW() \
             WHERE id = $1 AND status_id = $6",
        )
        .bind(flyer_id)
        .bind(FlyerStatus::Completed.id())
        .bind(image)
        .bind(increment)
        .bind(Json(history))
        .bind(FlyerStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Mark a flyer `failed` with a (pre-truncated) error message.
    ///
    /// `edit_count` and the stored image are left untouched.
    pub async fn mark_failed(
        pool: &PgPool,
        flyer_id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE flyers \
             SET status_id = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(flyer_id)
        .bind(FlyerStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
