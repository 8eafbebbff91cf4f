//! Integration tests for the flyer repository state machine.
//!
//! Every status transition is a guarded UPDATE; these tests pin down the
//! guard semantics that the orchestrators rely on.

use sqlx::PgPool;

use postul_core::conversation::{ConversationTurn, Role};
use postul_core::types::DbId;
use postul_db::models::flyer::Flyer;
use postul_db::models::status::FlyerStatus;
use postul_db::repositories::FlyerRepo;

const USER: DbId = 0;

/// Insert a project + idea pair and return their ids.
async fn seed_brief(pool: &PgPool) -> (DbId, DbId) {
    let (project_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO projects (user_id, name, description) \
         VALUES ($1, 'Lunchbox', 'Meal planning') RETURNING id",
    )
    .bind(USER)
    .fetch_one(pool)
    .await
    .unwrap();

    let (idea_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO ideas (user_id, project_id, transcribed_text, analysis) \
         VALUES ($1, $2, 'dinner is chaos', '{\"problem_statement\": \"dinner is chaos\"}') \
         RETURNING id",
    )
    .bind(USER)
    .bind(project_id)
    .fetch_one(pool)
    .await
    .unwrap();

    (project_id, idea_id)
}

async fn seed_flyer(pool: &PgPool) -> Flyer {
    let (project_id, idea_id) = seed_brief(pool).await;
    FlyerRepo::create(pool, USER, project_id, idea_id)
        .await
        .unwrap()
}

/// Drive a flyer to `completed` with an image, ready for editing.
async fn seed_completed_flyer(pool: &PgPool) -> Flyer {
    let flyer = seed_flyer(pool).await;
    FlyerRepo::begin_processing(pool, flyer.id).await.unwrap();
    let history = vec![
        ConversationTurn::user("prompt"),
        ConversationTurn::assistant("generated"),
    ];
    assert!(
        FlyerRepo::complete_generation(pool, flyer.id, b"png-bytes", &history)
            .await
            .unwrap()
    );
    FlyerRepo::find_by_id(pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap()
}

#[sqlx::test]
async fn create_starts_pending_with_empty_history(pool: PgPool) {
    let flyer = seed_flyer(&pool).await;

    assert_eq!(flyer.status(), FlyerStatus::Pending);
    assert_eq!(flyer.edit_count, 0);
    assert!(flyer.image.is_none());
    assert!(flyer.conversation_history.0.is_empty());
    assert!(flyer.error_message.is_none());
}

#[sqlx::test]
async fn find_by_project_returns_the_owned_row(pool: PgPool) {
    let flyer = seed_flyer(&pool).await;

    let found = FlyerRepo::find_by_project(&pool, flyer.project_id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, flyer.id);

    // A different caller sees nothing.
    let foreign = FlyerRepo::find_by_project(&pool, flyer.project_id, 99)
        .await
        .unwrap();
    assert!(foreign.is_none());
}

#[sqlx::test]
async fn begin_processing_is_a_one_shot_transition(pool: PgPool) {
    let flyer = seed_flyer(&pool).await;

    let first = FlyerRepo::begin_processing(&pool, flyer.id).await.unwrap();
    assert_eq!(first.unwrap().status(), FlyerStatus::Processing);

    // The row is no longer pending, so a second claim loses.
    let second = FlyerRepo::begin_processing(&pool, flyer.id).await.unwrap();
    assert!(second.is_none());
}

#[sqlx::test]
async fn complete_generation_requires_processing(pool: PgPool) {
    let flyer = seed_flyer(&pool).await;
    let history = vec![ConversationTurn::user("prompt")];

    // Still pending: the completion CAS must refuse.
    let done = FlyerRepo::complete_generation(&pool, flyer.id, b"png", &history)
        .await
        .unwrap();
    assert!(!done);

    FlyerRepo::begin_processing(&pool, flyer.id).await.unwrap();
    let done = FlyerRepo::complete_generation(&pool, flyer.id, b"png", &history)
        .await
        .unwrap();
    assert!(done);

    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), FlyerStatus::Completed);
    assert_eq!(row.image.as_deref(), Some(b"png".as_slice()));
}

#[sqlx::test]
async fn queue_edit_appends_turn_and_reenters_pending(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;

    let turn = ConversationTurn::user("make the background blue");
    let queued = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(queued.status(), FlyerStatus::Pending);
    assert_eq!(queued.edit_count, 0);
    let history = &queued.conversation_history.0;
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].role, Role::User);
    assert_eq!(history[2].content, "make the background blue");
}

#[sqlx::test]
async fn queue_edit_refuses_while_processing(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;
    let turn = ConversationTurn::user("first edit");
    FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap()
        .unwrap();
    FlyerRepo::begin_processing(&pool, flyer.id).await.unwrap();

    let rejected = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap();
    assert!(rejected.is_none());

    // The losing submission left no trace.
    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), FlyerStatus::Processing);
    assert_eq!(row.conversation_history.0.len(), 3);
}

#[sqlx::test]
async fn queue_edit_refuses_while_already_queued(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;
    let first = ConversationTurn::user("first edit");
    FlyerRepo::queue_edit(&pool, flyer.id, USER, &first)
        .await
        .unwrap()
        .unwrap();

    // The row is pending with a queued run; a second submission must
    // lose, otherwise its user turn would never get an outcome.
    let second = ConversationTurn::user("second edit");
    let rejected = FlyerRepo::queue_edit(&pool, flyer.id, USER, &second)
        .await
        .unwrap();
    assert!(rejected.is_none());

    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), FlyerStatus::Pending);
    assert_eq!(row.conversation_history.0.len(), 3);
    assert_eq!(row.conversation_history.0[2].content, "first edit");
}

#[sqlx::test]
async fn queue_edit_refuses_without_an_image(pool: PgPool) {
    let flyer = seed_flyer(&pool).await;

    let turn = ConversationTurn::user("edit me");
    let rejected = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap();
    assert!(rejected.is_none());
}

#[sqlx::test]
async fn queue_edit_refuses_when_quota_exhausted(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;
    sqlx::query("UPDATE flyers SET edit_count = 5 WHERE id = $1")
        .bind(flyer.id)
        .execute(&pool)
        .await
        .unwrap();

    let turn = ConversationTurn::user("one too many");
    let rejected = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap();
    assert!(rejected.is_none());
}

#[sqlx::test]
async fn finish_edit_increments_only_on_success(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;
    let turn = ConversationTurn::user("edit");
    let queued = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap()
        .unwrap();
    FlyerRepo::begin_processing(&pool, queued.id).await.unwrap();

    let mut history = queued.conversation_history.0.clone();
    history.push(ConversationTurn::assistant("edited"));

    // Successful edit consumes one unit of quota.
    assert!(
        FlyerRepo::finish_edit(&pool, flyer.id, b"new-png", 1, &history)
            .await
            .unwrap()
    );
    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.edit_count, 1);
    assert_eq!(row.status(), FlyerStatus::Completed);
    assert_eq!(row.image.as_deref(), Some(b"new-png".as_slice()));

    // A retained-image finish (provider failure) costs nothing.
    let requeued = FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap()
        .unwrap();
    FlyerRepo::begin_processing(&pool, requeued.id)
        .await
        .unwrap();
    assert!(
        FlyerRepo::finish_edit(&pool, flyer.id, b"new-png", 0, &history)
            .await
            .unwrap()
    );
    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.edit_count, 1);
}

#[sqlx::test]
async fn mark_failed_preserves_image_and_quota(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;
    let turn = ConversationTurn::user("edit");
    FlyerRepo::queue_edit(&pool, flyer.id, USER, &turn)
        .await
        .unwrap()
        .unwrap();
    FlyerRepo::begin_processing(&pool, flyer.id).await.unwrap();

    FlyerRepo::mark_failed(&pool, flyer.id, "provider exploded")
        .await
        .unwrap();

    let row = FlyerRepo::find_by_id(&pool, flyer.id, USER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status(), FlyerStatus::Failed);
    assert_eq!(row.error_message.as_deref(), Some("provider exploded"));
    assert_eq!(row.edit_count, 0);
    assert!(row.image.is_some());
}

#[sqlx::test]
async fn edit_count_is_bounded_by_a_check_constraint(pool: PgPool) {
    let flyer = seed_completed_flyer(&pool).await;

    let result = sqlx::query("UPDATE flyers SET edit_count = 6 WHERE id = $1")
        .bind(flyer.id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
