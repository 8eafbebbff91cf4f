//! Repository for the `ideas` table (read-only).

use sqlx::PgPool;

use postul_core::types::DbId;

use crate::models::idea::Idea;

/// Column list for `ideas` queries.
const COLUMNS: &str = "id, user_id, project_id, transcribed_text, analysis, created_at, updated_at";

/// Read-only access to upstream idea rows.
pub struct IdeaRepo;

impl IdeaRepo {
    /// Fetch an idea by id, scoped to its owner and project.
    pub async fn find_for_project(
        pool: &PgPool,
        idea_id: DbId,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ideas WHERE id = $1 AND project_id = $2 AND user_id = $3"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(idea_id)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
