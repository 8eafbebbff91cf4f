//! Repository for the `projects` table (read-only).

use sqlx::PgPool;

use postul_core::types::DbId;

use crate::models::project::Project;

/// Column list for `projects` queries.
const COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

/// Read-only access to upstream project rows.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Fetch a project by id, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
