use crate::types::DbId;

/// Domain-level error taxonomy shared across crates.
///
/// Upstream provider failures are deliberately absent: the orchestrators
/// absorb them via the placeholder / retained-image fallback paths and
/// they never surface to callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
