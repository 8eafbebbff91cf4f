//! Idea entity (read-only upstream collaborator).

use serde::Serialize;
use sqlx::FromRow;

use postul_core::types::{DbId, Timestamp};

/// How much of the raw transcription is used when the analysis carries no
/// problem statement.
const TRANSCRIPT_FALLBACK_CHARS: usize = 200;

/// A row from the `ideas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Idea {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub transcribed_text: String,
    /// Analysis output from the idea-evaluation feature, if any.
    pub analysis: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Idea {
    /// The problem statement used in the flyer brief.
    ///
    /// Prefers `analysis.problem_statement`; falls back to a prefix of
    /// the raw transcription when the analysis has none.
    pub fn problem_statement(&self) -> String {
        if let Some(statement) = self
            .analysis
            .as_ref()
            .and_then(|a| a.get("problem_statement"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
        {
            return statement.to_string();
        }
        self.transcribed_text
            .chars()
            .take(TRANSCRIPT_FALLBACK_CHARS)
            .collect()
    }
}
