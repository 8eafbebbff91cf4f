//! Flyer entity models and DTOs for the artifact-generation pipeline.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use postul_core::conversation::ConversationTurn;
use postul_core::types::{DbId, Timestamp};

use super::status::{FlyerStatus, StatusId};

/// A row from the `flyers` table: the unit of work this pipeline manages.
#[derive(Debug, Clone, FromRow)]
pub struct Flyer {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub idea_id: DbId,
    /// Raw PNG bytes; present once any generation or edit has succeeded.
    pub image: Option<Vec<u8>>,
    pub edit_count: i32,
    pub conversation_history: Json<Vec<ConversationTurn>>,
    pub status_id: StatusId,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Flyer {
    /// Typed view of `status_id`.
    ///
    /// The FK to `flyer_statuses` guarantees a known id; an unknown one
    /// is reported as `Failed` rather than panicking.
    pub fn status(&self) -> FlyerStatus {
        FlyerStatus::from_id(self.status_id).unwrap_or(FlyerStatus::Failed)
    }

    /// Image as base64 for JSON transport.
    pub fn image_base64(&self) -> Option<String> {
        self.image.as_deref().map(|bytes| BASE64.encode(bytes))
    }
}

/// DTO for `POST /flyers/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateFlyerRequest {
    pub project_id: DbId,
    pub idea_id: DbId,
}

/// Response for `POST /flyers/generate`.
#[derive(Debug, Serialize)]
pub struct GenerateFlyerResponse {
    pub flyer_id: DbId,
    pub status: &'static str,
    pub edit_count: i32,
    pub image: Option<String>,
}

impl From<&Flyer> for GenerateFlyerResponse {
    fn from(flyer: &Flyer) -> Self {
        Self {
            flyer_id: flyer.id,
            status: flyer.status().as_str(),
            edit_count: flyer.edit_count,
            image: flyer.image_base64(),
        }
    }
}

/// DTO for `POST /flyers/{id}/edit`.
#[derive(Debug, Deserialize)]
pub struct EditFlyerRequest {
    pub edit_instruction: String,
}

/// Response for `POST /flyers/{id}/edit`.
///
/// `image` is always `None` here: the edited image only becomes visible
/// through polling once the background run completes.
#[derive(Debug, Serialize)]
pub struct EditFlyerResponse {
    pub status: &'static str,
    pub edit_count: i32,
    pub conversation_history: Vec<ConversationTurn>,
    pub image: Option<String>,
}

/// Full flyer record for the read-only poll endpoints.
#[derive(Debug, Serialize)]
pub struct FlyerResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub idea_id: DbId,
    pub image: Option<String>,
    pub edit_count: i32,
    pub conversation_history: Vec<ConversationTurn>,
    pub status: &'static str,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Flyer> for FlyerResponse {
    fn from(flyer: Flyer) -> Self {
        Self {
            image: flyer.image_base64(),
            status: flyer.status().as_str(),
            id: flyer.id,
            user_id: flyer.user_id,
            project_id: flyer.project_id,
            idea_id: flyer.idea_id,
            edit_count: flyer.edit_count,
            conversation_history: flyer.conversation_history.0,
            error_message: flyer.error_message,
            created_at: flyer.created_at,
            updated_at: flyer.updated_at,
        }
    }
}
