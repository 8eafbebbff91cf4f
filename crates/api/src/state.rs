use std::sync::Arc;

use postul_pipeline::{EditOrchestrator, GenerationOrchestrator};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: postul_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Background orchestrator for initial flyer generation.
    pub generation: Arc<GenerationOrchestrator>,
    /// Background orchestrator for flyer edits.
    pub editing: Arc<EditOrchestrator>,
}
