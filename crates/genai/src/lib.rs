//! Generation Client Adapter.
//!
//! Wraps a Gemini-style `generateContent` HTTP API behind the
//! [`ImageGenerator`] trait and decodes whatever shape the provider
//! returns ONCE, at this boundary, into a typed [`GenerationOutcome`].
//! Orchestrators never inspect raw provider responses.

mod client;
mod outcome;

pub use client::{GeminiClient, GenAiConfig};
pub use outcome::{decode_outcome, GenerationOutcome};

use async_trait::async_trait;

use postul_core::conversation::ConversationTurn;

/// Errors from the generation adapter.
///
/// All of these are tolerated by the orchestrators: they trigger the
/// placeholder / retained-image fallback paths and are never surfaced to
/// API callers.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Seam between the orchestrators and the generative image provider.
///
/// Both operations return [`GenerationOutcome::Empty`] when the provider
/// answered without an image payload; transport and API failures come
/// back as [`GenAiError`].
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image from a text prompt.
    async fn generate(&self, prompt: &str) -> Result<GenerationOutcome, GenAiError>;

    /// Edit an existing image according to an instruction, with the
    /// accumulated conversation history as context.
    async fn edit(
        &self,
        image_png: &[u8],
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<GenerationOutcome, GenAiError>;
}
