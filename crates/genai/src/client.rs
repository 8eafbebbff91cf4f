//! HTTP client for a Gemini-style `generateContent` API.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use postul_core::conversation::{ConversationTurn, Role};

use crate::outcome::{decode_outcome, GenerationOutcome};
use crate::{GenAiError, ImageGenerator};

/// Connection settings for the generative image provider.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// Base API URL, e.g. `https://generativelanguage.googleapis.com`.
    pub api_url: String,
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// Model name, e.g. `gemini-2.5-flash-image`.
    pub model: String,
    /// Client-side request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// reqwest-backed [`ImageGenerator`] implementation.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GenAiConfig,
}

impl GeminiClient {
    /// Build a client with its own connection pool and timeout.
    pub fn new(config: GenAiConfig) -> Result<Self, GenAiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            self.config.model,
        )
    }

    /// POST a `contents` payload and decode the outcome.
    async fn generate_content(
        &self,
        contents: serde_json::Value,
    ) -> Result<GenerationOutcome, GenAiError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&serde_json::json!({ "contents": contents }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenAiError::Decode(format!("response was not JSON: {e}")))?;
        decode_outcome(&body)
    }
}

/// Map a history turn onto the provider's role vocabulary.
fn provider_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationOutcome, GenAiError> {
        tracing::debug!(model = %self.config.model, "Requesting flyer generation");
        self.generate_content(serde_json::json!([
            { "role": "user", "parts": [{ "text": prompt }] }
        ]))
        .await
    }

    async fn edit(
        &self,
        image_png: &[u8],
        prompt: &str,
        history: &[ConversationTurn],
    ) -> Result<GenerationOutcome, GenAiError> {
        tracing::debug!(
            model = %self.config.model,
            history_turns = history.len(),
            "Requesting flyer edit"
        );

        // Prior turns give the model the edit conversation so far; the
        // final user turn carries the current image plus the instruction.
        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": provider_role(turn.role),
                    "parts": [{ "text": turn.content }]
                })
            })
            .collect();

        contents.push(serde_json::json!({
            "role": "user",
            "parts": [
                {
                    "inlineData": {
                        "mimeType": "image/png",
                        "data": BASE64.encode(image_png),
                    }
                },
                { "text": prompt }
            ]
        }));

        self.generate_content(serde_json::Value::Array(contents))
            .await
    }
}
