use std::path::PathBuf;
use std::time::Duration;

use postul_core::flyer::{DEFAULT_PUBLIC_BASE_URL, GENERATION_TIMEOUT_SECS};
use postul_genai::GenAiConfig;
use postul_pipeline::PipelineConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the provider API key have defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the generative image API.
    pub genai_api_url: String,
    /// API key for the generative image API.
    pub genai_api_key: String,
    /// Model name used for generation and edits.
    pub genai_model: String,
    /// Ceiling on a single generation or edit run, in seconds.
    pub generation_timeout_secs: u64,
    /// Public URL prefix encoded into the flyer QR codes.
    pub public_base_url: String,
    /// Optional font file for placeholder flyer text.
    pub placeholder_font_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                      |
    /// |---------------------------|----------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                    |
    /// | `PORT`                    | `3000`                                       |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`                      |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                         |
    /// | `GENAI_API_URL`           | `https://generativelanguage.googleapis.com`  |
    /// | `GENAI_API_KEY`           | (required)                                   |
    /// | `GENAI_MODEL`             | `gemini-2.5-flash-image`                     |
    /// | `GENERATION_TIMEOUT_SECS` | `600`                                        |
    /// | `PUBLIC_BASE_URL`         | `https://postul.app`                         |
    /// | `PLACEHOLDER_FONT_PATH`   | (none; placeholder renders without text)     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let genai_api_url = std::env::var("GENAI_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into());

        let genai_api_key = std::env::var("GENAI_API_KEY").expect("GENAI_API_KEY must be set");

        let genai_model =
            std::env::var("GENAI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash-image".into());

        let generation_timeout_secs: u64 = std::env::var("GENERATION_TIMEOUT_SECS")
            .unwrap_or_else(|_| GENERATION_TIMEOUT_SECS.to_string())
            .parse()
            .expect("GENERATION_TIMEOUT_SECS must be a valid u64");

        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.into());

        let placeholder_font_path = std::env::var("PLACEHOLDER_FONT_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            genai_api_url,
            genai_api_key,
            genai_model,
            generation_timeout_secs,
            public_base_url,
            placeholder_font_path,
        }
    }

    /// Provider connection settings for the generation adapter.
    ///
    /// The client-side timeout matches the orchestrator ceiling so a hung
    /// request is abandoned at both layers.
    pub fn genai(&self) -> GenAiConfig {
        GenAiConfig {
            api_url: self.genai_api_url.clone(),
            api_key: self.genai_api_key.clone(),
            model: self.genai_model.clone(),
            request_timeout_secs: self.generation_timeout_secs,
        }
    }

    /// Settings for the background orchestrators.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            public_base_url: self.public_base_url.clone(),
            placeholder_font_path: self.placeholder_font_path.clone(),
        }
    }
}
