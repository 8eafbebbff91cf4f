#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use postul_api::config::ServerConfig;
use postul_api::routes;
use postul_api::state::AppState;
use postul_core::conversation::ConversationTurn;
use postul_core::flyer::FlyerBrief;
use postul_core::types::DbId;
use postul_genai::{GenAiError, GenerationOutcome, ImageGenerator};
use postul_pipeline::{build_orchestrators, encode_png, PipelineConfig, PlaceholderRenderer};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        genai_api_url: "http://localhost:9".to_string(),
        genai_api_key: "test-key".to_string(),
        genai_model: "test-model".to_string(),
        generation_timeout_secs: 30,
        public_base_url: "https://postul.app".to_string(),
        placeholder_font_path: None,
    }
}

/// Scripted [`ImageGenerator`] for integration tests.
///
/// `Succeed` echoes the input image back on edits, so edited output stays
/// a decodable PNG without any provider involved.
pub enum StubGenerator {
    Succeed,
    Empty,
    Fail,
    Hang,
}

#[async_trait]
impl ImageGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GenerationOutcome, GenAiError> {
        match self {
            Self::Succeed => Ok(GenerationOutcome::Image(sample_png())),
            Self::Empty => Ok(GenerationOutcome::Empty),
            Self::Fail => Err(GenAiError::Api {
                status: 503,
                body: "overloaded".into(),
            }),
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerationOutcome::Empty)
            }
        }
    }

    async fn edit(
        &self,
        image_png: &[u8],
        _prompt: &str,
        _history: &[ConversationTurn],
    ) -> Result<GenerationOutcome, GenAiError> {
        match self {
            Self::Succeed => Ok(GenerationOutcome::Image(image_png.to_vec())),
            Self::Empty => Ok(GenerationOutcome::Empty),
            Self::Fail => Err(GenAiError::Api {
                status: 503,
                body: "overloaded".into(),
            }),
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerationOutcome::Empty)
            }
        }
    }
}

/// A full-size PNG the stub hands back as "provider output".
pub fn sample_png() -> Vec<u8> {
    let canvas = PlaceholderRenderer::new(None).render(&FlyerBrief {
        project_name: "Stub".into(),
        project_description: "Stub".into(),
        problem_statement: "Stub".into(),
    });
    encode_png(&canvas).expect("encoding a rendered canvas cannot fail")
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a scripted generator.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool, stub: StubGenerator) -> Router {
    let config = test_config();

    let (generation, editing) = build_orchestrators(
        pool.clone(),
        Arc::new(stub),
        PipelineConfig {
            generation_timeout: Duration::from_secs(30),
            public_base_url: config.public_base_url.clone(),
            placeholder_font_path: None,
        },
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        generation,
        editing,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn get_as_user(app: Router, uri: &str, user_id: DbId) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Insert a project for the anonymous user and return its id.
pub async fn seed_project(pool: &PgPool) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO projects (user_id, name, description) \
         VALUES (0, 'Lunchbox', 'Weeknight meal planning') \
         RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("seeding a project must succeed")
}

/// Insert an idea with an analysed problem statement and return its id.
pub async fn seed_idea(pool: &PgPool, project_id: DbId) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO ideas (user_id, project_id, transcribed_text, analysis) \
         VALUES (0, $1, 'raw pitch transcript', \
                 '{\"problem_statement\": \"dinner planning is chaos\"}'::jsonb) \
         RETURNING id",
    )
    .bind(project_id)
    .fetch_one(pool)
    .await
    .expect("seeding an idea must succeed")
}

/// Poll a flyer until it reaches `completed` or `failed`, returning the
/// final response body.
pub async fn wait_for_terminal(app: &Router, flyer_id: DbId) -> serde_json::Value {
    for _ in 0..200 {
        let response = get(app.clone(), &format!("/api/v1/flyers/{flyer_id}")).await;
        let json = body_json(response).await;
        match json["data"]["status"].as_str() {
            Some("completed") | Some("failed") => return json,
            _ => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
    panic!("flyer {flyer_id} never reached a terminal status");
}
