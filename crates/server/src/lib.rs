//! HTTP API for the Jobs assistant.
//!
//! Exposes `POST /ask` for the chat front end and `GET /health` for probes.
//! Built on Axum; collaborators are created once in [`start`] and shared by
//! every request.

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use jobs_core::{AppConfig, AppError, AppResult};
use jobs_knowledge::{Answer, RagPipeline};
use jobs_prompt::{ChatTurn, UserProfile};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub pipeline: RagPipeline,
}

pub type SharedState = Arc<AppState>;

/// Body of `POST /ask`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AskRequest {
    pub message: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<ChatTurn>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user_profile: UserProfile,
}

/// Body returned by `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub source: Option<String>,
}

impl From<Answer> for AskResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.answer,
            source: answer.source,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build the CORS layer for the configured origins.
///
/// `*` anywhere in the list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> AppResult<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| AppError::Config(format!("Invalid CORS origin '{}': {}", origin, e)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

/// Build the Axum router with all routes.
pub fn build_router(state: SharedState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/ask", post(ask_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Build all collaborators from `config` and serve until Ctrl-C.
pub async fn start(config: AppConfig) -> AppResult<()> {
    let pipeline = jobs_knowledge::pipeline_from_config(&config)?;
    let cors = cors_layer(&config.server.allowed_origins)?;
    let state = Arc::new(AppState { pipeline });
    let app = build_router(state, cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(addr = %addr, "Jobs server starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Jobs server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn ask_handler(
    State(state): State<SharedState>,
    Json(request): Json<AskRequest>,
) -> Json<AskResponse> {
    let answer = state
        .pipeline
        .ask(&request.message, &request.history, &request.user_profile)
        .await;

    Json(answer.into())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
