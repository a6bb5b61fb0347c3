use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use deckrec_core::config::Settings;
use deckrec_core::diagnostics::Diagnostics;
use deckrec_core::domain::deck::{AiRecommendation, AiRequest, BaselineRequest, Recommendation};
use deckrec_core::recommend::{RecommendError, Recommender};

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub settings: Arc<Settings>,
    pub env_path: Option<Arc<PathBuf>>,
    pub static_dir: Arc<PathBuf>,
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.static_dir.as_ref());

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/debug", get(debug))
        .route("/debug/clash", get(debug))
        .route("/recommend_deck", post(recommend_deck))
        .route("/recommend_deck_ai", post(recommend_deck_ai))
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<AppState>) -> Response {
    let path = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "index.html unavailable");
            json_error(StatusCode::NOT_FOUND, "index.html not found")
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn debug(State(state): State<AppState>) -> Json<Diagnostics> {
    Json(Diagnostics::collect(
        &state.settings,
        &state.recommender,
        state.env_path.as_deref().map(PathBuf::as_path),
    ))
}

async fn recommend_deck(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BaselineRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    Ok(Json(state.recommender.recommend(&req)?))
}

async fn recommend_deck_ai(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AiRequest>,
) -> Result<Json<AiRecommendation>, ApiError> {
    Ok(Json(state.recommender.recommend_ai(&req).await?))
}

fn json_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// JSON request body whose rejections are reported as `{"detail": ...}` like every other error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct ApiJson<T>(T);

pub enum ApiError {
    Recommend(RecommendError),
    Body(JsonRejection),
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        Self::Recommend(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Recommend(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Recommend(RecommendError::CatalogUnavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Recommend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Body(rejection) => {
                let detail = rejection.body_text();
                tracing::debug!(%status, error = %detail, "request body rejected");
                json_error(status, &detail)
            }
            ApiError::Recommend(err) => {
                let detail = err.to_string();
                if status.is_server_error() {
                    tracing::error!(%status, error = %detail, "recommendation failed");
                    sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
                }
                json_error(status, &detail)
            }
        }
    }
}
