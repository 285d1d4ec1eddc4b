use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use precis_core::AppError;

use crate::dto::{HealthResponse, SubmitUrlRequest, SubmitUrlResponse, SummaryResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the Website Summarizer API";

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the router with all routes, without middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/submit-url", post(submit_url))
        .route("/api/get-summary/{id}", get(get_summary));

    let public = Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

/// Build the full application: routes plus tracing, CORS and a body limit.
pub fn app(state: Arc<AppState>) -> Router {
    router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(MapResponseBodyLayer::new(axum::body::Body::new))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
    )
}

// ---------------------------------------------------------------------------
// Welcome
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = String, content_type = "text/plain"),
    ),
    tag = "system"
)]
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/submit-url",
    request_body = SubmitUrlRequest,
    responses(
        (status = 201, description = "URL stored and summarized", body = SubmitUrlResponse),
        (status = 400, description = "Missing or empty URL", body = crate::dto::ErrorResponse),
        (status = 500, description = "Storage, fetch, or summarization failed, or the request timed out", body = crate::dto::ErrorResponse),
    ),
    tag = "summaries"
)]
pub async fn submit_url(
    State(state): State<Arc<AppState>>,
    payload: Result<axum::Json<SubmitUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let axum::Json(body) = payload?;
    let url = body.url.unwrap_or_default();

    let submission = state.within_deadline(state.pipeline.submit(&url)).await?;

    let response = SubmitUrlResponse {
        message: "URL submitted and summarized successfully".to_string(),
        data: submission.record.into(),
        summary: submission.summary,
    };

    Ok((StatusCode::CREATED, axum::Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/get-summary/{id}",
    params(
        ("id" = Uuid, Path, description = "Record ID returned by submit-url")
    ),
    responses(
        (status = 200, description = "Freshly generated summary", body = SummaryResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 500, description = "Fetch or summarization failed, or the request timed out", body = crate::dto::ErrorResponse),
    ),
    tag = "summaries"
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // A malformed id can never match a record.
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound(format!("URL record {id}")))?;

    let summary = state.within_deadline(state.pipeline.resummarize(id)).await?;

    let response = SummaryResponse {
        message: "Summary generated successfully".to_string(),
        summary,
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.pipeline.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            "error"
        }
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
