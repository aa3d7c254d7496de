use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::AnalyticsAggregator;
use crate::error::ServiceError;
use crate::models::{CreateLinkRequest, ShortLink};
use crate::shortener::LinkRegistry;

pub struct AppState {
    pub registry: Arc<LinkRegistry>,
    pub aggregator: Arc<AnalyticsAggregator>,
    /// Prefix joined with the short code to build `short_url`
    pub base_url: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    pub short_url: String,
    pub original_url: String,
    pub short_code: String,
    pub is_custom: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Map the core error taxonomy onto HTTP statuses. Storage details were
/// already logged and are not echoed back.
pub fn error_response(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Exhausted(_) | ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

fn to_response(link: ShortLink, base_url: &str) -> ShortLinkResponse {
    ShortLinkResponse {
        short_url: format!("{}/{}", base_url.trim_end_matches('/'), link.short_code),
        created_at: DateTime::from_timestamp(link.created_at, 0).unwrap_or_default(),
        original_url: link.original_url,
        short_code: link.short_code,
        is_custom: link.is_custom,
        is_active: link.is_active,
    }
}

fn is_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

/// Create a new short link
pub async fn create_short_link(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLinkRequest>,
) -> ApiResult<(StatusCode, Json<ShortLinkResponse>)> {
    if payload.url.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "URL cannot be empty"));
    }
    if !is_http_url(&payload.url) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "URL must start with http:// or https://",
        ));
    }

    // A blank custom code means "generate one"
    let custom_code = payload
        .custom_code
        .as_deref()
        .filter(|code| !code.trim().is_empty());

    let link = state
        .registry
        .create_short_link(&payload.url, custom_code)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(to_response(link, &state.base_url)),
    ))
}

/// Get a short link record, active or not
pub async fn get_short_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<ShortLinkResponse>> {
    let link = state.registry.get(&code).await.map_err(error_response)?;
    Ok(Json(to_response(link, &state.base_url)))
}

/// Deactivate a short link
pub async fn deactivate_short_link(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    match state.registry.deactivate(&code).await {
        Ok(true) => Ok(Json(SuccessResponse {
            message: "URL deactivated successfully".to_string(),
        })),
        Ok(false) => Err(error_response(ServiceError::NotFound)),
        Err(e) => Err(error_response(e)),
    }
}

#[derive(Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
