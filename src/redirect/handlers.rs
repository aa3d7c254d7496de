use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, header::HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::{extract_client_ip, ClickRecorder, PendingClick};
use crate::config::{AnalyticsConfig, RedirectMode};
use crate::error::ServiceError;
use crate::shortener::LinkRegistry;

pub struct RedirectState {
    pub registry: Arc<LinkRegistry>,
    pub recorder: Arc<ClickRecorder>,
    pub analytics_config: AnalyticsConfig,
    pub redirect_status: RedirectMode,
}

/// Redirect to original URL
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    match state.registry.resolve(&code).await {
        Ok(original_url) => {
            // Queued only; the response never waits on click storage
            state.recorder.dispatch(pending_click(
                &code,
                &headers,
                addr,
                &state.analytics_config,
            ));

            let status = StatusCode::from_u16(state.redirect_status.status_code())
                .unwrap_or(StatusCode::MOVED_PERMANENTLY);
            (status, [(header::LOCATION, original_url)]).into_response()
        }
        Err(ServiceError::NotFound) => (StatusCode::NOT_FOUND, "Short URL not found").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
    }
}

fn pending_click(
    short_code: &str,
    headers: &HeaderMap,
    addr: SocketAddr,
    config: &AnalyticsConfig,
) -> PendingClick {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    PendingClick {
        short_code: short_code.to_string(),
        ip_address: extract_client_ip(headers, addr.ip(), config).to_string(),
        user_agent: header_str(header::USER_AGENT).unwrap_or_default(),
        referer: header_str(header::REFERER),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
