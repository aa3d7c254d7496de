use axum::{routing::get, Router};
use std::sync::Arc;

use crate::analytics::ClickRecorder;
use crate::config::{AnalyticsConfig, RedirectMode};
use crate::shortener::LinkRegistry;

use super::handlers::{health_check, redirect_url, RedirectState};

pub fn create_redirect_router(
    registry: Arc<LinkRegistry>,
    recorder: Arc<ClickRecorder>,
    analytics_config: AnalyticsConfig,
    redirect_status: RedirectMode,
) -> Router {
    let state = Arc::new(RedirectState {
        registry,
        recorder,
        analytics_config,
        redirect_status,
    });

    Router::new()
        .route("/", get(health_check))
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
