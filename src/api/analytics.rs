//! Analytics API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::handlers::{error_response, ApiResult, AppState};
use crate::analytics::{ClickStats, LinkAnalytics};

/// Total and most recent clicks for a short code
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> ApiResult<Json<LinkAnalytics>> {
    state
        .aggregator
        .get_analytics(&short_code)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Daily click counts over the trailing 30 days
pub async fn get_click_stats(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> ApiResult<Json<ClickStats>> {
    state
        .aggregator
        .get_click_stats(&short_code)
        .await
        .map(Json)
        .map_err(error_response)
}
