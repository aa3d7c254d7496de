use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analytics::AnalyticsAggregator;
use crate::shortener::LinkRegistry;

use super::analytics::{get_analytics, get_click_stats};
use super::handlers::{
    create_short_link, deactivate_short_link, get_short_link, health_check, service_info, AppState,
};

pub fn create_api_router(
    registry: Arc<LinkRegistry>,
    aggregator: Arc<AnalyticsAggregator>,
    base_url: String,
) -> Router {
    let state = Arc::new(AppState {
        registry,
        aggregator,
        base_url,
    });

    let api_routes = Router::new()
        .route("/shorten", post(create_short_link))
        .route("/urls/{code}", get(get_short_link).delete(deactivate_short_link))
        .route("/analytics/{code}", get(get_analytics))
        .route("/analytics/{code}/stats", get(get_click_stats))
        .route("/health", get(health_check))
        .with_state(state);

    Router::new()
        .route("/", get(service_info))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
