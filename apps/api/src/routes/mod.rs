pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::hooks::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document hooks (invoked by the host platform)
        .route(
            "/api/v1/hooks/onboarding-created",
            post(handlers::handle_onboarding_created),
        )
        .route(
            "/api/v1/hooks/onboarding-saved",
            post(handlers::handle_onboarding_saved),
        )
        // Daily timer target
        .route("/api/v1/forecast/daily", post(handlers::handle_daily_forecast))
        // Direct automation endpoints
        .route("/api/v1/assets/check", post(handlers::handle_asset_check))
        .route(
            "/api/v1/checklist/generate",
            post(handlers::handle_generate_checklist),
        )
        .route("/api/v1/risk/classify", post(handlers::handle_classify_risk))
        .with_state(state)
}
