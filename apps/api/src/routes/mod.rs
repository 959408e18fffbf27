pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::layout::handlers as layout_handlers;
use crate::settings::handlers as settings_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/fonts", get(layout_handlers::handle_list_fonts))
        .route("/api/v1/layout", post(layout_handlers::handle_layout))
        .route("/api/v1/grid", post(layout_handlers::handle_grid))
        // Settings API
        .route("/api/v1/settings", get(settings_handlers::handle_list_presets))
        .route(
            "/api/v1/settings/default",
            get(settings_handlers::handle_get_default),
        )
        .route(
            "/api/v1/settings/suggest",
            post(settings_handlers::handle_suggest),
        )
        .route(
            "/api/v1/settings/:name",
            get(settings_handlers::handle_get_preset).put(settings_handlers::handle_put_preset),
        )
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
