pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers as layout_handlers;
use crate::preferences::handlers as preference_handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Card registry
        .route(
            "/api/v1/cards/dimensions",
            get(layout_handlers::handle_card_dimensions),
        )
        // Preferences (persistence gateway)
        .route(
            "/api/v1/preferences",
            get(preference_handlers::handle_get_preferences)
                .post(preference_handlers::handle_save_preferences),
        )
        // Dashboard layout
        .route(
            "/api/v1/dashboard/layout",
            get(layout_handlers::handle_get_dashboard),
        )
        .route(
            "/api/v1/dashboard/layout/drag-end",
            post(layout_handlers::handle_drag_end),
        )
        .fallback(not_found)
        .with_state(state)
}
