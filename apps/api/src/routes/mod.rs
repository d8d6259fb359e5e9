pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/messages",
            post(handlers::handle_send_message),
        )
        .route(
            "/api/v1/sessions/:id/reset",
            post(handlers::handle_reset_session),
        )
        .route(
            "/api/v1/sessions/:id/export",
            get(handlers::handle_export_session),
        )
        // Saved interviews
        .route("/api/v1/candidates", get(handlers::handle_list_candidates))
        .with_state(state)
}
