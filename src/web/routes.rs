use super::feedback::feedback_api_handler;
use super::handlers::{
    admin_handler, feedback_page_handler, healthz_handler, index_handler, logged_in_issue_handler,
    server_side_issue_handler,
};
use super::session::{logout_handler, save_session_handler};
use crate::AppState;
use axum::{
    routing::{any, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz_handler))
        .route("/admin", get(admin_handler))
        .route("/feedback", get(feedback_page_handler))
        .route(
            "/server-side-auth-data-fetch/{issue_number}",
            get(server_side_issue_handler),
        )
        .route(
            "/logged-in-user-data-fetch/{issue_number}",
            get(logged_in_issue_handler),
        )
        // Method dispatch (including the 501) lives in the handler
        .route("/api/feedback", any(feedback_api_handler))
        .route("/auth/session", post(save_session_handler))
        .route("/auth/logout", get(logout_handler).post(logout_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
