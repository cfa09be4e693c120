use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::{request_tracing, server_config::cfg, ServerState};

use super::classify;

pub struct AppRouter;

impl AppRouter {
    pub fn create(state: ServerState) -> Router {
        // The browser frontend is served from a different origin.
        Router::new()
            .route("/", get(|| async { "Mailtriage server" }))
            .route(
                "/classify",
                post(classify::classify)
                    .layer(DefaultBodyLimit::max(cfg.settings.max_upload_bytes)),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(request_tracing::trace_with_request_id_layer())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
            .with_state(state)
            .fallback(handler_404)
    }
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Route does not exist")
}
