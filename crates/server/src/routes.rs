//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Stamp every response with the pinned Ghost version so clients can feature
/// gate.
async fn ghost_version_middleware(request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        "x-ghost-version",
        HeaderValue::from_static(lantern_core::GHOST_VERSION),
    );
    response
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The body limit sits above the configured upload ceiling so oversize
    // uploads reach the handler and get the readable 413, instead of being
    // cut off mid-extraction.
    let body_limit = (state.config.server.max_upload_bytes as usize).saturating_mul(2) + 64 * 1024;

    Router::new()
        // Ghost Admin API surface
        .route("/site/", get(handlers::get_site))
        .route("/config/", get(handlers::get_config))
        .route("/users/me/", get(handlers::get_current_user))
        .route("/users/me/token/", get(handlers::validate_token))
        .route("/images/upload/", post(handlers::upload_image))
        .route("/images/upload-chunk/", post(handlers::upload_image_chunk))
        .route("/posts/", post(handlers::create_post))
        .route("/posts/{post_id}/", put(handlers::update_post))
        // Operator surface
        .route("/keys/", post(handlers::issue_key))
        .route("/keys/{key_id}/", delete(handlers::revoke_key))
        // Health check (unauthenticated, for probes)
        .route("/health/", get(handlers::health_check))
        .layer(CorsLayer::permissive())
        // Outside the CORS layer so preflight responses get stamped too.
        .layer(middleware::from_fn(ghost_version_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
