//! nvgl8r photo server.
//!
//! Accepts camera uploads behind HTTP Basic auth and keeps the newest few on
//! disk for the monitor page, or forwards them to another server in relay mode.
//! Static pages (capture/monitor and their scripts) are served from a
//! configurable directory.

pub mod auth;
pub mod config;
pub mod photos;
pub mod relay;
pub mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use auth::PasswordHash;
pub use config::{Config, RelayTarget};
pub use photos::PhotoStore;
pub use relay::Relay;
pub use routes::AppState;

/// 32 MB upload limit per photo
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// All routes, each behind Basic auth.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(routes::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/photos/{*rest}", get(routes::get_photo))
        .fallback(routes::fallback)
        .method_not_allowed_fallback(routes::fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
