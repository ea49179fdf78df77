//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Picture routes without the `/api/potd` prefix.
pub(crate) fn potd_routes() -> Router<AppState> {
    use handlers::potd;

    Router::new()
        .route("/today", get(potd::today))
        .route("/today/trmnl", get(potd::trmnl))
        .route("/scrape", post(potd::scrape))
        .route("/{date}", get(potd::by_date))
        // Original image
        .route("/{date}/image", get(potd::image))
        .route("/{date}/{width}/image", get(potd::image_width))
        .route("/{date}/{width}/{height}/image", get(potd::image_size))
        // Dithered image
        .route("/{date}/image/dithered", get(potd::dithered))
        .route("/{date}/{width}/image/dithered", get(potd::dithered_width))
        .route(
            "/{date}/{width}/{height}/image/dithered",
            get(potd::dithered_size),
        )
}

/// Create the main router with all routes.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(handlers::system::health))
        .route("/metrics", get(handlers::system::metrics))
        .nest("/api/potd", potd_routes())
        .with_state(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}
