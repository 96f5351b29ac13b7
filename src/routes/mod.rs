use crate::config::stream::StreamConfig;
use crate::handlers;
use crate::services::{avatar::SharedAvatarResolver, store::StorePool};
use axum::{extract::Extension, routing, Router};
use std::env;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_routes() -> Router {
    Router::new()
        .route("/", routing::get(handlers::stream::stream_notifications))
        .route("/health", routing::get(handlers::health::health_check))
        .fallback(handlers::not_found)
}

/// Full application with its dependencies attached.
pub fn create_app(
    pool: StorePool,
    config: StreamConfig,
    avatars: SharedAvatarResolver,
    shutdown: CancellationToken,
) -> Router {
    create_routes().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer())
            .layer(Extension(pool))
            .layer(Extension(config))
            .layer(Extension(avatars))
            .layer(Extension(shutdown)),
    )
}

/// Pages embedding the stream in an iframe live on another origin.
fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CACHE_CONTROL]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}
