use axum::{
    Router,
    http::{Method, header},
};
use storage::LeaderboardService;
use tower_http::cors::{Any, CorsLayer};

use crate::features::scores;

/// Browsers may call every endpoint from any origin; preflight requests are
/// answered by the CORS layer before routing.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

pub fn router(service: LeaderboardService) -> Router {
    Router::new()
        .nest("/api", scores::routes::routes())
        .layer(cors())
        .with_state(service)
}
