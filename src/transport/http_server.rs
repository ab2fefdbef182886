use std::sync::Arc;

use axum::{Router, middleware, routing::get};

use crate::{
    server::AppState,
    transport::{
        middleware::{add_response_headers, cors_layer, preflight_status},
        routes::{health, stream},
    },
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stream/{video_id}", get(stream::stream_video))
        .route("/health", get(health::health))
        .layer(cors_layer(&state.config.cors))
        .layer(middleware::from_fn_with_state(state.clone(), preflight_status))
        .layer(middleware::from_fn(add_response_headers))
        .with_state(state)
}
