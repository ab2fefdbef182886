use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{common::RelayError, server::AppState};

pub const CONTENT_TYPE: &str = "video/mp4";

/// GET /stream/{video_id}
///
/// Errors before the first byte become JSON bodies. Once the body has
/// started, an upstream error aborts the connection. A segment that does not
/// decode to UTF-8 is an invalid identifier like any other.
pub async fn stream_video(
    video_id: Result<Path<String>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let video_id = match video_id {
        Ok(Path(video_id)) => video_id,
        Err(rejection) => {
            tracing::warn!("GET /stream: undecodable identifier ({})", rejection.body_text());
            return RelayError::InvalidIdentifier(rejection.body_text()).into_response();
        }
    };

    tracing::info!("GET /stream/{}", video_id);

    match state.relay.handle(&video_id).await {
        Ok(relayed) => {
            tracing::debug!(
                "GET /stream/{}: committing headers for itag={}",
                video_id,
                relayed.format.itag
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE))],
                Body::from_stream(relayed.body),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("GET /stream/{}: {} ({})", video_id, e, e.status());
            e.into_response()
        }
    }
}
