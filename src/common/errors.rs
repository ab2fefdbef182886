use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Message sent to the client when the identifier fails validation.
pub const INVALID_ID_MESSAGE: &str = "Invalid YouTube Video ID";
/// Message sent when no format carries both audio and video.
pub const NO_FORMAT_MESSAGE: &str = "No suitable streaming format found.";
/// Message sent when the upstream fails before any byte reached the client.
pub const STREAM_ERROR_MESSAGE: &str = "Stream processing error";

/// Failure conditions of a relay session. Every variant is terminal.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid video identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Resolution(String),

    #[error("no format with both audio and video is available")]
    NoSuitableFormat,

    #[error("stream error: {0}")]
    Stream(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::Resolution(_) | Self::NoSuitableFormat | Self::Stream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message placed in the JSON body. Resolution errors carry the
    /// upstream text, the rest use fixed messages.
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidIdentifier(_) => INVALID_ID_MESSAGE.to_string(),
            Self::Resolution(msg) => format!("Server error: {}", msg),
            Self::NoSuitableFormat => NO_FORMAT_MESSAGE.to_string(),
            Self::Stream(_) => STREAM_ERROR_MESSAGE.to_string(),
        }
    }
}

/// JSON error response format: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.client_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::InvalidIdentifier("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::NoSuitableFormat.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::Resolution("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_resolution_message_carries_upstream_text() {
        let err = RelayError::Resolution("Video unavailable".into());
        assert_eq!(err.client_message(), "Server error: Video unavailable");
    }

    #[test]
    fn test_stream_error_hides_details() {
        let err = RelayError::Stream("connection reset by peer".into());
        assert_eq!(err.client_message(), STREAM_ERROR_MESSAGE);
    }
}
