//! Unified error type for the Gambit server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gambit_auth::AuthError;
use gambit_engine::EngineError;
use gambit_session::{ErrorKind, SessionError};

/// Top-level error that wraps all crate-specific errors.
///
/// Handlers return this, and the `#[from]` conversions let `?` lift any
/// sub-crate error into it. The [`IntoResponse`] impl decides the HTTP
/// status and renders `{ "error": "..." }`.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// Token issuance or validation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A session operation was refused.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The engine couldn't be located or started.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The path segment isn't a session ID.
    #[error("no session with id {0:?}")]
    InvalidSessionId(String),

    /// Binding or serving failed.
    #[error("server i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl GambitError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::InvalidIdentity(_)) => StatusCode::BAD_REQUEST,
            Self::Session(err) => match err.kind() {
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Engine(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidSessionId(_) => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GambitError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        // A flag fall still ends the game, so say how.
        if let Self::Session(SessionError::ClockExpired { result, .. }) = &self {
            body["outcome"] = serde_json::json!(result.outcome);
            body["method"] = serde_json::json!(result.method);
            body["fen"] = serde_json::json!(result.fen);
        }
        (status, Json(body)).into_response()
    }
}
