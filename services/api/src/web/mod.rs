pub mod documents;
pub mod export_route;
pub mod generation;
pub mod prompts;
pub mod sections;
pub mod service;
pub mod state;

use axum::http::StatusCode;
use docsmith_core::ports::PortError;
use tracing::error;

/// Maps a port error onto the (status, message) pair the handlers return.
/// Unexpected errors are logged here and not echoed to the caller.
pub(crate) fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Unexpected(msg) => {
            error!("unexpected service error: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}
