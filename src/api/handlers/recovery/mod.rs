//! Recovery endpoints: request/resend a code, verify it, reset the
//! credential. Domain errors are translated to status + JSON here and
//! nowhere else.

pub mod request;
pub mod reset;
pub mod types;
pub mod verify;

use axum::Json;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::recovery::RecoveryError;

/// Translate a domain error into its HTTP response. Infrastructure errors
/// are logged with their full chain; the caller only sees the generic body.
pub(super) fn error_response(err: &RecoveryError) -> Response {
    match err {
        RecoveryError::Store(_) | RecoveryError::Send(_) | RecoveryError::Internal(_) => {
            error!("{err}");
        }
        _ => debug!("{err}"),
    }
    (err.status(), Json(err.body())).into_response()
}
