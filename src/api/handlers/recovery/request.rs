//! OTP issuance endpoints.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::debug;

use crate::recovery::{RecoveryError, RecoveryService};

use super::error_response;
use super::types::{Ack, OtpRequest};

/// Generic acknowledgement: the gated route answers identically whether or
/// not the email maps to an account, so responses cannot be used to probe
/// the directory.
const REQUEST_ACK: &str = "If that email is registered, a code is on the way.";

/// Request a recovery code for a registered, active account.
#[utoipa::path(
    post,
    path = "/v1/otp/request",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Accepted; the acknowledgement is intentionally generic", body = Ack),
        (status = 400, description = "Missing or empty email", body = String),
        (status = 500, description = "Store or mail failure", body = String)
    ),
    tag = "recovery"
)]
pub async fn request_otp(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let request: OtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service.request_otp(&request.email).await {
        Ok(()) => (StatusCode::OK, Json(Ack::new(REQUEST_ACK))).into_response(),
        Err(RecoveryError::NotRegistered) => {
            // Existence is internal branching only; the caller gets the
            // same acknowledgement either way.
            debug!("otp request for unregistered or inactive email");
            (StatusCode::OK, Json(Ack::new(REQUEST_ACK))).into_response()
        }
        Err(err) => error_response(&err),
    }
}

/// Re-issue a code without the account gate, with a plain message body.
#[utoipa::path(
    post,
    path = "/v1/otp/request/resend",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Code issued and sent", body = Ack),
        (status = 400, description = "Missing or invalid email", body = String),
        (status = 500, description = "Store or mail failure", body = String)
    ),
    tag = "recovery"
)]
pub async fn resend_otp(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<OtpRequest>>,
) -> impl IntoResponse {
    let request: OtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service.resend_otp(&request.email).await {
        Ok(()) => (StatusCode::OK, Json(Ack::new("OTP sent"))).into_response(),
        Err(err) => error_response(&err),
    }
}
