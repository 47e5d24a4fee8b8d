//! Credential reset endpoint.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::recovery::RecoveryService;

use super::error_response;
use super::types::{Ack, ResetPasswordRequest};

/// Set a new credential using the reset token minted at verification time.
#[utoipa::path(
    post,
    path = "/v1/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Credential updated", body = Ack),
        (status = 400, description = "Validation failure or invalid reset token"),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "recovery"
)]
pub async fn reset_password(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .reset_password(
            &request.email,
            &request.reset_token,
            &request.password,
            &request.confirm_password,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(Ack::new("Password reset successfully.")),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
