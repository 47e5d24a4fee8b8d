//! OTP verification endpoint.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::recovery::RecoveryService;

use super::error_response;
use super::types::{OtpVerifyRequest, VerifyResponse};

/// Check a submitted code. Success consumes it and returns a single-use
/// reset token the caller must present to `/v1/reset-password`.
#[utoipa::path(
    post,
    path = "/v1/otp/verify",
    request_body = OtpVerifyRequest,
    responses(
        (status = 200, description = "Code verified; reset token granted", body = VerifyResponse),
        (status = 400, description = "Invalid code or malformed input"),
        (status = 404, description = "No code on file for this email"),
        (status = 410, description = "Code expired"),
        (status = 429, description = "Too many failed attempts"),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "recovery"
)]
pub async fn verify_otp(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<OtpVerifyRequest>>,
) -> impl IntoResponse {
    let request: OtpVerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service.verify_otp(&request.email, &request.code).await {
        Ok(grant) => (
            StatusCode::OK,
            Json(VerifyResponse {
                ok: true,
                message: "Code verified.".to_string(),
                reset_token: grant.token,
                expires_in_sec: grant.expires_in_seconds,
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::recovery_service;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn verify_otp_missing_payload() {
        let response = verify_otp(Extension(recovery_service()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_otp_rejects_blank_fields() {
        let response = verify_otp(
            Extension(recovery_service()),
            Some(Json(OtpVerifyRequest {
                email: "user@example.com".to_string(),
                code: "   ".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_otp_without_issuance_is_not_found() {
        let response = verify_otp(
            Extension(recovery_service()),
            Some(Json(OtpVerifyRequest {
                email: "user@example.com".to_string(),
                code: "123456".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
