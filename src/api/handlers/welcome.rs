//! Onboarding mail endpoint.

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::recovery::RecoveryService;

use super::recovery::error_response;
use super::recovery::types::Ack;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeEmailRequest {
    pub to: String,
    pub name: String,
    pub temporary_password: String,
}

/// Send the branded welcome message with the account's temporary password.
#[utoipa::path(
    post,
    path = "/v1/staff/welcome-email",
    request_body = WelcomeEmailRequest,
    responses(
        (status = 200, description = "Mail sent", body = Ack),
        (status = 400, description = "Missing fields"),
        (status = 500, description = "Mail failure", body = String)
    ),
    tag = "staff"
)]
pub async fn send_welcome_email(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<WelcomeEmailRequest>>,
) -> impl IntoResponse {
    let request: WelcomeEmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .send_welcome_email(&request.to, &request.name, &request.temporary_password)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(Ack::new("Mail sent successfully"))).into_response(),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::recovery_service;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn welcome_email_missing_payload() {
        let response = send_welcome_email(Extension(recovery_service()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn welcome_email_rejects_blank_fields() {
        let request = WelcomeEmailRequest {
            to: "new@example.com".to_string(),
            name: " ".to_string(),
            temporary_password: "temp-secret".to_string(),
        };
        let response = send_welcome_email(Extension(recovery_service()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
