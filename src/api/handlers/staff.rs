//! Staff directory endpoints: listing/search and the authenticated
//! change-password flow.

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::recovery::RecoveryService;
use crate::staff::models::StaffStatus;
use crate::staff::store::{StaffListFilter, StaffOrder, StaffSummary};

use super::recovery::error_response;
use super::recovery::types::Ack;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StaffListQuery {
    /// Filter by account status (`active` or `inactive`).
    pub status: Option<String>,
    /// Case-insensitive search over name, email, and role.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Sort column: `created_at`, `name`, or `email`.
    pub order: Option<String>,
    /// Sort direction: `asc` or `desc`.
    pub dir: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffListResponse {
    pub ok: bool,
    pub count: i64,
    pub limit: i64,
    pub offset: i64,
    pub data: Vec<StaffSummary>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// List staff accounts with optional filtering, search, and paging.
#[utoipa::path(
    get,
    path = "/v1/staff",
    params(StaffListQuery),
    responses(
        (status = 200, description = "Page of staff accounts", body = StaffListResponse),
        (status = 400, description = "Unknown status filter", body = String),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "staff"
)]
pub async fn list_staff(
    service: Extension<Arc<RecoveryService>>,
    Query(query): Query<StaffListQuery>,
) -> impl IntoResponse {
    let status = match &query.status {
        Some(value) => match StaffStatus::from_db(&value.trim().to_lowercase()) {
            Ok(status) => Some(status),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Unknown status filter: {value}"),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);
    let filter = StaffListFilter {
        status,
        search: query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_string),
        limit,
        offset,
        order: query
            .order
            .as_deref()
            .map(StaffOrder::parse)
            .unwrap_or_default(),
        ascending: query
            .dir
            .as_deref()
            .is_some_and(|dir| dir.eq_ignore_ascii_case("asc")),
    };

    match service.staff().list(&filter).await {
        Ok(page) => (
            StatusCode::OK,
            Json(StaffListResponse {
                ok: true,
                count: page.count,
                limit,
                offset,
                data: page.data,
            }),
        )
            .into_response(),
        Err(err) => {
            error!("failed to list staff: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
                .into_response()
        }
    }
}

/// Change a credential by proving knowledge of the current one.
#[utoipa::path(
    post,
    path = "/v1/staff/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Credential updated", body = Ack),
        (status = 400, description = "Validation failure or wrong current password"),
        (status = 404, description = "No account for this email"),
        (status = 500, description = "Store failure", body = String)
    ),
    tag = "staff"
)]
pub async fn change_password(
    service: Extension<Arc<RecoveryService>>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match service
        .change_password(
            &request.email,
            &request.current_password,
            &request.new_password,
            &request.confirm_password,
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(Ack::new("Password updated successfully.")),
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
    async fn list_staff_rejects_unknown_status() {
        let query = StaffListQuery {
            status: Some("suspended".to_string()),
            q: None,
            limit: None,
            offset: None,
            order: None,
            dir: None,
        };
        let response = list_staff(Extension(recovery_service()), Query(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_staff_defaults_paging() {
        let query = StaffListQuery {
            status: None,
            q: None,
            limit: Some(5_000),
            offset: Some(-3),
            order: Some("name".to_string()),
            dir: Some("ASC".to_string()),
        };
        let response = list_staff(Extension(recovery_service()), Query(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn change_password_missing_payload() {
        let response = change_password(Extension(recovery_service()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn change_password_unknown_email_is_not_found() {
        let request = ChangePasswordRequest {
            email: "ghost@example.com".to_string(),
            current_password: "whatever-1".to_string(),
            new_password: "new-password".to_string(),
            confirm_password: "new-password".to_string(),
        };
        let response = change_password(Extension(recovery_service()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
