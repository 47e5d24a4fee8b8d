use axum::response::IntoResponse;

/// Undocumented banner route; useful as a liveness poke.
pub async fn root() -> impl IntoResponse {
    crate::APP_USER_AGENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn root_returns_the_user_agent() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
