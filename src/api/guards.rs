use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::errors::ApiError;
use crate::core::state::AppState;

/// Caller identity taken from the trusted header set by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CurrentUserId(pub(crate) i64);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUserId {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_name = state.settings().identity().user_id_header.as_str();

        let raw = parts
            .headers
            .get(header_name)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing user identity"))?;

        raw.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(CurrentUserId)
            .ok_or(ApiError::Unauthorized("Invalid user identity"))
    }
}
