//! Signed-in user handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserProfile;
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Recent search request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearchRequest {
    #[validate(length(min = 1, message = "City is required"))]
    #[schema(example = "Mumbai")]
    pub recent_searched_city: String,
}

/// Create user routes (all require authentication)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile))
        .route("/store-recent-search", post(store_recent_search))
}

/// Role and recent searches of the signed-in user
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile, or `success: false` when not authenticated", body = UserProfile)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state.user_service.profile(current_user.id()).await?;
    Ok(ApiResponse::success(profile))
}

/// Remember a searched city (three most recent are kept)
#[utoipa::path(
    post,
    path = "/api/user/store-recent-search",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = RecentSearchRequest,
    responses(
        (status = 200, description = "City stored", body = UserProfile)
    )
)]
pub async fn store_recent_search(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<RecentSearchRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .user_service
        .store_recent_search(current_user.id(), &payload.recent_searched_city)
        .await?;

    Ok(ApiResponse::with_message(profile, "City added"))
}
