//! Hotel registration handlers.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Hotel, NewHotel};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Hotel registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterHotelRequest {
    #[validate(length(min = 1, message = "Hotel name is required"))]
    #[schema(example = "Sea Breeze Inn")]
    pub name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    #[schema(example = "12 Marine Drive")]
    pub address: String,
    #[validate(length(min = 1, message = "Contact is required"))]
    #[schema(example = "+91 98765 43210")]
    pub contact: String,
    #[validate(length(min = 1, message = "City is required"))]
    #[schema(example = "Mumbai")]
    pub city: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HotelPayload {
    pub hotel: Hotel,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HotelsPayload {
    pub hotels: Vec<Hotel>,
}

/// Create hotel routes (all require authentication)
pub fn hotel_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_hotel))
        .route("/owner", get(owner_hotels))
}

/// Register a hotel; the caller becomes a hotel owner
#[utoipa::path(
    post,
    path = "/api/hotels",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    request_body = RegisterHotelRequest,
    responses(
        (status = 200, description = "Hotel registered, or `success: false` on duplicate name", body = HotelPayload)
    )
)]
pub async fn register_hotel(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<RegisterHotelRequest>,
) -> AppResult<ApiResponse<HotelPayload>> {
    let hotel = state
        .hotel_service
        .register_hotel(NewHotel {
            owner_id: current_user.id().to_string(),
            name: payload.name.trim().to_string(),
            address: payload.address.trim().to_string(),
            contact: payload.contact.trim().to_string(),
            city: payload.city.trim().to_string(),
        })
        .await?;

    Ok(ApiResponse::with_message(
        HotelPayload { hotel },
        "Hotel Successfully Registered",
    ))
}

/// Hotels owned by the caller, newest first
#[utoipa::path(
    get,
    path = "/api/hotels/owner",
    tag = "Hotels",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner's hotels", body = HotelsPayload)
    )
)]
pub async fn owner_hotels(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<HotelsPayload>> {
    let hotels = state.hotel_service.owner_hotels(current_user.id()).await?;
    Ok(ApiResponse::success(HotelsPayload { hotels }))
}
