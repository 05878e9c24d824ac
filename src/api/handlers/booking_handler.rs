//! Booking handlers.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, rate_limit_booking_middleware, CurrentUser};
use crate::api::AppState;
use crate::domain::stay::deserialize_date;
use crate::domain::{Booking, BookingDetails, HotelDashboard};
use crate::errors::AppResult;
use crate::services::BookingRequest;
use crate::types::ApiResponse;

/// Availability query for one room
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    /// Room id
    pub room: Uuid,
    /// `YYYY-MM-DD` or RFC 3339
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, example = "2024-01-01")]
    pub check_in_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, example = "2024-01-04")]
    pub check_out_date: DateTime<Utc>,
}

/// Booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub room: Uuid,
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, example = "2024-01-01")]
    pub check_in_date: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_date")]
    #[schema(value_type = String, example = "2024-01-04")]
    pub check_out_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "At least one guest is required"))]
    #[schema(example = 2, minimum = 1)]
    pub guests: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub is_available: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingPayload {
    pub booking: Booking,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingsPayload {
    pub bookings: Vec<BookingDetails>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub dashboard_data: HotelDashboard,
}

/// Create booking routes; everything but the availability check requires a session
pub fn booking_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_booking))
        .route("/book", post(create_booking))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_booking_middleware,
        ))
        .route("/user", get(user_bookings))
        .route("/owner-dashboard", get(owner_dashboard))
        .route("/hotel", get(owner_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/check-availability", post(check_availability))
        .merge(protected)
}

/// Whether a room is free for the given dates
#[utoipa::path(
    post,
    path = "/api/bookings/check-availability",
    tag = "Bookings",
    request_body = CheckAvailabilityRequest,
    responses(
        (status = 200, description = "Availability flag", body = AvailabilityPayload),
        (status = 503, description = "Storage unavailable, retry later")
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CheckAvailabilityRequest>,
) -> AppResult<ApiResponse<AvailabilityPayload>> {
    let is_available = state
        .booking_service
        .check_availability(payload.room, payload.check_in_date, payload.check_out_date)
        .await?;

    Ok(ApiResponse::success(AvailabilityPayload { is_available }))
}

/// Book a room; a confirmation email is queued on success
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created, or `success: false` when the dates are taken", body = BookingPayload),
        (status = 503, description = "Room busy or storage unavailable, retry later")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<ApiResponse<BookingPayload>> {
    let booking = state
        .booking_service
        .create_booking(BookingRequest {
            user_id: current_user.id().to_string(),
            room_id: payload.room,
            check_in: payload.check_in_date,
            check_out: payload.check_out_date,
            guests: payload.guests,
        })
        .await?;

    Ok(ApiResponse::with_message(
        BookingPayload { booking },
        "Booking created successfully.",
    ))
}

/// Bookings made by the caller
#[utoipa::path(
    get,
    path = "/api/bookings/user",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = BookingsPayload)
    )
)]
pub async fn user_bookings(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<BookingsPayload>> {
    let bookings = state.booking_service.user_bookings(current_user.id()).await?;
    Ok(ApiResponse::success(BookingsPayload { bookings }))
}

/// Bookings and revenue across the caller's hotels
#[utoipa::path(
    get,
    path = "/api/bookings/owner-dashboard",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard, or `success: false` without a hotel", body = DashboardPayload)
    )
)]
pub async fn owner_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<DashboardPayload>> {
    let dashboard_data = state.booking_service.dashboard(current_user.id()).await?;
    Ok(ApiResponse::success(DashboardPayload { dashboard_data }))
}
