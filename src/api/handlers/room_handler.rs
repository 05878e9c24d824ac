//! Room catalogue handlers.

use std::str::FromStr;

use axum::{
    extract::{
        multipart::Field,
        rejection::{PathRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    middleware,
    routing::{get, patch, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{auth_middleware, CurrentUser};
use crate::api::AppState;
use crate::config::{MAX_ROOM_IMAGES, MAX_ROOM_UPLOAD_BYTES};
use crate::domain::room::parse_list;
use crate::domain::{Room, RoomFilter, RoomListing, RoomSort, RoomType};
use crate::errors::{AppError, AppResult};
use crate::infra::ImageUpload;
use crate::services::RoomDraft;
use crate::types::ApiResponse;
use validator::Validate;

/// Public listing query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RoomQuery {
    /// Comma separated room types, e.g. `Single Bed,Luxury Room`
    pub room_types: Option<String>,
    /// Comma separated price ranges, e.g. `0-1999,6000+`
    pub price_ranges: Option<String>,
    /// Case-insensitive city substring
    pub destination: Option<String>,
    pub sort: Option<RoomSort>,
}

impl RoomQuery {
    fn into_filter(self) -> AppResult<RoomFilter> {
        Ok(RoomFilter {
            room_types: parse_list(self.room_types.as_deref())?,
            price_ranges: parse_list(self.price_ranges.as_deref())?,
            destination: self.destination,
            sort: self.sort.unwrap_or_default(),
        })
    }
}

/// Listing switch request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAvailabilityRequest {
    pub room_id: Uuid,
}

/// Multipart form accepted by `POST /api/rooms`
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateRoomForm {
    #[schema(example = "Double Bed")]
    room_type: String,
    #[schema(example = 2499)]
    price_per_night: f64,
    /// JSON array or comma separated list
    #[schema(example = "[\"Free WiFi\",\"Room Service\"]")]
    amenities: Option<String>,
    hotel_id: Option<Uuid>,
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomPayload {
    pub room: Room,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListingPayload {
    pub room: RoomListing,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomsPayload {
    pub rooms: Vec<RoomListing>,
}

/// Create room routes; owner routes are wrapped in session authentication
pub fn room_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/",
            post(create_room).layer(DefaultBodyLimit::max(MAX_ROOM_UPLOAD_BYTES)),
        )
        .route("/owner", get(owner_rooms))
        .route("/availability", patch(toggle_availability))
        .route("/toggle-availability", post(toggle_availability))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(list_rooms))
        .route("/:id", get(room_details))
        .merge(protected)
}

fn form_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

async fn text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(form_error)
}

/// Amenities arrive as a JSON array string, or as a plain comma list.
fn parse_amenities(raw: &str) -> Vec<String> {
    let items: Vec<String> = serde_json::from_str(raw).unwrap_or_else(|_| {
        raw.split(',').map(str::to_string).collect()
    });
    items
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

async fn read_room_form(owner_id: &str, mut multipart: Multipart) -> AppResult<RoomDraft> {
    let mut room_type = None;
    let mut price = None;
    let mut amenities = Vec::new();
    let mut hotel_id = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" | "image" => {
                if images.len() == MAX_ROOM_IMAGES {
                    return Err(AppError::validation(format!(
                        "At most {} images are allowed",
                        MAX_ROOM_IMAGES
                    )));
                }
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                if !bytes.is_empty() {
                    images.push(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "roomType" => room_type = Some(RoomType::from_str(text(field).await?.trim())?),
            "pricePerNight" => {
                let raw = text(field).await?;
                let value = Decimal::from_str(raw.trim())
                    .map_err(|_| AppError::validation("Price per night must be a number"))?;
                price = Some(value);
            }
            "amenities" => amenities = parse_amenities(&text(field).await?),
            "hotelId" => {
                let raw = text(field).await?;
                if !raw.trim().is_empty() {
                    let id = Uuid::parse_str(raw.trim())
                        .map_err(|_| AppError::validation("Invalid hotel id"))?;
                    hotel_id = Some(id);
                }
            }
            other => tracing::debug!(field = %other, "Ignoring unknown room form field"),
        }
    }

    Ok(RoomDraft {
        owner_id: owner_id.to_string(),
        hotel_id,
        room_type: room_type.ok_or_else(|| AppError::validation("Room type is required"))?,
        price_per_night: price.ok_or_else(|| AppError::validation("Price per night is required"))?,
        amenities,
        images,
    })
}

/// Create a room with uploaded images
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    request_body(content = CreateRoomForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Room created, or `success: false` with the reason", body = RoomPayload),
        (status = 502, description = "Image storage failed")
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    current_user: CurrentUser,
    multipart: Multipart,
) -> AppResult<ApiResponse<RoomPayload>> {
    let draft = read_room_form(current_user.id(), multipart).await?;
    let room = state.room_service.create_room(draft).await?;

    Ok(ApiResponse::with_message(
        RoomPayload { room },
        "Room Created Successfully",
    ))
}

/// Publicly listed rooms
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "Rooms",
    params(RoomQuery),
    responses(
        (status = 200, description = "Matching rooms with hotel and owner", body = RoomsPayload)
    )
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    query: Result<Query<RoomQuery>, QueryRejection>,
) -> AppResult<ApiResponse<RoomsPayload>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let rooms = state.room_service.list_rooms(query.into_filter()?).await?;
    Ok(ApiResponse::success(RoomsPayload { rooms }))
}

/// Rooms across the caller's hotels
#[utoipa::path(
    get,
    path = "/api/rooms/owner",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner's rooms", body = RoomsPayload)
    )
)]
pub async fn owner_rooms(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<RoomsPayload>> {
    let rooms = state.room_service.owner_rooms(current_user.id()).await?;
    Ok(ApiResponse::success(RoomsPayload { rooms }))
}

/// One room with hotel and owner
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    params(("id" = Uuid, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room details, or `success: false` when missing", body = RoomListingPayload)
    )
)]
pub async fn room_details(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<ApiResponse<RoomListingPayload>> {
    let Path(id) = id.map_err(|_| AppError::not_found("Room"))?;
    let room = state.room_service.room_details(id).await?;
    Ok(ApiResponse::success(RoomListingPayload { room }))
}

/// Flip a room's listing switch
#[utoipa::path(
    patch,
    path = "/api/rooms/availability",
    tag = "Rooms",
    security(("bearer_auth" = [])),
    request_body = ToggleAvailabilityRequest,
    responses(
        (status = 200, description = "Updated room, or `success: false` when not the owner", body = RoomPayload)
    )
)]
pub async fn toggle_availability(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ToggleAvailabilityRequest>,
) -> AppResult<ApiResponse<RoomPayload>> {
    let room = state
        .room_service
        .toggle_availability(payload.room_id, current_user.id())
        .await?;

    Ok(ApiResponse::with_message(
        RoomPayload { room },
        "Room Availability Updated",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceRange;

    #[test]
    fn amenities_accept_json_or_comma_list() {
        assert_eq!(
            parse_amenities(r#"["Free WiFi", "Pool Access"]"#),
            vec!["Free WiFi", "Pool Access"]
        );
        assert_eq!(
            parse_amenities("Free WiFi, Room Service,"),
            vec!["Free WiFi", "Room Service"]
        );
    }

    #[test]
    fn query_becomes_filter() {
        let filter = RoomQuery {
            room_types: Some("Single Bed,Luxury Room".into()),
            price_ranges: Some("0-1999".into()),
            destination: Some("goa".into()),
            sort: Some(RoomSort::PriceAsc),
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.room_types, vec![RoomType::SingleBed, RoomType::LuxuryRoom]);
        assert_eq!(filter.price_ranges, vec![PriceRange::Under2000]);
        assert_eq!(filter.sort, RoomSort::PriceAsc);
    }

    #[test]
    fn unknown_room_type_is_rejected() {
        let result = RoomQuery {
            room_types: Some("Penthouse".into()),
            ..RoomQuery::default()
        }
        .into_filter();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
