//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    booking_handler, hotel_handler, room_handler, user_handler, webhook_handler,
};
use crate::domain::{
    Booking, BookingDetails, BookingStatus, GuestSummary, Hotel, HotelDashboard, HotelWithOwner,
    OwnerSummary, PriceRange, Room, RoomListing, RoomSort, RoomType, UserProfile, UserRole,
};

/// OpenAPI documentation for the hotel booking API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hotel Booking API",
        version = "0.1.0",
        description = "Room listings, guest bookings and hotel owner dashboards. \
                       Business failures are reported with HTTP 200 and `success: false`.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        webhook_handler::clerk_webhook,
        user_handler::get_profile,
        user_handler::store_recent_search,
        hotel_handler::register_hotel,
        hotel_handler::owner_hotels,
        room_handler::create_room,
        room_handler::list_rooms,
        room_handler::owner_rooms,
        room_handler::room_details,
        room_handler::toggle_availability,
        booking_handler::check_availability,
        booking_handler::create_booking,
        booking_handler::user_bookings,
        booking_handler::owner_dashboard,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserProfile,
            OwnerSummary,
            GuestSummary,
            Hotel,
            HotelWithOwner,
            RoomType,
            PriceRange,
            RoomSort,
            Room,
            RoomListing,
            BookingStatus,
            Booking,
            BookingDetails,
            HotelDashboard,
            // Requests
            user_handler::RecentSearchRequest,
            hotel_handler::RegisterHotelRequest,
            room_handler::CreateRoomForm,
            room_handler::ToggleAvailabilityRequest,
            booking_handler::CheckAvailabilityRequest,
            booking_handler::CreateBookingRequest,
            // Payloads
            hotel_handler::HotelPayload,
            hotel_handler::HotelsPayload,
            room_handler::RoomPayload,
            room_handler::RoomListingPayload,
            room_handler::RoomsPayload,
            booking_handler::AvailabilityPayload,
            booking_handler::BookingPayload,
            booking_handler::BookingsPayload,
            booking_handler::DashboardPayload,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Signed-in user profile and recent searches"),
        (name = "Hotels", description = "Hotel registration"),
        (name = "Rooms", description = "Room catalogue"),
        (name = "Bookings", description = "Availability, bookings and owner dashboard"),
        (name = "Webhooks", description = "Identity provider events")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for session Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Clerk session token"))
                        .build(),
                ),
            );
        }
    }
}
