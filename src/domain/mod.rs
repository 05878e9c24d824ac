//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.
//!
//! Contains: Entities, Value Objects (stay period, filters), aggregates.

pub mod booking;
pub mod hotel;
pub mod room;
pub mod stay;
pub mod user;

pub use booking::{Booking, BookingDetails, BookingStatus, HotelDashboard, NewBooking};
pub use hotel::{Hotel, HotelWithOwner, NewHotel};
pub use room::{NewRoom, PriceRange, Room, RoomFilter, RoomListing, RoomSort, RoomType};
pub use stay::StayPeriod;
pub use user::{GuestSummary, IdentityEvent, IdentityProfile, OwnerSummary, User, UserProfile, UserRole};
