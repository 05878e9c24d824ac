//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services reach storage through the Unit of Work.

mod auth_service;
mod booking_service;
pub mod container;
mod hotel_service;
mod room_service;
mod user_service;

// Service Container
pub use container::{parallel, Collaborators, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims};
pub use booking_service::{BookingManager, BookingRequest, BookingService};
pub use hotel_service::{HotelManager, HotelService};
pub use room_service::{RoomDraft, RoomManager, RoomService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use booking_service::MockBookingService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use hotel_service::MockHotelService;
#[cfg(any(test, feature = "test-utils"))]
pub use room_service::MockRoomService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
