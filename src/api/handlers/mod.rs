//! HTTP request handlers.

pub mod booking_handler;
pub mod hotel_handler;
pub mod room_handler;
pub mod user_handler;
pub mod webhook_handler;

pub use booking_handler::booking_routes;
pub use hotel_handler::hotel_routes;
pub use room_handler::room_routes;
pub use user_handler::user_routes;
pub use webhook_handler::webhook_routes;
