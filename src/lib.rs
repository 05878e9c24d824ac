//! Hotel booking backend.
//!
//! Guests browse rooms and book stays; hotel owners register a hotel,
//! publish rooms with photos and follow bookings on a dashboard. Identity
//! comes from Clerk (session tokens plus signed webhooks).
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Users, hotels, rooms, bookings and the date rules
//! - **services**: Use cases (booking engine, catalogue, identity sync)
//! - **infra**: Postgres, Redis, Clerk and Cloudinary adapters
//! - **jobs**: Email outbox and worker
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Response envelope
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server with the email worker
//! cargo run -- serve --worker
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{Booking, Hotel, Room, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
