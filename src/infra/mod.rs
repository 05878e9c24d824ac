//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Identity provider, webhook signatures and image storage clients
//! - Caching, rate limiting and per-room locks (Redis)
//! - Unit of Work for repository access

pub mod cache;
pub mod clerk;
pub mod cloudinary;
pub mod db;
pub mod locks;
pub mod repositories;
pub mod unit_of_work;
pub mod webhook;

pub use cache::{Cache, LockGuard};
pub use clerk::{parse_webhook_event, ClerkClient, ClerkUser, IdentityProvider};
pub use cloudinary::{CloudinaryStore, ImageStore, ImageUpload};
pub use db::{Database, Migrator};
pub use locks::{LocalRoomLocks, RedisRoomLocks, RoomLease, RoomLocks};
pub use repositories::{
    BookingRecord, BookingRepository, BookingStore, HotelRepository, HotelStore, RoomRepository,
    RoomStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, Repositories, UnitOfWork};
pub use webhook::{WebhookHeaders, WebhookVerifier};

#[cfg(any(test, feature = "test-utils"))]
pub use clerk::MockIdentityProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use cloudinary::MockImageStore;
#[cfg(any(test, feature = "test-utils"))]
pub use locks::MockRoomLocks;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBookingRepository, MockHotelRepository, MockRoomRepository, MockUserRepository,
};
