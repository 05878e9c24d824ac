//! Unit of Work: centralized repository access.
//!
//! Services receive one `UnitOfWork` and reach every aggregate through it,
//! so tests can swap the whole persistence layer with a single value.
//! Bookings are serialized per room by a lease rather than a database
//! transaction, so no transaction API is exposed here.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    BookingRepository, BookingStore, HotelRepository, HotelStore, RoomRepository, RoomStore,
    UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn hotels(&self) -> Arc<dyn HotelRepository>;

    fn rooms(&self) -> Arc<dyn RoomRepository>;

    fn bookings(&self) -> Arc<dyn BookingRepository>;
}

/// Concrete implementation of UnitOfWork backed by SeaORM stores
pub struct Persistence {
    user_repo: Arc<UserStore>,
    hotel_repo: Arc<HotelStore>,
    room_repo: Arc<RoomStore>,
    booking_repo: Arc<BookingStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            hotel_repo: Arc::new(HotelStore::new(db.clone())),
            room_repo: Arc::new(RoomStore::new(db.clone())),
            booking_repo: Arc::new(BookingStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelRepository> {
        self.hotel_repo.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomRepository> {
        self.room_repo.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.booking_repo.clone()
    }
}

/// Unit of Work assembled from arbitrary repository implementations.
///
/// Used by tests and tools that need mocks or in-memory stores.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub hotels: Arc<dyn HotelRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl UnitOfWork for Repositories {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn hotels(&self) -> Arc<dyn HotelRepository> {
        self.hotels.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomRepository> {
        self.rooms.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.bookings.clone()
    }
}
