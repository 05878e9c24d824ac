//! In-memory collaborators shared by the integration tests.
//!
//! The store keeps every aggregate behind one mutex and yields to the
//! scheduler between reads and writes, so two unserialized bookings for the
//! same room would interleave exactly like they can against Postgres.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rust_decimal::Decimal;
use uuid::Uuid;

use hotel_booking::config::{ClerkConfig, Config, DUPLICATE_HOTEL_MESSAGE};
use hotel_booking::domain::stay::intervals_overlap;
use hotel_booking::domain::{
    Booking, BookingStatus, Hotel, IdentityProfile, NewBooking, NewHotel, NewRoom, Room, RoomType,
    User, UserRole,
};
use hotel_booking::errors::{AppError, AppResult};
use hotel_booking::infra::{
    BookingRecord, BookingRepository, HotelRepository, IdentityProvider, ImageStore, ImageUpload,
    LocalRoomLocks, Repositories, RoomLocks, RoomRepository, UserRepository,
};
use hotel_booking::jobs::{EmailJob, NotificationQueue};
use hotel_booking::services::{Collaborators, Services};
use hotel_booking::AppState;

pub const SIGNING_KEY: &str = include_str!("../fixtures/session_signing_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/session_public_key.pem");
pub const WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    hotels: Vec<Hotel>,
    rooms: Vec<Room>,
    bookings: Vec<Booking>,
}

/// Every repository over one shared set of tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    broken: AtomicBool,
    stall_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every booking query fail like a dropped connection.
    pub fn break_bookings(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    /// Delay booking inserts and listings like an overloaded database.
    pub fn stall_bookings(&self, delay: Duration) {
        self.stall_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn resume_bookings(&self) {
        self.stall_ms.store(0, Ordering::SeqCst);
    }

    async fn stall(&self) {
        let ms = self.stall_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            Err(AppError::Database(sea_orm::DbErr::Custom(
                "connection reset by peer".to_string(),
            )))
        } else {
            Ok(())
        }
    }

    pub fn add_user(&self, id: &str, email: &str, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: id.to_string(),
            email: email.to_string(),
            username: format!("{} name", id),
            image: String::new(),
            role,
            recent_searched_cities: vec![],
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .users
            .insert(user.id.clone(), user.clone());
        user
    }

    pub fn add_hotel(&self, owner_id: &str, name: &str, city: &str) -> Hotel {
        let now = Utc::now();
        let hotel = Hotel {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            address: "1 Beach Road".to_string(),
            contact: "+91 90000 00000".to_string(),
            city: city.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().hotels.push(hotel.clone());
        hotel
    }

    pub fn add_room(&self, hotel_id: Uuid, room_type: RoomType, price: i64) -> Room {
        let now = Utc::now();
        let room = Room {
            id: Uuid::new_v4(),
            hotel_id,
            room_type,
            price_per_night: Decimal::from(price),
            amenities: vec!["Free WiFi".to_string()],
            images: vec!["https://img.example/room.jpg".to_string()],
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().rooms.push(room.clone());
        room
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.tables.lock().unwrap().users.get(id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn bookings_of(&self, room_id: Uuid) -> Vec<Booking> {
        self.tables
            .lock()
            .unwrap()
            .bookings
            .iter()
            .filter(|b| b.room_id == room_id)
            .cloned()
            .collect()
    }

    fn record(tables: &Tables, booking: &Booking) -> Option<BookingRecord> {
        let room = tables.rooms.iter().find(|r| r.id == booking.room_id)?;
        let hotel = tables.hotels.iter().find(|h| h.id == booking.hotel_id)?;
        Some((booking.clone(), room.clone(), hotel.clone()))
    }

    fn records(&self, keep: impl Fn(&Booking) -> bool) -> Vec<BookingRecord> {
        let tables = self.tables.lock().unwrap();
        let mut records: Vec<BookingRecord> = tables
            .bookings
            .iter()
            .filter(|b| keep(b))
            .filter_map(|b| Self::record(&tables, b))
            .collect();
        records.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at));
        records
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_many(&self, ids: Vec<String>) -> AppResult<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn upsert(&self, profile: IdentityProfile) -> AppResult<User> {
        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();
        let user = tables.users.entry(profile.id.clone()).or_insert_with(|| User {
            id: profile.id.clone(),
            email: String::new(),
            username: String::new(),
            image: String::new(),
            role: UserRole::Guest,
            recent_searched_cities: vec![],
            created_at: now,
            updated_at: now,
        });
        user.email = profile.email;
        user.username = profile.username;
        user.image = profile.image;
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.tables.lock().unwrap().users.remove(id).is_some())
    }

    async fn set_role(&self, id: &str, role: UserRole) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables.users.get_mut(id).ok_or_else(|| AppError::not_found("User"))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn set_recent_cities(&self, id: &str, cities: Vec<String>) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables.users.get_mut(id).ok_or_else(|| AppError::not_found("User"))?;
        user.recent_searched_cities = cities;
        Ok(user.clone())
    }
}

#[async_trait]
impl HotelRepository for MemoryStore {
    /// Enforces the (owner, name) unique index like Postgres does.
    async fn create(&self, hotel: NewHotel) -> AppResult<Hotel> {
        tokio::task::yield_now().await;
        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();
        if tables
            .hotels
            .iter()
            .any(|h| h.owner_id == hotel.owner_id && h.name == hotel.name)
        {
            return Err(AppError::conflict(DUPLICATE_HOTEL_MESSAGE));
        }
        let stored = Hotel {
            id: Uuid::new_v4(),
            owner_id: hotel.owner_id,
            name: hotel.name,
            address: hotel.address,
            contact: hotel.contact,
            city: hotel.city,
            created_at: now,
            updated_at: now,
        };
        tables.hotels.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.hotels.iter().find(|h| h.id == id).cloned())
    }

    async fn find_by_owner_and_name(&self, owner_id: &str, name: &str) -> AppResult<Option<Hotel>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .hotels
            .iter()
            .find(|h| h.owner_id == owner_id && h.name == name)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<Hotel>> {
        let tables = self.tables.lock().unwrap();
        // newest first
        Ok(tables
            .hotels
            .iter()
            .rev()
            .filter(|h| h.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Hotel>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .hotels
            .iter()
            .filter(|h| ids.contains(&h.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn create(&self, room: NewRoom) -> AppResult<Room> {
        let mut created = self.add_room(room.hotel_id, room.room_type, 0);
        let mut tables = self.tables.lock().unwrap();
        if let Some(stored) = tables.rooms.iter_mut().find(|r| r.id == created.id) {
            stored.price_per_night = room.price_per_night;
            stored.amenities = room.amenities;
            stored.images = room.images;
            created = stored.clone();
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn find_with_hotel(&self, id: Uuid) -> AppResult<Option<(Room, Hotel)>> {
        tokio::task::yield_now().await;
        let tables = self.tables.lock().unwrap();
        let Some(room) = tables.rooms.iter().find(|r| r.id == id) else {
            return Ok(None);
        };
        Ok(tables
            .hotels
            .iter()
            .find(|h| h.id == room.hotel_id)
            .map(|h| (room.clone(), h.clone())))
    }

    async fn list_available(&self) -> AppResult<Vec<(Room, Hotel)>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .rooms
            .iter()
            .rev()
            .filter(|r| r.is_available)
            .filter_map(|r| {
                let hotel = tables.hotels.iter().find(|h| h.id == r.hotel_id)?;
                Some((r.clone(), hotel.clone()))
            })
            .collect())
    }

    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<Room>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .rooms
            .iter()
            .filter(|r| hotel_ids.contains(&r.hotel_id))
            .cloned()
            .collect())
    }

    async fn toggle_availability(&self, id: Uuid) -> AppResult<Option<Room>> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.rooms.iter_mut().find(|r| r.id == id).map(|room| {
            room.toggle_availability();
            room.clone()
        }))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn count_overlapping(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.check()?;
        let count = {
            let tables = self.tables.lock().unwrap();
            tables
                .bookings
                .iter()
                .filter(|b| b.room_id == room_id)
                .filter(|b| intervals_overlap(b.check_in_date, b.check_out_date, check_in, check_out))
                .count() as u64
        };
        // let competing requests run between the check and the insert
        tokio::task::yield_now().await;
        Ok(count)
    }

    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        self.check()?;
        tokio::task::yield_now().await;
        self.stall().await;
        let now = Utc::now();
        let stored = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            room_id: booking.room_id,
            hotel_id: booking.hotel_id,
            check_in_date: booking.stay.check_in(),
            check_out_date: booking.stay.check_out(),
            total_price: booking.total_price,
            guests: booking.guests,
            status: BookingStatus::Pending,
            payment_method: "Pay At Hotel".to_string(),
            is_paid: false,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().bookings.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<BookingRecord>> {
        self.check()?;
        self.stall().await;
        Ok(self.records(|b| b.user_id == user_id))
    }

    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<BookingRecord>> {
        self.check()?;
        self.stall().await;
        Ok(self.records(|b| hotel_ids.contains(&b.hotel_id)))
    }
}

/// Identity provider answering from a fixed profile list.
#[derive(Default)]
pub struct StaticIdentity {
    pub profiles: Vec<IdentityProfile>,
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn fetch_user(&self, user_id: &str) -> AppResult<IdentityProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Image store that hands out predictable URLs.
pub struct FakeImages;

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, image: ImageUpload) -> AppResult<String> {
        Ok(format!("https://img.example/{}", image.file_name))
    }
}

/// Outbox that records queued emails, or refuses them all.
#[derive(Default)]
pub struct RecordingOutbox {
    pub sent: Mutex<Vec<EmailJob>>,
    pub failing: bool,
}

impl RecordingOutbox {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|j| j.to.clone()).collect()
    }
}

#[async_trait]
impl NotificationQueue for RecordingOutbox {
    async fn enqueue_email(&self, job: EmailJob) -> AppResult<()> {
        if self.failing {
            return Err(AppError::unavailable("job store unreachable"));
        }
        self.sent.lock().unwrap().push(job);
        Ok(())
    }
}

fn local_locks() -> Arc<dyn RoomLocks> {
    Arc::new(LocalRoomLocks::new(Duration::from_secs(5)))
}

pub fn test_config() -> Config {
    Config {
        db_operation_timeout: Duration::from_secs(5),
        clerk: ClerkConfig {
            jwt_public_key: Some(PUBLIC_KEY.to_string()),
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            ..ClerkConfig::default()
        },
        ..Config::default()
    }
}

/// Wired application over the memory store.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub outbox: Arc<RecordingOutbox>,
    pub services: Services,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_outbox(RecordingOutbox::default())
    }

    pub fn with_outbox(outbox: RecordingOutbox) -> Self {
        Self::build(outbox, local_locks(), StaticIdentity::default())
    }

    /// Users unknown locally are reconciled from these provider profiles.
    pub fn with_identity(profiles: Vec<IdentityProfile>) -> Self {
        Self::build(
            RecordingOutbox::default(),
            local_locks(),
            StaticIdentity { profiles },
        )
    }

    /// Storage calls give up after `timeout`.
    pub fn with_operation_timeout(timeout: Duration) -> Self {
        let config = Config {
            db_operation_timeout: timeout,
            ..test_config()
        };
        Self::assemble(
            &config,
            RecordingOutbox::default(),
            local_locks(),
            StaticIdentity::default(),
        )
    }

    pub fn build(
        outbox: RecordingOutbox,
        locks: Arc<dyn RoomLocks>,
        identity: StaticIdentity,
    ) -> Self {
        Self::assemble(&test_config(), outbox, locks, identity)
    }

    fn assemble(
        config: &Config,
        outbox: RecordingOutbox,
        locks: Arc<dyn RoomLocks>,
        identity: StaticIdentity,
    ) -> Self {
        let store = MemoryStore::new();
        let outbox = Arc::new(outbox);
        let uow = Arc::new(Repositories {
            users: store.clone(),
            hotels: store.clone(),
            rooms: store.clone(),
            bookings: store.clone(),
        });
        let deps = Collaborators {
            identity: Arc::new(identity),
            images: Arc::new(FakeImages),
            locks,
            outbox: outbox.clone(),
        };
        let services = Services::new(uow, config, deps);

        Self {
            store,
            outbox,
            services,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::from_services(&self.services, &test_config())
    }
}

/// RS256 session token for `user_id`, valid for an hour.
pub fn session_token(user_id: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = serde_json::json!({
        "sub": user_id,
        "iat": now,
        "exp": now + 3600,
        "azp": "http://localhost:5173",
    });
    let key = EncodingKey::from_rsa_pem(SIGNING_KEY.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}
