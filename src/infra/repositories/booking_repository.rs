//! Booking repository: overlap queries and joined booking listings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::booking::{self, ActiveModel, Entity as BookingEntity};
use super::entities::hotel::{self, Entity as HotelEntity};
use super::entities::room::{self, Entity as RoomEntity};
use crate::config::DEFAULT_PAYMENT_METHOD;
use crate::domain::{Booking, BookingStatus, Hotel, NewBooking, Room};
use crate::errors::{storage_error, AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Booking with the room and hotel it references
pub type BookingRecord = (Booking, Room, Hotel);

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Number of bookings of `room_id` intersecting the requested interval.
    ///
    /// Uses the inclusive test `existing.check_in <= check_out AND
    /// existing.check_out >= check_in`.
    async fn count_overlapping(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<u64>;

    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;

    /// Bookings made by a user, newest first
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<BookingRecord>>;

    /// Bookings of any of the given hotels, newest first
    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<BookingRecord>>;
}

/// Concrete implementation of BookingRepository
pub struct BookingStore {
    db: DatabaseConnection,
}

impl BookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Run a booking query and resolve rooms and hotels in two extra lookups.
    async fn load_records(&self, query: Select<BookingEntity>) -> AppResult<Vec<BookingRecord>> {
        let rows = query
            .order_by_desc(booking::Column::CreatedAt)
            .find_also_related(RoomEntity)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        let hotel_ids: Vec<Uuid> = rows.iter().map(|(b, _)| b.hotel_id).collect();
        let hotels: HashMap<Uuid, Hotel> = if hotel_ids.is_empty() {
            HashMap::new()
        } else {
            HotelEntity::find()
                .filter(hotel::Column::Id.is_in(hotel_ids))
                .all(&self.db)
                .await
                .map_err(storage_error)?
                .into_iter()
                .map(|h| (h.id, Hotel::from(h)))
                .collect()
        };

        join_records(rows, &hotels)
    }
}

/// Attach room and hotel to each booking row. Foreign keys cascade, so a
/// missing relation means a torn read and fails the whole listing rather
/// than undercounting the dashboard.
fn join_records(
    rows: Vec<(booking::Model, Option<room::Model>)>,
    hotels: &HashMap<Uuid, Hotel>,
) -> AppResult<Vec<BookingRecord>> {
    rows.into_iter()
        .map(|(booking, room)| {
            let (Some(room), Some(hotel)) = (room, hotels.get(&booking.hotel_id)) else {
                tracing::error!(booking_id = %booking.id, "Booking references a missing room or hotel");
                return Err(AppError::internal("booking references a missing room or hotel"));
            };
            Ok((Booking::from(booking), Room::try_from(room)?, hotel.clone()))
        })
        .collect()
}

#[async_trait]
impl BookingRepository for BookingStore {
    async fn count_overlapping(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<u64> {
        BookingEntity::find()
            .filter(booking::Column::RoomId.eq(room_id))
            .filter(booking::Column::CheckInDate.lte(check_out))
            .filter(booking::Column::CheckOutDate.gte(check_in))
            .count(&self.db)
            .await
            .map_err(storage_error)
    }

    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(booking.user_id),
            room_id: Set(booking.room_id),
            hotel_id: Set(booking.hotel_id),
            check_in_date: Set(booking.stay.check_in()),
            check_out_date: Set(booking.stay.check_out()),
            total_price: Set(booking.total_price),
            guests: Set(booking.guests),
            status: Set(BookingStatus::Pending.as_str().to_string()),
            payment_method: Set(DEFAULT_PAYMENT_METHOD.to_string()),
            is_paid: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(storage_error)?;
        Ok(Booking::from(model))
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<BookingRecord>> {
        self.load_records(BookingEntity::find().filter(booking::Column::UserId.eq(user_id)))
            .await
    }

    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<BookingRecord>> {
        if hotel_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.load_records(BookingEntity::find().filter(booking::Column::HotelId.is_in(hotel_ids)))
            .await
    }
}
