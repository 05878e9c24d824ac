//! Booking service - availability, pricing and the booking engine.
//!
//! A booking is created under the room's lease so that the availability
//! check and the insert cannot interleave with another request for the same
//! room. Storage calls are bounded by the configured operation timeout, and
//! the whole locked section by a bound shorter than the lease TTL; a timeout
//! surfaces as a retryable `Unavailable`. The confirmation email is
//! queued after the lease is released and never fails the booking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{
    Config, BOOKING_SECTION_TIMEOUT_SECS, NO_HOTEL_MESSAGE, ROOM_DELISTED_MESSAGE,
    ROOM_UNAVAILABLE_MESSAGE,
};
use crate::domain::{
    Booking, BookingDetails, GuestSummary, Hotel, HotelDashboard, NewBooking, Room, StayPeriod,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{RoomLocks, UnitOfWork};
use crate::jobs::{EmailJob, NotificationQueue};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Booking request from a signed-in guest
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub user_id: String,
    pub room_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub guests: i32,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingService: Send + Sync {
    /// True when no booking of the room intersects the requested dates
    async fn check_availability(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Price and store a pending booking, then queue its confirmation
    async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking>;

    /// Bookings made by `user_id`, newest first
    async fn user_bookings(&self, user_id: &str) -> AppResult<Vec<BookingDetails>>;

    /// Bookings and billed revenue across every hotel of `owner_id`
    async fn dashboard(&self, owner_id: &str) -> AppResult<HotelDashboard>;
}

pub struct BookingManager<U: UnitOfWork> {
    uow: Arc<U>,
    locks: Arc<dyn RoomLocks>,
    outbox: Arc<dyn NotificationQueue>,
    currency: String,
    operation_timeout: Duration,
    section_timeout: Duration,
}

impl<U: UnitOfWork> BookingManager<U> {
    pub fn new(
        uow: Arc<U>,
        locks: Arc<dyn RoomLocks>,
        outbox: Arc<dyn NotificationQueue>,
        config: &Config,
    ) -> Self {
        Self {
            uow,
            locks,
            outbox,
            currency: config.currency.clone(),
            operation_timeout: config.db_operation_timeout,
            section_timeout: config
                .db_operation_timeout
                .min(Duration::from_secs(BOOKING_SECTION_TIMEOUT_SECS)),
        }
    }

    async fn timed<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .map_err(|_| AppError::unavailable("storage operation timed out"))?
    }

    async fn is_free(&self, room_id: Uuid, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> AppResult<bool> {
        let overlapping = self
            .timed(
                self.uow
                    .bookings()
                    .count_overlapping(room_id, check_in, check_out),
            )
            .await?;
        Ok(overlapping == 0)
    }

    /// Check, load, price and insert. Must run under the room's lease.
    async fn book_locked(&self, request: &BookingRequest, stay: StayPeriod) -> AppResult<(Booking, Room, Hotel)> {
        if !self
            .is_free(request.room_id, stay.check_in(), stay.check_out())
            .await?
        {
            return Err(AppError::conflict(ROOM_UNAVAILABLE_MESSAGE));
        }

        let (room, hotel) = self
            .timed(self.uow.rooms().find_with_hotel(request.room_id))
            .await?
            .ok_or_not_found("Room")?;

        if !room.is_available {
            return Err(AppError::conflict(ROOM_DELISTED_MESSAGE));
        }
        let total_price = stay.total_price(room.price_per_night)?;

        let booking = self
            .timed(self.uow.bookings().create(NewBooking {
                user_id: request.user_id.clone(),
                room_id: room.id,
                hotel_id: hotel.id,
                stay,
                guests: request.guests,
                total_price,
            }))
            .await?;

        Ok((booking, room, hotel))
    }

    async fn queue_confirmation(&self, booking: &Booking, room: &Room, hotel: &Hotel) {
        let guest = match self.uow.users().find_by_id(&booking.user_id).await {
            Ok(Some(user)) if !user.email.is_empty() => user,
            Ok(_) => {
                tracing::warn!(booking_id = %booking.id, "Guest has no email, skipping confirmation");
                return;
            }
            Err(e) => {
                tracing::warn!(booking_id = %booking.id, error = %e, "Could not load guest for confirmation");
                return;
            }
        };

        let job = EmailJob::booking_confirmation(
            &guest.email,
            &guest.username,
            booking,
            room,
            hotel,
            &self.currency,
        );

        if let Err(e) = self.outbox.enqueue_email(job).await {
            tracing::error!(booking_id = %booking.id, error = %e, "Failed to queue booking confirmation");
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> BookingService for BookingManager<U> {
    async fn check_availability(
        &self,
        room_id: Uuid,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.is_free(room_id, check_in, check_out).await
    }

    async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        if request.guests < 1 {
            return Err(AppError::validation("At least one guest is required"));
        }
        let stay = StayPeriod::new(request.check_in, request.check_out)?;

        let lease = self.locks.acquire(request.room_id).await?;
        tracing::debug!(room_id = %lease.room_id(), "Room lease acquired");

        let outcome = tokio::time::timeout(self.section_timeout, self.book_locked(&request, stay))
            .await
            .unwrap_or_else(|_| Err(AppError::unavailable("booking timed out under room lease")));

        if let Err(e) = lease.release().await {
            tracing::warn!(room_id = %request.room_id, error = %e, "Room lease release failed");
        }

        let (booking, room, hotel) = outcome?;
        tracing::info!(
            booking_id = %booking.id,
            room_id = %room.id,
            user_id = %booking.user_id,
            nights = stay.nights(),
            total_price = %booking.total_price,
            "Booking created"
        );

        self.queue_confirmation(&booking, &room, &hotel).await;
        Ok(booking)
    }

    async fn user_bookings(&self, user_id: &str) -> AppResult<Vec<BookingDetails>> {
        let records = self.timed(self.uow.bookings().list_for_user(user_id)).await?;
        let guest = self
            .timed(self.uow.users().find_by_id(user_id))
            .await?
            .map(GuestSummary::from);

        let mut bookings: Vec<BookingDetails> = records
            .into_iter()
            .map(|(booking, room, hotel)| BookingDetails::new(booking, room, hotel, guest.clone()))
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(bookings)
    }

    async fn dashboard(&self, owner_id: &str) -> AppResult<HotelDashboard> {
        let hotels = self.timed(self.uow.hotels().list_for_owner(owner_id)).await?;
        if hotels.is_empty() {
            return Err(AppError::NotFound(NO_HOTEL_MESSAGE.to_string()));
        }

        let records = self
            .timed(
                self.uow
                    .bookings()
                    .list_for_hotels(hotels.iter().map(|h| h.id).collect()),
            )
            .await?;

        let mut guest_ids: Vec<String> = records.iter().map(|(b, _, _)| b.user_id.clone()).collect();
        guest_ids.sort();
        guest_ids.dedup();
        let guests: HashMap<String, GuestSummary> = self
            .timed(self.uow.users().find_many(guest_ids))
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), GuestSummary::from(u)))
            .collect();

        let bookings = records
            .into_iter()
            .map(|(booking, room, hotel)| {
                let guest = guests.get(&booking.user_id).cloned();
                BookingDetails::new(booking, room, hotel, guest)
            })
            .collect();

        Ok(HotelDashboard::from_bookings(bookings))
    }
}
