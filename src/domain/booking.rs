//! Booking domain entity and owner dashboard aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::hotel::Hotel;
use super::room::Room;
use super::stay::StayPeriod;
use super::user::GuestSummary;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl From<&str> for BookingStatus {
    fn from(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

/// Booking domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: String,
    #[serde(rename = "room")]
    pub room_id: Uuid,
    #[serde(rename = "hotel")]
    pub hotel_id: Uuid,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[schema(value_type = f64, example = 3000.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[schema(example = 2)]
    pub guests: i32,
    pub status: BookingStatus,
    #[schema(example = "Pay At Hotel")]
    pub payment_method: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to persist a booking, priced and validated
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub room_id: Uuid,
    pub hotel_id: Uuid,
    pub stay: StayPeriod,
    pub guests: i32,
    pub total_price: Decimal,
}

/// Booking with its room, hotel and guest resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Missing when the guest's account has since been deleted
    pub user: Option<GuestSummary>,
    pub room: Room,
    pub hotel: Hotel,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[schema(value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub guests: i32,
    pub status: BookingStatus,
    pub payment_method: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingDetails {
    pub fn new(booking: Booking, room: Room, hotel: Hotel, user: Option<GuestSummary>) -> Self {
        Self {
            id: booking.id,
            user,
            room,
            hotel,
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            total_price: booking.total_price,
            guests: booking.guests,
            status: booking.status,
            payment_method: booking.payment_method,
            is_paid: booking.is_paid,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Owner dashboard: every booking across the owner's hotels
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelDashboard {
    pub total_bookings: usize,
    /// Sum of billed totals, paid or not
    #[schema(value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub bookings: Vec<BookingDetails>,
}

impl HotelDashboard {
    /// Aggregate bookings, ordering them newest first.
    pub fn from_bookings(mut bookings: Vec<BookingDetails>) -> Self {
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_revenue = bookings.iter().map(|b| b.total_price).sum();

        Self {
            total_bookings: bookings.len(),
            total_revenue,
            bookings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomType;
    use chrono::Duration;

    fn details(price: i64, age_minutes: i64, hotel_id: Uuid) -> BookingDetails {
        let now = Utc::now();
        let created = now - Duration::minutes(age_minutes);
        let hotel = Hotel {
            id: hotel_id,
            owner_id: "user_owner".to_string(),
            name: "Hotel".to_string(),
            address: "Street".to_string(),
            contact: "123".to_string(),
            city: "Pune".to_string(),
            created_at: now,
            updated_at: now,
        };
        let room = Room {
            id: Uuid::new_v4(),
            hotel_id,
            room_type: RoomType::SingleBed,
            price_per_night: Decimal::from(price),
            amenities: vec![],
            images: vec![],
            is_available: true,
            created_at: now,
            updated_at: now,
        };
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: "user_guest".to_string(),
            room_id: room.id,
            hotel_id,
            check_in_date: now,
            check_out_date: now + Duration::days(1),
            total_price: Decimal::from(price),
            guests: 1,
            status: BookingStatus::Pending,
            payment_method: "Pay At Hotel".to_string(),
            is_paid: false,
            created_at: created,
            updated_at: created,
        };
        BookingDetails::new(booking, room, hotel, None)
    }

    #[test]
    fn dashboard_sums_revenue_across_hotels_newest_first() {
        let (h1, h2) = (Uuid::new_v4(), Uuid::new_v4());
        let dashboard = HotelDashboard::from_bookings(vec![
            details(1000, 30, h1),
            details(2000, 10, h2),
            details(1500, 20, h1),
        ]);

        assert_eq!(dashboard.total_bookings, 3);
        assert_eq!(dashboard.total_revenue, Decimal::from(4500));
        let order: Vec<_> = dashboard.bookings.iter().map(|b| b.total_price).collect();
        assert_eq!(
            order,
            vec![Decimal::from(2000), Decimal::from(1500), Decimal::from(1000)]
        );
    }

    #[test]
    fn empty_dashboard_has_zero_revenue() {
        let dashboard = HotelDashboard::from_bookings(vec![]);
        assert_eq!(dashboard.total_bookings, 0);
        assert_eq!(dashboard.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(BookingStatus::default(), BookingStatus::Pending);
        assert_eq!(BookingStatus::from("confirmed"), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::from("weird"), BookingStatus::Pending);
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
