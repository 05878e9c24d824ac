//! Stay period value object: the billable interval of a booking.
//!
//! Owns the two rules every booking path depends on: the inclusive overlap
//! test against existing bookings and the per-night price calculation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::config::{BOOKING_TOTAL_LIMIT, SECONDS_PER_NIGHT};
use crate::errors::{AppError, AppResult};

/// Validated `[check_in, check_out)` pair with `check_out > check_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPeriod {
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
}

impl StayPeriod {
    /// Build a stay, rejecting empty or inverted intervals.
    pub fn new(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> AppResult<Self> {
        if check_out <= check_in {
            return Err(AppError::validation(
                "Check-out date must be after check-in date",
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> DateTime<Utc> {
        self.check_in
    }

    pub fn check_out(&self) -> DateTime<Utc> {
        self.check_out
    }

    /// Billable nights, rounding partial days up. Always at least 1.
    pub fn nights(&self) -> i64 {
        let seconds = (self.check_out - self.check_in).num_seconds();
        // ceil for a positive numerator
        (seconds + SECONDS_PER_NIGHT - 1) / SECONDS_PER_NIGHT
    }

    /// Total charge for the stay at the given nightly rate. Fails when the
    /// total cannot be stored.
    pub fn total_price(&self, price_per_night: Decimal) -> AppResult<Decimal> {
        price_per_night
            .checked_mul(Decimal::from(self.nights()))
            .filter(|total| *total < Decimal::from(BOOKING_TOTAL_LIMIT))
            .ok_or_else(|| AppError::validation("Stay is too long to be booked"))
    }

    /// Inclusive interval intersection used for conflict detection.
    pub fn overlaps(&self, check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> bool {
        intervals_overlap(check_in, check_out, self.check_in, self.check_out)
    }
}

/// `existing.check_in <= requested.check_out && existing.check_out >= requested.check_in`
pub fn intervals_overlap(
    existing_in: DateTime<Utc>,
    existing_out: DateTime<Utc>,
    requested_in: DateTime<Utc>,
    requested_out: DateTime<Utc>,
) -> bool {
    existing_in <= requested_out && existing_out >= requested_in
}

/// Parse a `YYYY-MM-DD` date (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> AppResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::validation(format!("Invalid date: {}", value)))
}

/// Serde adapter for request bodies that carry HTML date-input values.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
