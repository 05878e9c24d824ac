//! Room domain entity, room categories and listing filters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::hotel::HotelWithOwner;
use crate::errors::{AppError, AppResult};

/// Fixed set of room categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RoomType {
    #[serde(rename = "Single Bed")]
    SingleBed,
    #[serde(rename = "Double Bed")]
    DoubleBed,
    #[serde(rename = "Luxury Room")]
    LuxuryRoom,
    #[serde(rename = "Family Suite")]
    FamilySuite,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::SingleBed,
        RoomType::DoubleBed,
        RoomType::LuxuryRoom,
        RoomType::FamilySuite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::SingleBed => "Single Bed",
            RoomType::DoubleBed => "Double Bed",
            RoomType::LuxuryRoom => "Luxury Room",
            RoomType::FamilySuite => "Family Suite",
        }
    }
}

impl FromStr for RoomType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Unknown room type: {}", s)))
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    #[schema(value_type = f64, example = 2499.0)]
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    /// Manual listing switch, independent of date-range bookings
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Flip the manual listing switch.
    pub fn toggle_availability(&mut self) {
        self.is_available = !self.is_available;
        self.updated_at = Utc::now();
    }
}

/// Data needed to create a room (images already uploaded)
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub hotel_id: Uuid,
    pub room_type: RoomType,
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

/// Room joined with its hotel, as shown in listings and details
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomListing {
    #[serde(flatten)]
    pub room: Room,
    pub hotel: HotelWithOwner,
}

/// Price buckets offered by the room search page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PriceRange {
    #[serde(rename = "0-1999")]
    Under2000,
    #[serde(rename = "2000-3999")]
    From2000To3999,
    #[serde(rename = "4000-5999")]
    From4000To5999,
    #[serde(rename = "6000+")]
    From6000,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        let (min, max) = match self {
            PriceRange::Under2000 => (0, Some(1999)),
            PriceRange::From2000To3999 => (2000, Some(3999)),
            PriceRange::From4000To5999 => (4000, Some(5999)),
            PriceRange::From6000 => (6000, None),
        };
        price >= Decimal::from(min) && max.map_or(true, |max| price <= Decimal::from(max))
    }
}

impl FromStr for PriceRange {
    type Err = AppError;

    /// Accepts `0-1999` as well as the page label `0 to 1999`. An unescaped
    /// `+` in a query string decodes to a space, so `6000` is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(" to ", "-").replace(' ', "");
        match normalized.as_str() {
            "0-1999" => Ok(PriceRange::Under2000),
            "2000-3999" => Ok(PriceRange::From2000To3999),
            "4000-5999" => Ok(PriceRange::From4000To5999),
            "6000+" | "6000" => Ok(PriceRange::From6000),
            _ => Err(AppError::validation(format!("Unknown price range: {}", s))),
        }
    }
}

/// Sort order for public listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomSort {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
}

/// Public listing filter; empty lists mean "any"
#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub room_types: Vec<RoomType>,
    pub price_ranges: Vec<PriceRange>,
    pub destination: Option<String>,
    pub sort: RoomSort,
}

impl RoomFilter {
    pub fn matches(&self, listing: &RoomListing) -> bool {
        let room = &listing.room;

        let type_ok = self.room_types.is_empty() || self.room_types.contains(&room.room_type);
        let price_ok = self.price_ranges.is_empty()
            || self
                .price_ranges
                .iter()
                .any(|range| range.contains(room.price_per_night));
        let destination_ok = match self.destination.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(dest) => listing
                .hotel
                .city
                .to_lowercase()
                .contains(&dest.to_lowercase()),
        };

        type_ok && price_ok && destination_ok
    }

    /// Filter and order listings.
    pub fn apply(&self, listings: Vec<RoomListing>) -> Vec<RoomListing> {
        let mut matched: Vec<RoomListing> =
            listings.into_iter().filter(|l| self.matches(l)).collect();

        match self.sort {
            RoomSort::PriceAsc => {
                matched.sort_by(|a, b| a.room.price_per_night.cmp(&b.room.price_per_night))
            }
            RoomSort::PriceDesc => {
                matched.sort_by(|a, b| b.room.price_per_night.cmp(&a.room.price_per_night))
            }
            RoomSort::Newest => matched.sort_by(|a, b| b.room.created_at.cmp(&a.room.created_at)),
        }

        matched
    }
}

/// Parse a comma separated query value into typed filter entries.
pub fn parse_list<T: FromStr<Err = AppError>>(raw: Option<&str>) -> AppResult<Vec<T>> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(T::from_str)
            .collect()
    })
    .unwrap_or_else(|| Ok(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(room_type: RoomType, price: i64, city: &str, age_days: i64) -> RoomListing {
        let created = Utc::now() - Duration::days(age_days);
        RoomListing {
            room: Room {
                id: Uuid::new_v4(),
                hotel_id: Uuid::new_v4(),
                room_type,
                price_per_night: Decimal::from(price),
                amenities: vec!["Free WiFi".to_string()],
                images: vec!["https://img.test/1.jpg".to_string()],
                is_available: true,
                created_at: created,
                updated_at: created,
            },
            hotel: HotelWithOwner {
                id: Uuid::new_v4(),
                name: "Test Hotel".to_string(),
                address: "1 Test Road".to_string(),
                contact: "000".to_string(),
                city: city.to_string(),
                owner: None,
            },
        }
    }

    #[test]
    fn room_type_parses_labels() {
        assert_eq!("Luxury Room".parse::<RoomType>().unwrap(), RoomType::LuxuryRoom);
        assert_eq!("family suite".parse::<RoomType>().unwrap(), RoomType::FamilySuite);
        assert!("Penthouse".parse::<RoomType>().is_err());
    }

    #[test]
    fn price_ranges_are_inclusive() {
        assert!(PriceRange::Under2000.contains(Decimal::from(1999)));
        assert!(!PriceRange::Under2000.contains(Decimal::from(2000)));
        assert!(PriceRange::From2000To3999.contains(Decimal::from(2000)));
        assert!(PriceRange::From6000.contains(Decimal::from(12000)));
        assert_eq!("2000 to 3999".parse::<PriceRange>().unwrap(), PriceRange::From2000To3999);
    }

    #[test]
    fn filter_combines_type_price_and_destination() {
        let filter = RoomFilter {
            room_types: vec![RoomType::DoubleBed, RoomType::FamilySuite],
            price_ranges: vec![PriceRange::From2000To3999],
            destination: Some("mum".to_string()),
            sort: RoomSort::Newest,
        };

        assert!(filter.matches(&listing(RoomType::DoubleBed, 2500, "Mumbai", 1)));
        assert!(!filter.matches(&listing(RoomType::SingleBed, 2500, "Mumbai", 1)));
        assert!(!filter.matches(&listing(RoomType::DoubleBed, 4500, "Mumbai", 1)));
        assert!(!filter.matches(&listing(RoomType::DoubleBed, 2500, "Goa", 1)));
    }

    #[test]
    fn sorting_orders_by_price_or_recency() {
        let rooms = vec![
            listing(RoomType::SingleBed, 3000, "Goa", 3),
            listing(RoomType::SingleBed, 1000, "Goa", 1),
            listing(RoomType::SingleBed, 2000, "Goa", 2),
        ];

        let by_price = RoomFilter {
            sort: RoomSort::PriceAsc,
            ..RoomFilter::default()
        }
        .apply(rooms.clone());
        let prices: Vec<_> = by_price.iter().map(|l| l.room.price_per_night).collect();
        assert_eq!(prices, vec![Decimal::from(1000), Decimal::from(2000), Decimal::from(3000)]);

        let newest = RoomFilter::default().apply(rooms);
        let prices: Vec<_> = newest.iter().map(|l| l.room.price_per_night).collect();
        assert_eq!(prices, vec![Decimal::from(1000), Decimal::from(2000), Decimal::from(3000)]);
    }

    #[test]
    fn parse_list_skips_blanks_and_rejects_unknown() {
        let types: Vec<RoomType> = parse_list(Some("Single Bed, ,Double Bed")).unwrap();
        assert_eq!(types, vec![RoomType::SingleBed, RoomType::DoubleBed]);
        assert!(parse_list::<RoomType>(None).unwrap().is_empty());
        assert!(parse_list::<PriceRange>(Some("1-2")).is_err());
    }
}
