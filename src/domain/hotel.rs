//! Hotel domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::OwnerSummary;

/// Hotel registered by a hotel owner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "owner")]
    pub owner_id: String,
    #[schema(example = "Sea Breeze Inn")]
    pub name: String,
    #[schema(example = "12 Marine Drive")]
    pub address: String,
    #[schema(example = "+91 98765 43210")]
    pub contact: String,
    #[schema(example = "Mumbai")]
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hotel {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Data needed to register a hotel
#[derive(Debug, Clone)]
pub struct NewHotel {
    pub owner_id: String,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
}

/// Hotel with its owner's public profile, used in room listings
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelWithOwner {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
    pub owner: Option<OwnerSummary>,
}

impl HotelWithOwner {
    pub fn new(hotel: Hotel, owner: Option<OwnerSummary>) -> Self {
        Self {
            id: hotel.id,
            name: hotel.name,
            address: hotel.address,
            contact: hotel.contact,
            city: hotel.city,
            owner,
        }
    }
}
