//! User domain entity and related types.
//!
//! Users mirror identities issued by Clerk; the id is the provider's user id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{DEFAULT_USERNAME, MAX_RECENT_SEARCHED_CITIES, ROLE_GUEST, ROLE_HOTEL_OWNER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    Guest,
    HotelOwner,
}

impl UserRole {
    pub fn is_owner(&self) -> bool {
        matches!(self, UserRole::HotelOwner)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Guest => ROLE_GUEST,
            UserRole::HotelOwner => ROLE_HOTEL_OWNER,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_HOTEL_OWNER => UserRole::HotelOwner,
            _ => UserRole::Guest,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    #[schema(example = "user_2aBcDeFgHiJkLmNoP")]
    pub id: String,
    #[schema(example = "guest@example.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub username: String,
    pub image: String,
    pub role: UserRole,
    pub recent_searched_cities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}

/// Return `cities` with `city` appended as most recent.
///
/// Case-insensitive duplicates are moved to the end and the list is capped
/// at `MAX_RECENT_SEARCHED_CITIES`, evicting the oldest.
pub fn push_recent_city(cities: &[String], city: &str) -> Vec<String> {
    let city = city.trim();
    if city.is_empty() {
        return cities.to_vec();
    }

    let mut updated: Vec<String> = cities
        .iter()
        .filter(|c| !c.eq_ignore_ascii_case(city))
        .cloned()
        .collect();
    updated.push(city.to_string());

    let overflow = updated.len().saturating_sub(MAX_RECENT_SEARCHED_CITIES);
    updated.drain(..overflow);
    updated
}

/// Profile fields supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub image: String,
}

impl IdentityProfile {
    /// Build a profile, deriving the display name from first/last names.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        image: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            username: display_name(first_name, last_name),
            image: image.unwrap_or_default().to_string(),
        }
    }
}

/// `"first last"` trimmed, or the default name when both are blank.
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let joined = format!(
        "{} {}",
        first_name.unwrap_or_default(),
        last_name.unwrap_or_default()
    );
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Identity lifecycle event received from the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// `user.created` or `user.updated`
    Upserted(IdentityProfile),
    /// `user.deleted`
    Deleted(String),
    /// Any other event type, kept for logging
    Ignored(String),
}

/// Owner details embedded in room listings
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub image: String,
}

impl From<User> for OwnerSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            image: user.image,
        }
    }
}

/// Guest details embedded in owner dashboards
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub image: String,
}

impl From<User> for GuestSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image: user.image,
        }
    }
}

/// Profile response for the signed-in user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = "hotelOwner")]
    pub role: UserRole,
    pub recent_searched_cities: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            role: user.role,
            recent_searched_cities: user.recent_searched_cities,
        }
    }
}
