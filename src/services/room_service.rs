//! Room service - catalogue, owner rooms and the listing switch.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use crate::config::{MAX_ROOM_IMAGES, NO_HOTEL_MESSAGE, PRICE_PER_NIGHT_LIMIT};
use crate::domain::{
    Hotel, HotelWithOwner, NewRoom, OwnerSummary, Room, RoomFilter, RoomListing, RoomType,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{ImageStore, ImageUpload, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Room creation request with images not yet uploaded
#[derive(Debug, Clone)]
pub struct RoomDraft {
    pub owner_id: String,
    /// Target hotel; the owner's oldest hotel when omitted
    pub hotel_id: Option<Uuid>,
    pub room_type: RoomType,
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub images: Vec<ImageUpload>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomService: Send + Sync {
    /// Upload the images and store the room under the owner's hotel
    async fn create_room(&self, draft: RoomDraft) -> AppResult<Room>;

    /// Publicly listed rooms matching `filter`
    async fn list_rooms(&self, filter: RoomFilter) -> AppResult<Vec<RoomListing>>;

    /// Rooms across every hotel of `owner_id`, newest first
    async fn owner_rooms(&self, owner_id: &str) -> AppResult<Vec<RoomListing>>;

    /// One room with its hotel and owner
    async fn room_details(&self, room_id: Uuid) -> AppResult<RoomListing>;

    /// Flip the listing switch of a room the caller owns
    async fn toggle_availability(&self, room_id: Uuid, owner_id: &str) -> AppResult<Room>;
}

pub struct RoomManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: Arc<dyn ImageStore>,
}

impl<U: UnitOfWork> RoomManager<U> {
    pub fn new(uow: Arc<U>, images: Arc<dyn ImageStore>) -> Self {
        Self { uow, images }
    }

    async fn resolve_hotel(&self, owner_id: &str, hotel_id: Option<Uuid>) -> AppResult<Hotel> {
        let hotel = match hotel_id {
            Some(id) => self
                .uow
                .hotels()
                .find_by_id(id)
                .await?
                .filter(|h| h.is_owned_by(owner_id)),
            // newest first, so the oldest is last
            None => self.uow.hotels().list_for_owner(owner_id).await?.pop(),
        };

        hotel.ok_or_else(|| AppError::NotFound(NO_HOTEL_MESSAGE.to_string()))
    }

    async fn owner_summaries(&self, owner_ids: Vec<String>) -> AppResult<HashMap<String, OwnerSummary>> {
        let owners = self.uow.users().find_many(owner_ids).await?;
        Ok(owners
            .into_iter()
            .map(|u| (u.id.clone(), OwnerSummary::from(u)))
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> RoomService for RoomManager<U> {
    async fn create_room(&self, draft: RoomDraft) -> AppResult<Room> {
        let price_per_night = draft.price_per_night.round_dp(2);
        if price_per_night <= Decimal::ZERO {
            return Err(AppError::validation("Price per night must be positive"));
        }
        if price_per_night >= Decimal::from(PRICE_PER_NIGHT_LIMIT) {
            return Err(AppError::validation("Price per night is too large"));
        }
        if draft.images.is_empty() {
            return Err(AppError::validation("At least one room image is required"));
        }
        if draft.images.len() > MAX_ROOM_IMAGES {
            return Err(AppError::validation(format!(
                "At most {} images are allowed",
                MAX_ROOM_IMAGES
            )));
        }

        let hotel = self.resolve_hotel(&draft.owner_id, draft.hotel_id).await?;

        let uploads: Vec<_> = draft
            .images
            .into_iter()
            .map(|image| self.images.upload(image))
            .collect();
        let urls = parallel::join_all(uploads).await.map_err(|e| match e {
            AppError::ExternalService(_) => e,
            other => AppError::external(format!("image upload failed: {}", other)),
        })?;

        let room = self
            .uow
            .rooms()
            .create(NewRoom {
                hotel_id: hotel.id,
                room_type: draft.room_type,
                price_per_night,
                amenities: draft.amenities,
                images: urls,
            })
            .await?;

        tracing::info!(room_id = %room.id, hotel_id = %hotel.id, "Room created");
        Ok(room)
    }

    async fn list_rooms(&self, filter: RoomFilter) -> AppResult<Vec<RoomListing>> {
        let rooms = self.uow.rooms().list_available().await?;

        let mut owner_ids: Vec<String> = rooms.iter().map(|(_, h)| h.owner_id.clone()).collect();
        owner_ids.sort();
        owner_ids.dedup();
        let owners = self.owner_summaries(owner_ids).await?;

        let listings = rooms
            .into_iter()
            .map(|(room, hotel)| {
                let owner = owners.get(&hotel.owner_id).cloned();
                RoomListing {
                    room,
                    hotel: HotelWithOwner::new(hotel, owner),
                }
            })
            .collect();

        Ok(filter.apply(listings))
    }

    async fn owner_rooms(&self, owner_id: &str) -> AppResult<Vec<RoomListing>> {
        let hotels = self.uow.hotels().list_for_owner(owner_id).await?;
        if hotels.is_empty() {
            return Err(AppError::NotFound(NO_HOTEL_MESSAGE.to_string()));
        }

        let owner = self
            .uow
            .users()
            .find_by_id(owner_id)
            .await?
            .map(OwnerSummary::from);
        let hotels: HashMap<Uuid, Hotel> = hotels.into_iter().map(|h| (h.id, h)).collect();
        let rooms = self
            .uow
            .rooms()
            .list_for_hotels(hotels.keys().copied().collect())
            .await?;

        let mut listings: Vec<RoomListing> = rooms
            .into_iter()
            .filter_map(|room| {
                let hotel = hotels.get(&room.hotel_id)?.clone();
                Some(RoomListing {
                    room,
                    hotel: HotelWithOwner::new(hotel, owner.clone()),
                })
            })
            .collect();
        listings.sort_by(|a, b| b.room.created_at.cmp(&a.room.created_at));

        Ok(listings)
    }

    async fn room_details(&self, room_id: Uuid) -> AppResult<RoomListing> {
        let (room, hotel) = self
            .uow
            .rooms()
            .find_with_hotel(room_id)
            .await?
            .ok_or_not_found("Room")?;

        let owner = self
            .uow
            .users()
            .find_by_id(&hotel.owner_id)
            .await?
            .map(OwnerSummary::from);

        Ok(RoomListing {
            room,
            hotel: HotelWithOwner::new(hotel, owner),
        })
    }

    async fn toggle_availability(&self, room_id: Uuid, owner_id: &str) -> AppResult<Room> {
        let (_, hotel) = self
            .uow
            .rooms()
            .find_with_hotel(room_id)
            .await?
            .ok_or_not_found("Room")?;

        if !hotel.is_owned_by(owner_id) {
            tracing::warn!(room_id = %room_id, user_id = %owner_id, "Toggle by non-owner rejected");
            return Err(AppError::Forbidden);
        }

        let room = self
            .uow
            .rooms()
            .toggle_availability(room_id)
            .await?
            .ok_or_not_found("Room")?;

        tracing::info!(room_id = %room.id, is_available = room.is_available, "Room availability toggled");
        Ok(room)
    }
}
