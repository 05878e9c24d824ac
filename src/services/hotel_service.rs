//! Hotel service - registration and owner listings.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DUPLICATE_HOTEL_MESSAGE;
use crate::domain::{Hotel, NewHotel, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HotelService: Send + Sync {
    /// Register a hotel and promote its owner to `hotelOwner`
    async fn register_hotel(&self, hotel: NewHotel) -> AppResult<Hotel>;

    /// Hotels of `owner_id`, newest first
    async fn owner_hotels(&self, owner_id: &str) -> AppResult<Vec<Hotel>>;
}

pub struct HotelManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> HotelManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> HotelService for HotelManager<U> {
    async fn register_hotel(&self, hotel: NewHotel) -> AppResult<Hotel> {
        let owner = self
            .uow
            .users()
            .find_by_id(&hotel.owner_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if self
            .uow
            .hotels()
            .find_by_owner_and_name(&owner.id, &hotel.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(DUPLICATE_HOTEL_MESSAGE));
        }

        let created = self.uow.hotels().create(hotel).await?;

        if !owner.is_owner() {
            self.uow
                .users()
                .set_role(&owner.id, UserRole::HotelOwner)
                .await?;
        }

        tracing::info!(hotel_id = %created.id, owner_id = %owner.id, "Hotel registered");
        Ok(created)
    }

    async fn owner_hotels(&self, owner_id: &str) -> AppResult<Vec<Hotel>> {
        self.uow.hotels().list_for_owner(owner_id).await
    }
}
