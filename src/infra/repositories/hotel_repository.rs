//! Hotel repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::hotel::{self, ActiveModel, Entity as HotelEntity};
use crate::domain::{Hotel, NewHotel};
use crate::config::DUPLICATE_HOTEL_MESSAGE;
use crate::errors::{insert_error, storage_error, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Fails with `Conflict` when the owner already has a hotel of that name
    async fn create(&self, hotel: NewHotel) -> AppResult<Hotel>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hotel>>;

    /// Exact-name lookup used to keep names unique per owner
    async fn find_by_owner_and_name(&self, owner_id: &str, name: &str) -> AppResult<Option<Hotel>>;

    /// Hotels of an owner, newest first
    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<Hotel>>;

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Hotel>>;
}

/// Concrete implementation of HotelRepository
pub struct HotelStore {
    db: DatabaseConnection,
}

impl HotelStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HotelRepository for HotelStore {
    async fn create(&self, hotel: NewHotel) -> AppResult<Hotel> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(hotel.owner_id),
            name: Set(hotel.name),
            address: Set(hotel.address),
            contact: Set(hotel.contact),
            city: Set(hotel.city),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // the (owner_id, name) index settles concurrent registrations
        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| insert_error(e, DUPLICATE_HOTEL_MESSAGE))?;
        Ok(Hotel::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        let result = HotelEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.map(Hotel::from))
    }

    async fn find_by_owner_and_name(&self, owner_id: &str, name: &str) -> AppResult<Option<Hotel>> {
        let result = HotelEntity::find()
            .filter(hotel::Column::OwnerId.eq(owner_id))
            .filter(hotel::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.map(Hotel::from))
    }

    async fn list_for_owner(&self, owner_id: &str) -> AppResult<Vec<Hotel>> {
        let models = HotelEntity::find()
            .filter(hotel::Column::OwnerId.eq(owner_id))
            .order_by_desc(hotel::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(models.into_iter().map(Hotel::from).collect())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Hotel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = HotelEntity::find()
            .filter(hotel::Column::Id.is_in(ids))
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(models.into_iter().map(Hotel::from).collect())
    }
}
