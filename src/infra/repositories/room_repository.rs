//! Room repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::hotel::Entity as HotelEntity;
use super::entities::room::{self, ActiveModel, Entity as RoomEntity};
use crate::domain::{Hotel, NewRoom, Room};
use crate::errors::{storage_error, AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn create(&self, room: NewRoom) -> AppResult<Room>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>>;

    /// Room together with its hotel
    async fn find_with_hotel(&self, id: Uuid) -> AppResult<Option<(Room, Hotel)>>;

    /// Listed rooms (`is_available = true`) with hotels, newest first
    async fn list_available(&self) -> AppResult<Vec<(Room, Hotel)>>;

    /// Rooms belonging to any of the given hotels, newest first
    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<Room>>;

    /// Flip `is_available` in a single statement; `None` if the room is gone
    async fn toggle_availability(&self, id: Uuid) -> AppResult<Option<Room>>;
}

/// Concrete implementation of RoomRepository
pub struct RoomStore {
    db: DatabaseConnection,
}

impl RoomStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn with_hotel(pair: (room::Model, Option<super::entities::hotel::Model>)) -> AppResult<Option<(Room, Hotel)>> {
    match pair {
        (room, Some(hotel)) => Ok(Some((Room::try_from(room)?, Hotel::from(hotel)))),
        (room, None) => {
            tracing::warn!(room_id = %room.id, "Room references a missing hotel");
            Ok(None)
        }
    }
}

#[async_trait]
impl RoomRepository for RoomStore {
    async fn create(&self, room: NewRoom) -> AppResult<Room> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            hotel_id: Set(room.hotel_id),
            room_type: Set(room.room_type.as_str().to_string()),
            price_per_night: Set(room.price_per_night),
            amenities: Set(room.amenities),
            images: Set(room.images),
            is_available: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(storage_error)?;
        Ok(Room::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        RoomEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .map(Room::try_from)
            .transpose()
            .map_err(AppError::from)
    }

    async fn find_with_hotel(&self, id: Uuid) -> AppResult<Option<(Room, Hotel)>> {
        let result = RoomEntity::find_by_id(id)
            .find_also_related(HotelEntity)
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        match result {
            Some(pair) => with_hotel(pair),
            None => Ok(None),
        }
    }

    async fn list_available(&self) -> AppResult<Vec<(Room, Hotel)>> {
        let rows = RoomEntity::find()
            .filter(room::Column::IsAvailable.eq(true))
            .find_also_related(HotelEntity)
            .order_by_desc(room::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(pair) = with_hotel(row)? {
                listings.push(pair);
            }
        }
        Ok(listings)
    }

    async fn list_for_hotels(&self, hotel_ids: Vec<Uuid>) -> AppResult<Vec<Room>> {
        if hotel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = RoomEntity::find()
            .filter(room::Column::HotelId.is_in(hotel_ids))
            .order_by_desc(room::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        models
            .into_iter()
            .map(|m| Room::try_from(m).map_err(AppError::from))
            .collect()
    }

    async fn toggle_availability(&self, id: Uuid) -> AppResult<Option<Room>> {
        let result = RoomEntity::update_many()
            .col_expr(
                room::Column::IsAvailable,
                Expr::col(room::Column::IsAvailable).not(),
            )
            .col_expr(room::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(room::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }
}
