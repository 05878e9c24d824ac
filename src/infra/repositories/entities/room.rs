//! Room database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Room, RoomType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price_per_night: Decimal,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub is_available: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id"
    )]
    Hotel,
}

impl Related<super::hotel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hotel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Room {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let room_type: RoomType = model
            .room_type
            .parse()
            .map_err(|_| DbErr::Type(format!("unknown room type '{}'", model.room_type)))?;

        Ok(Room {
            id: model.id,
            hotel_id: model.hotel_id,
            room_type,
            price_per_night: model.price_per_night,
            amenities: model.amenities,
            images: model.images,
            is_available: model.is_available,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
