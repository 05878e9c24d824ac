//! Booking database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Booking, BookingStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub room_id: Uuid,
    pub hotel_id: Uuid,
    pub check_in_date: DateTimeUtc,
    pub check_out_date: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_price: Decimal,
    pub guests: i32,
    pub status: String,
    pub payment_method: String,
    pub is_paid: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    #[sea_orm(
        belongs_to = "super::hotel::Entity",
        from = "Column::HotelId",
        to = "super::hotel::Column::Id"
    )]
    Hotel,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(model: Model) -> Self {
        Booking {
            id: model.id,
            user_id: model.user_id,
            room_id: model.room_id,
            hotel_id: model.hotel_id,
            check_in_date: model.check_in_date,
            check_out_date: model.check_out_date,
            total_price: model.total_price,
            guests: model.guests,
            status: BookingStatus::from(model.status.as_str()),
            payment_method: model.payment_method,
            is_paid: model.is_paid,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
