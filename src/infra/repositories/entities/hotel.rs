//! Hotel database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Hotel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "hotels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room::Entity")]
    Room,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Hotel {
    fn from(model: Model) -> Self {
        Hotel {
            id: model.id,
            owner_id: model.owner_id,
            name: model.name,
            address: model.address,
            contact: model.contact,
            city: model.city,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
