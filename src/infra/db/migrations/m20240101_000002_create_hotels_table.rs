//! Migration: Create hotels table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hotels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hotels::Id).uuid().not_null().primary_key())
                    // no FK: user mirrors can be deleted by identity events
                    .col(ColumnDef::new(Hotels::OwnerId).string().not_null())
                    .col(ColumnDef::new(Hotels::Name).string().not_null())
                    .col(ColumnDef::new(Hotels::Address).string().not_null())
                    .col(ColumnDef::new(Hotels::Contact).string().not_null())
                    .col(ColumnDef::new(Hotels::City).string().not_null())
                    .col(
                        ColumnDef::new(Hotels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Hotels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hotels_owner_name")
                    .table(Hotels::Table)
                    .col(Hotels::OwnerId)
                    .col(Hotels::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hotels::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Hotels {
    Table,
    Id,
    OwnerId,
    Name,
    Address,
    Contact,
    City,
    CreatedAt,
    UpdatedAt,
}
