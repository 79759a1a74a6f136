use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(ColumnDef::new(Products::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Products::Asin).string().not_null())
                .col(ColumnDef::new(Products::Url).string().not_null())
                .col(ColumnDef::new(Products::Title).string().not_null())
                .col(ColumnDef::new(Products::ImageUrl).string())
                .col(ColumnDef::new(Products::CurrentPrice).decimal())
                .col(ColumnDef::new(Products::IsActive).boolean().not_null().default(true))
                .col(ColumnDef::new(Products::LastCheckedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Create indexes
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_products_asin")
                .table(Products::Table)
                .col(Products::Asin)
                .unique()
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_products_is_active")
                .table(Products::Table)
                .col(Products::IsActive)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Products::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Asin,
    Url,
    Title,
    ImageUrl,
    CurrentPrice,
    IsActive,
    LastCheckedAt,
    CreatedAt,
    UpdatedAt,
}
