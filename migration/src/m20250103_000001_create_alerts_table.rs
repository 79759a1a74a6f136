use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Alerts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Alerts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Alerts::ProductId).uuid().not_null())
                .col(ColumnDef::new(Alerts::UserEmail).string().not_null())
                .col(ColumnDef::new(Alerts::TargetPrice).decimal())
                .col(ColumnDef::new(Alerts::UsePrediction).boolean().not_null().default(false))
                .col(ColumnDef::new(Alerts::PredictedPrice).decimal())
                .col(ColumnDef::new(Alerts::IsActive).boolean().not_null().default(true))
                .col(ColumnDef::new(Alerts::NotifiedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Alerts::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(Alerts::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Create indexes
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alerts_product_id")
                .table(Alerts::Table)
                .col(Alerts::ProductId)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alerts_is_active")
                .table(Alerts::Table)
                .col(Alerts::IsActive)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Alerts::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum Alerts {
    Table,
    Id,
    ProductId,
    UserEmail,
    TargetPrice,
    UsePrediction,
    PredictedPrice,
    IsActive,
    NotifiedAt,
    CreatedAt,
    UpdatedAt,
}
