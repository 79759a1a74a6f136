use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(PriceHistory::Table)
                .if_not_exists()
                .col(ColumnDef::new(PriceHistory::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(PriceHistory::ProductId).uuid().not_null())
                .col(ColumnDef::new(PriceHistory::Price).decimal().not_null())
                .col(
                    ColumnDef::new(PriceHistory::CheckedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        // History is always read per product in checked_at order
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_price_history_product_id_checked_at")
                .table(PriceHistory::Table)
                .col(PriceHistory::ProductId)
                .col(PriceHistory::CheckedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PriceHistory::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum PriceHistory {
    Table,
    Id,
    ProductId,
    Price,
    CheckedAt,
}
