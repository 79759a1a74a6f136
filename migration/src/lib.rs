pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_products_table;
mod m20250102_000001_create_price_history_table;
mod m20250103_000001_create_alerts_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_products_table::Migration),
            Box::new(m20250102_000001_create_price_history_table::Migration),
            Box::new(m20250103_000001_create_alerts_table::Migration)
        ]
    }
}
