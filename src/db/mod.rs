use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    prelude::Decimal,
};
use uuid::Uuid;

use crate::error::{ AppError, Result };

pub mod entity;
pub use entity::*;

/// Safely convert a Decimal to f64, returning None on parse failure
pub fn decimal_to_f64(d: Decimal) -> Option<f64> {
    d.to_string().parse::<f64>().ok()
}

/// Convert a scraped price to the Decimal stored in the database.
/// Fails only on non-finite input, which a fetcher never produces.
pub fn decimal_from_f64(value: f64) -> Result<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::InvalidInput(format!("Price is not representable: {}", value)))
}

/// Storage operations the check engine depends on. One implementation is
/// backed by sea-orm; tests substitute an in-memory store.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Active products in stable id order.
    async fn list_active_products(&self) -> Result<Vec<product::Model>>;

    /// Append one observation to a product's price history.
    async fn append_price_point(
        &self,
        product_id: Uuid,
        price: f64,
        checked_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()>;

    /// Record the latest observed price on the product row.
    async fn update_product_price(
        &self,
        product_id: Uuid,
        price: f64,
        checked_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()>;

    /// Full price history for a product, ascending by observation time.
    async fn list_price_history(&self, product_id: Uuid) -> Result<Vec<price_point::Model>>;

    async fn list_active_alerts(&self, product_id: Uuid) -> Result<Vec<alert::Model>>;

    /// Refresh the cached prediction on an alert.
    async fn set_predicted_price(&self, alert_id: Uuid, predicted_price: f64) -> Result<()>;

    /// Stamp the cooldown timestamp after a fire decision.
    async fn mark_notified(
        &self,
        alert_id: Uuid,
        notified_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlDatastore {
    db: DatabaseConnection,
}

impl SqlDatastore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Datastore for SqlDatastore {
    async fn list_active_products(&self) -> Result<Vec<product::Model>> {
        let products = product::Entity
            ::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_asc(product::Column::Id)
            .all(&self.db).await?;
        Ok(products)
    }

    async fn append_price_point(
        &self,
        product_id: Uuid,
        price: f64,
        checked_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()> {
        let point = price_point::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            product_id: ActiveValue::Set(product_id),
            price: ActiveValue::Set(decimal_from_f64(price)?),
            checked_at: ActiveValue::Set(checked_at),
        };

        point.insert(&self.db).await?;
        Ok(())
    }

    async fn update_product_price(
        &self,
        product_id: Uuid,
        price: f64,
        checked_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()> {
        let product = product::Entity::find_by_id(product_id).one(&self.db).await?;

        // A product deleted mid-cycle is not an error for the cycle.
        if let Some(product) = product {
            let mut active: product::ActiveModel = product.into();
            active.current_price = ActiveValue::Set(Some(decimal_from_f64(price)?));
            active.last_checked_at = ActiveValue::Set(Some(checked_at));
            active.updated_at = ActiveValue::Set(chrono::Utc::now());
            active.update(&self.db).await?;
        }

        Ok(())
    }

    async fn list_price_history(&self, product_id: Uuid) -> Result<Vec<price_point::Model>> {
        let points = price_point::Entity
            ::find()
            .filter(price_point::Column::ProductId.eq(product_id))
            .order_by_asc(price_point::Column::CheckedAt)
            .all(&self.db).await?;
        Ok(points)
    }

    async fn list_active_alerts(&self, product_id: Uuid) -> Result<Vec<alert::Model>> {
        let alerts = alert::Entity
            ::find()
            .filter(alert::Column::ProductId.eq(product_id))
            .filter(alert::Column::IsActive.eq(true))
            .all(&self.db).await?;
        Ok(alerts)
    }

    async fn set_predicted_price(&self, alert_id: Uuid, predicted_price: f64) -> Result<()> {
        let alert = alert::Entity::find_by_id(alert_id).one(&self.db).await?;

        if let Some(alert) = alert {
            let mut active: alert::ActiveModel = alert.into();
            active.predicted_price = ActiveValue::Set(Some(decimal_from_f64(predicted_price)?));
            active.updated_at = ActiveValue::Set(chrono::Utc::now());
            active.update(&self.db).await?;
        }

        Ok(())
    }

    async fn mark_notified(
        &self,
        alert_id: Uuid,
        notified_at: chrono::DateTime<chrono::Utc>
    ) -> Result<()> {
        let alert = alert::Entity::find_by_id(alert_id).one(&self.db).await?;

        if let Some(alert) = alert {
            let mut active: alert::ActiveModel = alert.into();
            active.notified_at = ActiveValue::Set(Some(notified_at));
            active.updated_at = ActiveValue::Set(chrono::Utc::now());
            active.update(&self.db).await?;
        }

        Ok(())
    }
}
