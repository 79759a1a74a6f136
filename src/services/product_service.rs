use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::decimal_from_f64;
use crate::db::entity::{ alert, price_point, product };
use crate::error::{ AppError, Result };
use crate::fetcher::PriceFetcher;

lazy_static! {
    // Every Amazon URL shape that carries the 10-character catalog id.
    static ref ASIN_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"/dp/([A-Z0-9]{10})").unwrap(),
        Regex::new(r"/gp/product/([A-Z0-9]{10})").unwrap(),
        Regex::new(r"/ASIN/([A-Z0-9]{10})").unwrap(),
        Regex::new(r"/product/([A-Z0-9]{10})").unwrap(),
    ];
}

pub fn extract_asin(url: &str) -> Option<String> {
    for pattern in ASIN_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(url) {
            return Some(caps[1].to_string());
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct RegisterProductRequest {
    pub url: String,
    pub user_email: Option<String>,
    pub target_price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub product: product::Model,
    pub alert: Option<alert::Model>,
    /// True when the URL resolved to a product that was already tracked;
    /// registration then only attaches the alert.
    pub already_tracked: bool,
}

#[derive(Debug, Clone)]
pub struct ProductDetails {
    pub product: product::Model,
    pub history: Vec<price_point::Model>,
    pub alerts: Vec<alert::Model>,
}

/// Registration and catalog queries. The check engine never creates
/// products; everything enters tracking through here.
pub struct ProductService {
    db: DatabaseConnection,
    fetcher: Arc<dyn PriceFetcher>,
}

impl ProductService {
    pub fn new(db: DatabaseConnection, fetcher: Arc<dyn PriceFetcher>) -> Self {
        Self { db, fetcher }
    }

    /// Track a new product URL, optionally subscribing an email. A URL
    /// whose ASIN is already tracked gets deduplicated onto the existing
    /// product row.
    pub async fn register(&self, req: RegisterProductRequest) -> Result<RegisterOutcome> {
        if req.url.trim().is_empty() {
            return Err(AppError::InvalidInput("Product URL is required".to_string()));
        }

        let asin = extract_asin(&req.url).ok_or_else(|| {
            AppError::InvalidInput("Invalid product URL. Could not extract ASIN.".to_string())
        })?;

        let existing = product::Entity
            ::find()
            .filter(product::Column::Asin.eq(&asin))
            .one(&self.db).await?;

        if let Some(existing) = existing {
            let alert = match &req.user_email {
                Some(email) => {
                    Some(self.create_alert(existing.id, email, req.target_price).await?)
                }
                None => None,
            };

            return Ok(RegisterOutcome {
                product: existing,
                alert,
                already_tracked: true,
            });
        }

        let listing = self.fetcher
            .fetch_listing(&req.url).await
            .map_err(|e| AppError::InvalidInput(format!("Could not fetch product page: {}", e)))?;

        let title = listing.title.ok_or_else(|| {
            AppError::InvalidInput(
                "Could not extract product details. The product may be unavailable or the URL is invalid.".to_string()
            )
        })?;

        let now = Utc::now();
        let product = product::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            asin: ActiveValue::Set(asin),
            url: ActiveValue::Set(req.url.clone()),
            title: ActiveValue::Set(title),
            image_url: ActiveValue::Set(listing.image_url),
            current_price: ActiveValue::Set(listing.price.map(decimal_from_f64).transpose()?),
            is_active: ActiveValue::Set(true),
            last_checked_at: ActiveValue::Set(Some(now)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        let product = product.insert(&self.db).await?;

        // Seed the series so the first check cycle has one observation
        if let Some(price) = listing.price {
            let point = price_point::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                product_id: ActiveValue::Set(product.id),
                price: ActiveValue::Set(decimal_from_f64(price)?),
                checked_at: ActiveValue::Set(now),
            };
            point.insert(&self.db).await?;
        }

        let alert = match &req.user_email {
            Some(email) => Some(self.create_alert(product.id, email, req.target_price).await?),
            None => None,
        };

        Ok(RegisterOutcome {
            product,
            alert,
            already_tracked: false,
        })
    }

    async fn create_alert(
        &self,
        product_id: Uuid,
        user_email: &str,
        target_price: Option<f64>
    ) -> Result<alert::Model> {
        let now = Utc::now();

        let alert = alert::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            product_id: ActiveValue::Set(product_id),
            user_email: ActiveValue::Set(user_email.to_string()),
            target_price: ActiveValue::Set(target_price.map(decimal_from_f64).transpose()?),
            // Without an explicit target the alert follows the prediction
            use_prediction: ActiveValue::Set(target_price.is_none()),
            predicted_price: ActiveValue::Set(None),
            is_active: ActiveValue::Set(true),
            notified_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let alert = alert.insert(&self.db).await?;
        Ok(alert)
    }

    /// All tracked products, newest first, with their alerts.
    pub async fn list_products(&self) -> Result<Vec<(product::Model, Vec<alert::Model>)>> {
        let products = product::Entity
            ::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(&self.db).await?;

        let mut listed = Vec::with_capacity(products.len());
        for product in products {
            let alerts = alert::Entity
                ::find()
                .filter(alert::Column::ProductId.eq(product.id))
                .all(&self.db).await?;
            listed.push((product, alerts));
        }

        Ok(listed)
    }

    /// One product with its full ascending price history and alerts.
    pub async fn product_details(&self, id: Uuid) -> Result<ProductDetails> {
        let product = product::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::ProductNotFound)?;

        let history = price_point::Entity
            ::find()
            .filter(price_point::Column::ProductId.eq(id))
            .order_by_asc(price_point::Column::CheckedAt)
            .all(&self.db).await?;

        let alerts = alert::Entity
            ::find()
            .filter(alert::Column::ProductId.eq(id))
            .all(&self.db).await?;

        Ok(ProductDetails {
            product,
            history,
            alerts,
        })
    }

    /// Stop checking a product. The row and its history stay; the engine
    /// only ever deactivates, never deletes.
    pub async fn deactivate_product(&self, id: Uuid) -> Result<()> {
        let product = product::Entity
            ::find_by_id(id)
            .one(&self.db).await?
            .ok_or(AppError::ProductNotFound)?;

        let mut active: product::ActiveModel = product.into();
        active.is_active = ActiveValue::Set(false);
        active.updated_at = ActiveValue::Set(Utc::now());
        active.update(&self.db).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_asin_dp_url() {
        let url = "https://www.amazon.com/Some-Product-Name/dp/B08N5WRWNW?ref=xyz";
        assert_eq!(extract_asin(url), Some("B08N5WRWNW".to_string()));
    }

    #[test]
    fn test_extract_asin_gp_product_url() {
        let url = "https://www.amazon.com/gp/product/B000123456";
        assert_eq!(extract_asin(url), Some("B000123456".to_string()));
    }

    #[test]
    fn test_extract_asin_plain_product_path() {
        let url = "https://www.amazon.com/product/B09ABCDEF1";
        assert_eq!(extract_asin(url), Some("B09ABCDEF1".to_string()));
    }

    #[test]
    fn test_extract_asin_rejects_other_urls() {
        assert_eq!(extract_asin("https://www.amazon.com/s?k=headphones"), None);
        assert_eq!(extract_asin("https://example.com/dp/tooshort"), None);
    }
}
