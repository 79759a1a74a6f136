use async_trait::async_trait;
use thiserror::Error;

use crate::db::entity::{ alert, product };

mod email;
pub use email::EmailNotifier;

/// Delivery failures are logged by the engine, never escalated; the
/// cooldown is stamped on the fire decision either way.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Email API error: {0}")] Api(String),

    #[error("Network error: {0}")] Network(String),
}

/// Delivers a formatted price-drop notification to a destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        destination: &str,
        product: &product::Model,
        alert: &alert::Model,
        current_price: f64
    ) -> std::result::Result<(), DeliveryError>;
}
