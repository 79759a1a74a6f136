use async_trait::async_trait;
use thiserror::Error;

mod amazon;
pub use amazon::AmazonFetcher;

/// Why a page fetch produced no price. All variants are recoverable;
/// the engine records them and moves on to the next product.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")] Network(String),

    #[error("Source returned status: {0}")] Http(u16),

    #[error("No price found in page")]
    PriceNotFound,
}

/// Product details scraped during registration.
#[derive(Debug, Clone)]
pub struct Listing {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

/// A source of current prices for tracked product pages. Implementations
/// are marketplace-specific and flaky by default: an unreachable page or
/// unparseable markup is a `FetchError`, never a panic.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Current price for a product page.
    async fn fetch_price(&self, url: &str) -> std::result::Result<f64, FetchError>;

    /// Title / price / image for a page, used when registering a product.
    async fn fetch_listing(&self, url: &str) -> std::result::Result<Listing, FetchError>;
}
