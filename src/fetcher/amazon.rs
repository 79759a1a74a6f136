use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE };

use super::{ FetchError, Listing, PriceFetcher };

lazy_static! {
    // Ordered fallback chain: the displayed whole-dollar price, the
    // screen-reader price, then the price embedded in page JSON.
    static ref PRICE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"<span[^>]*class="[^"]*a-price-whole[^"]*"[^>]*>([\d,]+)"#).unwrap(),
        Regex::new(r#"<span[^>]*class="[^"]*a-offscreen[^"]*">\$([\d,]+\.\d{2})"#).unwrap(),
        Regex::new(r#""price":"\$([\d,]+\.\d{2})""#).unwrap(),
    ];
    static ref TITLE_PATTERN: Regex =
        Regex::new(r#"<span[^>]*id="productTitle"[^>]*>([^<]+)</span>"#).unwrap();
    static ref IMAGE_PATTERN: Regex = Regex::new(r#""large":"([^"]+)""#).unwrap();
}

pub(crate) fn extract_price(html: &str) -> Option<f64> {
    for pattern in PRICE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(html) {
            let raw = caps[1].replace(',', "");
            if let Ok(price) = raw.parse::<f64>() {
                return Some(price);
            }
        }
    }
    None
}

pub(crate) fn extract_title(html: &str) -> Option<String> {
    TITLE_PATTERN.captures(html).map(|caps| caps[1].trim().to_string())
}

pub(crate) fn extract_image(html: &str) -> Option<String> {
    IMAGE_PATTERN.captures(html).map(|caps| caps[1].to_string())
}

/// Scrapes product pages on the Amazon storefront.
pub struct AmazonFetcher {
    client: reqwest::Client,
}

impl AmazonFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
            )
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        Self {
            client: reqwest::Client
                ::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .default_headers(headers)
                .build()
                .unwrap(),
        }
    }

    async fn fetch_page(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client
            .get(url)
            .send().await
            .map_err(|e| {
                if e.is_timeout() { FetchError::Timeout } else { FetchError::Network(e.to_string()) }
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        response.text().await.map_err(|e| FetchError::Network(e.to_string()))
    }
}

#[async_trait]
impl PriceFetcher for AmazonFetcher {
    async fn fetch_price(&self, url: &str) -> std::result::Result<f64, FetchError> {
        let html = self.fetch_page(url).await?;
        extract_price(&html).ok_or(FetchError::PriceNotFound)
    }

    async fn fetch_listing(&self, url: &str) -> std::result::Result<Listing, FetchError> {
        let html = self.fetch_page(url).await?;

        Ok(Listing {
            title: extract_title(&html),
            price: extract_price(&html),
            image_url: extract_image(&html),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_price_whole() {
        let html = r#"<span class="a-price-whole">1,299</span>"#;
        assert_eq!(extract_price(html), Some(1299.0));
    }

    #[test]
    fn test_extract_price_offscreen() {
        let html = r#"<span class="aok-offscreen a-offscreen">$24.99</span>"#;
        assert_eq!(extract_price(html), Some(24.99));
    }

    #[test]
    fn test_extract_price_embedded_json() {
        let html = r#"<script>{"price":"$1,049.95","available":true}</script>"#;
        assert_eq!(extract_price(html), Some(1049.95));
    }

    #[test]
    fn test_extract_price_pattern_precedence() {
        // The displayed whole-dollar price wins over the embedded one
        let html = concat!(
            r#"<span class="a-price-whole">89</span>"#,
            r#"{"price":"$120.00"}"#
        );
        assert_eq!(extract_price(html), Some(89.0));
    }

    #[test]
    fn test_extract_price_missing() {
        let html = "<html><body>Currently unavailable</body></html>";
        assert_eq!(extract_price(html), None);
    }

    #[test]
    fn test_extract_title_trims_whitespace() {
        let html = r#"<span id="productTitle" class="a-size-large">
            Wireless Headphones
        </span>"#;
        assert_eq!(extract_title(html), Some("Wireless Headphones".to_string()));
    }

    #[test]
    fn test_extract_image() {
        let html = r#""large":"https://m.media-amazon.com/images/I/foo.jpg""#;
        assert_eq!(
            extract_image(html),
            Some("https://m.media-amazon.com/images/I/foo.jpg".to_string())
        );
    }
}
