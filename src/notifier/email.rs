use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::db::decimal_to_f64;
use crate::db::entity::{ alert, product };

use super::{ DeliveryError, Notifier };

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const SUBJECT_TITLE_LEN: usize = 50;

/// Sends price-drop emails through the Resend HTTP API.
pub struct EmailNotifier {
    client: reqwest::Client,
    api_key: Option<String>,
    from_address: String,
}

impl EmailNotifier {
    pub fn new(api_key: Option<String>, from_address: String) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            api_key,
            from_address,
        }
    }
}

fn subject_for(product: &product::Model) -> String {
    let mut title: String = product.title.chars().take(SUBJECT_TITLE_LEN).collect();
    if product.title.chars().count() > SUBJECT_TITLE_LEN {
        title.push_str("...");
    }
    format!("Price Drop Alert: {}", title)
}

/// Percentage saved against the explicit target, when one exists.
fn savings_percent(alert: &alert::Model, current_price: f64) -> Option<f64> {
    let target = alert.target_price.and_then(decimal_to_f64)?;
    if target <= 0.0 {
        return None;
    }
    let savings = ((target - current_price) / target) * 100.0;
    if savings > 0.0 { Some(savings) } else { None }
}

fn render_email(product: &product::Model, alert: &alert::Model, current_price: f64) -> String {
    let image = product.image_url
        .as_deref()
        .map(|src| format!(r#"<img src="{}" alt="Product" width="200">"#, src))
        .unwrap_or_default();

    let target_line = alert.target_price
        .and_then(decimal_to_f64)
        .map(|t| format!("<p>Your target: ${:.2}</p>", t))
        .unwrap_or_default();

    let savings_line = savings_percent(alert, current_price)
        .map(|s| format!("<p><strong>Save {:.1}% - Buy Now!</strong></p>", s))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\
         <html><body>\
         <h1>Price Drop Alert!</h1>\
         <p>Your tracked product is now at your target price.</p>\
         {image}\
         <h2>{title}</h2>\
         <p>Current price: <strong>${price:.2}</strong></p>\
         {target_line}\
         {savings_line}\
         <p><a href=\"{url}\">Buy Now on Amazon</a></p>\
         <p>You're receiving this because you set up a price alert. ASIN: {asin}</p>\
         </body></html>",
        image = image,
        title = product.title,
        price = current_price,
        target_line = target_line,
        savings_line = savings_line,
        url = product.url,
        asin = product.asin,
    )
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(
        &self,
        destination: &str,
        product: &product::Model,
        alert: &alert::Model,
        current_price: f64
    ) -> std::result::Result<(), DeliveryError> {
        let api_key = self.api_key.as_ref().ok_or(DeliveryError::NotConfigured)?;

        let payload =
            json!({
            "from": self.from_address,
            "to": [destination],
            "subject": subject_for(product),
            "html": render_email(product, alert, current_price),
        });

        let response = self.client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send().await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api(format!("status {}: {}", status, body)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::prelude::Decimal;
    use uuid::Uuid;

    fn sample_product(title: &str) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            asin: "B01EXAMPLE".to_string(),
            url: "https://www.amazon.com/dp/B01EXAMPLE".to_string(),
            title: title.to_string(),
            image_url: None,
            current_price: None,
            is_active: true,
            last_checked_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_alert(target_price: Option<f64>) -> alert::Model {
        alert::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            user_email: "buyer@example.com".to_string(),
            target_price: target_price.map(|t| Decimal::from_f64_retain(t).unwrap()),
            use_prediction: false,
            predicted_price: None,
            is_active: true,
            notified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subject_truncates_long_titles() {
        let long_title = "x".repeat(80);
        let subject = subject_for(&sample_product(&long_title));

        assert!(subject.ends_with("..."));
        assert_eq!(subject, format!("Price Drop Alert: {}...", "x".repeat(50)));
    }

    #[test]
    fn test_subject_keeps_short_titles() {
        let subject = subject_for(&sample_product("USB-C Cable"));
        assert_eq!(subject, "Price Drop Alert: USB-C Cable");
    }

    #[test]
    fn test_savings_against_explicit_target() {
        let alert = sample_alert(Some(100.0));
        let savings = savings_percent(&alert, 85.0).unwrap();
        assert!((savings - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_savings_without_target() {
        let alert = sample_alert(None);
        assert_eq!(savings_percent(&alert, 85.0), None);
    }

    #[test]
    fn test_render_email_includes_price_and_link() {
        let product = sample_product("Mechanical Keyboard");
        let alert = sample_alert(Some(90.0));
        let html = render_email(&product, &alert, 79.99);

        assert!(html.contains("Mechanical Keyboard"));
        assert!(html.contains("$79.99"));
        assert!(html.contains("Your target: $90.00"));
        assert!(html.contains(&product.url));
    }
}
