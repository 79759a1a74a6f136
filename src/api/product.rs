use axum::{ extract::{ Path, State }, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::db::decimal_to_f64;
use crate::db::entity::{ alert, price_point, product };
use crate::error::Result;
use crate::services::RegisterProductRequest;

use super::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub url: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub target_price: Option<f64>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub asin: String,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub current_price: Option<f64>,
    pub is_active: bool,
    pub last_checked_at: Option<String>,
    pub created_at: String,
}

impl ProductResponse {
    fn from_model(product: product::Model) -> Self {
        Self {
            id: product.id,
            asin: product.asin,
            title: product.title,
            url: product.url,
            image_url: product.image_url,
            current_price: product.current_price.and_then(decimal_to_f64),
            is_active: product.is_active,
            last_checked_at: product.last_checked_at.map(|t| t.to_rfc3339()),
            created_at: product.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AlertResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_email: String,
    pub target_price: Option<f64>,
    pub use_prediction: bool,
    pub predicted_price: Option<f64>,
    pub is_active: bool,
    pub notified_at: Option<String>,
}

impl AlertResponse {
    fn from_model(alert: alert::Model) -> Self {
        Self {
            id: alert.id,
            product_id: alert.product_id,
            user_email: alert.user_email,
            target_price: alert.target_price.and_then(decimal_to_f64),
            use_prediction: alert.use_prediction,
            predicted_price: alert.predicted_price.and_then(decimal_to_f64),
            is_active: alert.is_active,
            notified_at: alert.notified_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct PricePointResponse {
    pub price: f64,
    pub checked_at: String,
}

impl PricePointResponse {
    fn from_model(point: price_point::Model) -> Self {
        Self {
            price: decimal_to_f64(point.price).unwrap_or_default(),
            checked_at: point.checked_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub product: ProductResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertResponse>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>
) -> Result<Json<RegisterResponse>> {
    let outcome = state.product_service.register(RegisterProductRequest {
        url: request.url,
        user_email: request.user_email,
        target_price: request.target_price,
    }).await?;

    let message = match (outcome.already_tracked, outcome.alert.is_some()) {
        (true, true) => "Product already tracked. Alert added.",
        (true, false) => "Product already tracked.",
        _ => "Product added successfully",
    };

    Ok(
        Json(RegisterResponse {
            message: message.to_string(),
            product: ProductResponse::from_model(outcome.product),
            alert: outcome.alert.map(AlertResponse::from_model),
        })
    )
}

#[derive(Serialize)]
pub struct ListedProduct {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub alerts: Vec<AlertResponse>,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ListedProduct>,
}

pub async fn list_products(
    State(state): State<AppState>
) -> Result<Json<ProductListResponse>> {
    let products = state.product_service.list_products().await?;

    Ok(
        Json(ProductListResponse {
            products: products
                .into_iter()
                .map(|(product, alerts)| ListedProduct {
                    product: ProductResponse::from_model(product),
                    alerts: alerts.into_iter().map(AlertResponse::from_model).collect(),
                })
                .collect(),
        })
    )
}

#[derive(Serialize)]
pub struct ProductDetailsResponse {
    pub product: ProductResponse,
    pub price_history: Vec<PricePointResponse>,
    pub alerts: Vec<AlertResponse>,
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>
) -> Result<Json<ProductDetailsResponse>> {
    let details = state.product_service.product_details(product_id).await?;

    Ok(
        Json(ProductDetailsResponse {
            product: ProductResponse::from_model(details.product),
            price_history: details.history
                .into_iter()
                .map(PricePointResponse::from_model)
                .collect(),
            alerts: details.alerts.into_iter().map(AlertResponse::from_model).collect(),
        })
    )
}

#[derive(Serialize)]
pub struct DeactivateResponse {
    pub message: String,
}

pub async fn deactivate(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>
) -> Result<Json<DeactivateResponse>> {
    state.product_service.deactivate_product(product_id).await?;

    Ok(
        Json(DeactivateResponse {
            message: "Product deactivated".to_string(),
        })
    )
}
