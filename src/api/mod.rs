use std::sync::Arc;

pub mod product;
pub mod check;

use crate::services::{ PriceCheckEngine, ProductService };

#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<ProductService>,
    pub engine: Arc<PriceCheckEngine>,
}

impl AppState {
    pub fn new(product_service: Arc<ProductService>, engine: Arc<PriceCheckEngine>) -> Self {
        Self {
            product_service,
            engine,
        }
    }
}
