pub mod trend;
pub mod alert_evaluator;
pub mod check_engine;
pub mod product_service;

pub use check_engine::{ CheckResult, CycleReport, PriceCheckEngine };
pub use product_service::{ ProductService, RegisterProductRequest };
