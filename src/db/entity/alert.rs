use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A subscription to price drops on one product. `target_price` takes
/// precedence over `predicted_price` when both are present.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_email: String,
    pub target_price: Option<Decimal>,
    pub use_prediction: bool,
    pub predicted_price: Option<Decimal>,
    pub is_active: bool,
    pub notified_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
