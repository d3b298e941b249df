use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipping defaults copied onto new quotes for a customer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_shipping")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub shipping_method_id: Option<Uuid>,
    pub shipping_term_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
