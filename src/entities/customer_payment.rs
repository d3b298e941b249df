use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment defaults copied onto new quotes for a customer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub customer_id: Uuid,
    pub company_id: Uuid,
    pub invoice_customer_id: Option<Uuid>,
    pub invoice_customer_location_id: Option<Uuid>,
    pub invoice_customer_contact_id: Option<Uuid>,
    pub payment_term_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
