use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links the RFQ, quote and sales order of one commercial pursuit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opportunity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub sales_rfq_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    pub sales_order_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
