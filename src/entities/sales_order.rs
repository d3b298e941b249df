use crate::models::SalesOrderStatus;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Allocated document number.
    pub sales_order_id: String,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub customer_location_id: Option<Uuid>,
    pub customer_contact_id: Option<Uuid>,
    pub customer_reference: Option<String>,
    pub location_id: Option<Uuid>,
    pub quote_id: Uuid,
    pub opportunity_id: Uuid,
    pub status: SalesOrderStatus,
    pub currency_code: String,
    pub exchange_rate: Decimal,
    pub exchange_rate_updated_at: DateTime<Utc>,
    pub order_date: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales_order_line::Entity")]
    Lines,
}

impl Related<super::sales_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
