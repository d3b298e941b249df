use crate::models::QuoteStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Priced offer made to a customer.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Allocated document number.
    pub quote_id: String,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub customer_location_id: Option<Uuid>,
    pub customer_contact_id: Option<Uuid>,
    pub customer_reference: Option<String>,
    pub location_id: Option<Uuid>,
    pub sales_rfq_id: Option<Uuid>,
    pub opportunity_id: Uuid,
    pub status: QuoteStatus,
    pub currency_code: String,
    pub exchange_rate: Decimal,
    pub exchange_rate_updated_at: DateTime<Utc>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quote_line::Entity")]
    Lines,
}

impl Related<super::quote_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
