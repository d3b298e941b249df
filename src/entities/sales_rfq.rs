use crate::models::SalesRfqStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inbound customer request for quotation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_rfq")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rfq_id: String,
    pub company_id: Uuid,
    pub customer_id: Uuid,
    pub customer_location_id: Option<Uuid>,
    pub customer_contact_id: Option<Uuid>,
    pub customer_reference: Option<String>,
    /// Shipping location of the company
    pub location_id: Option<Uuid>,
    pub opportunity_id: Uuid,
    pub status: SalesRfqStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sales_rfq_line::Entity")]
    Lines,
}

impl Related<super::sales_rfq_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
