use crate::models::MethodType;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_line")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub customer_part_id: Option<String>,
    pub customer_part_revision: Option<String>,
    pub description: Option<String>,
    /// Quantity tiers, a JSON array of numbers.
    pub quantity: Json,
    pub unit_of_measure_code: Option<String>,
    pub method_type: MethodType,
    /// Cost per unit used when the line has no method tree.
    pub unit_cost: Decimal,
    /// `{ chargeId: { description, amounts: { quantity: amount } } }`
    pub additional_charges: Json,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quote::Entity",
        from = "Column::QuoteId",
        to = "super::quote::Column::Id"
    )]
    Quote,
    #[sea_orm(has_many = "super::quote_line_price::Entity")]
    Prices,
}

impl Related<super::quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quote.def()
    }
}

impl Related<super::quote_line_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Prices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
