use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One pricing tier of a quote line. Unique on `(quote_line_id, quantity)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_line_price")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub quote_line_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Fraction, 0.1 is ten percent.
    pub discount_percent: Decimal,
    /// Days
    pub lead_time: i32,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quote_line::Entity",
        from = "Column::QuoteLineId",
        to = "super::quote_line::Column::Id"
    )]
    QuoteLine,
}

impl Related<super::quote_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuoteLine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
