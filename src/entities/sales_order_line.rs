use crate::models::MethodType;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_order_line")]
pub struct Model {
    /// Same as the quote line it was ordered from.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sales_order_id: Uuid,
    pub company_id: Uuid,
    pub item_id: Uuid,
    pub description: Option<String>,
    pub method_type: MethodType,
    pub unit_of_measure_code: Option<String>,
    pub sale_quantity: Decimal,
    pub unit_price: Decimal,
    pub converted_unit_price: Decimal,
    pub add_on_cost: Decimal,
    pub converted_add_on_cost: Decimal,
    pub promised_date: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_order::Entity",
        from = "Column::SalesOrderId",
        to = "super::sales_order::Column::Id"
    )]
    SalesOrder,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
