use crate::models::MethodType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_rfq_line")]
pub struct Model {
    /// Carried over as the id of the quote line created from this line.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sales_rfq_id: Uuid,
    pub company_id: Uuid,
    /// Unset until the line is matched to, or creates, an item.
    pub item_id: Option<Uuid>,
    pub customer_part_id: String,
    pub customer_part_revision: Option<String>,
    pub description: Option<String>,
    /// Requested quantity tiers, a JSON array of numbers.
    pub quantity: Json,
    pub unit_of_measure_code: Option<String>,
    pub method_type: MethodType,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_rfq::Entity",
        from = "Column::SalesRfqId",
        to = "super::sales_rfq::Column::Id"
    )]
    SalesRfq,
}

impl Related<super::sales_rfq::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesRfq.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
