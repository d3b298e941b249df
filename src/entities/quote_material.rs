use crate::models::{ItemType, MethodType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_material")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub quote_line_id: Uuid,
    /// Make method this material is consumed by.
    pub quote_make_method_id: Uuid,
    pub item_id: Option<Uuid>,
    pub item_readable_id: Option<String>,
    pub description: String,
    pub method_type: MethodType,
    pub item_type: ItemType,
    /// Quantity per one unit of the parent.
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub sort_order: i32,
    pub company_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quote_make_method::Entity",
        from = "Column::QuoteMakeMethodId",
        to = "super::quote_make_method::Column::Id"
    )]
    MakeMethod,
}

impl Related<super::quote_make_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MakeMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
