use crate::models::OperationType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_operation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub quote_line_id: Uuid,
    pub quote_make_method_id: Uuid,
    pub description: Option<String>,
    pub operation_type: OperationType,
    pub setup_hours: Decimal,
    pub production_standard: Decimal,
    /// Unit of `production_standard`, e.g. `Hours/Piece` or `Pieces/Minute`.
    pub standard_factor: String,
    pub labor_rate: Decimal,
    pub overhead_rate: Decimal,
    pub quoting_rate: Option<Decimal>,
    pub operation_minimum_cost: Decimal,
    pub operation_unit_cost: Decimal,
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
