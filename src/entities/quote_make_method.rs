use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A Make node of a quote line's method tree. The root has no parent material;
/// every other make method belongs to the Make material that produces it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_make_method")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub quote_line_id: Uuid,
    pub parent_material_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub company_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quote_material::Entity")]
    Materials,
    #[sea_orm(has_many = "super::quote_operation::Entity")]
    Operations,
}

impl Related<super::quote_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Materials.def()
    }
}

impl Related<super::quote_operation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
