use crate::models::{ItemType, MethodType, ReplenishmentSystem};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item master record.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-readable id, unique per company.
    pub readable_id: String,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_type: ItemType,
    pub replenishment_system: ReplenishmentSystem,
    pub default_method_type: MethodType,
    pub unit_of_measure_code: Option<String>,
    /// Items created for a quote stay inactive until they are ordered.
    pub active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::part::Entity")]
    Parts,
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
