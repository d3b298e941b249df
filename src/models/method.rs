use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a line or material is obtained.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MethodType {
    #[sea_orm(string_value = "Buy")]
    Buy,
    #[sea_orm(string_value = "Make")]
    Make,
    #[sea_orm(string_value = "Pick")]
    Pick,
}

impl MethodType {
    /// Replenishment system recorded on an item created for this method.
    pub fn replenishment_system(self) -> ReplenishmentSystem {
        match self {
            MethodType::Make => ReplenishmentSystem::Make,
            MethodType::Buy | MethodType::Pick => ReplenishmentSystem::Buy,
        }
    }

    /// Buy and Pick components are costed whole; their sub-materials are not.
    pub fn is_purchased(self) -> bool {
        !matches!(self, MethodType::Make)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ItemType {
    #[sea_orm(string_value = "Part")]
    Part,
    #[sea_orm(string_value = "Material")]
    Material,
    #[sea_orm(string_value = "Tool")]
    Tool,
    #[sea_orm(string_value = "Fixture")]
    Fixture,
    #[sea_orm(string_value = "Consumable")]
    Consumable,
    #[sea_orm(string_value = "Service")]
    Service,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OperationType {
    #[sea_orm(string_value = "Inside")]
    Inside,
    #[sea_orm(string_value = "Outside")]
    Outside,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ReplenishmentSystem {
    #[sea_orm(string_value = "Buy")]
    Buy,
    #[sea_orm(string_value = "Make")]
    Make,
}
