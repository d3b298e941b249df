use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-company document number counter, keyed by the document table it serves.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sequence")]
pub struct Model {
    /// Document table this counter numbers, e.g. `quote` or `sales_order`.
    #[sea_orm(primary_key, auto_increment = false, column_name = "table")]
    pub table_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: Uuid,
    /// Date template placed before the number, e.g. `Q%{yy}-`.
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Last value issued. Only ever increases.
    pub next: i64,
    /// Zero-pad width of the numeric part.
    pub size: i32,
    pub step: i32,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
