use crate::{entities::customer_part_to_item, errors::ServiceError};
use sea_orm::{sea_query::OnConflict, ActiveValue::Set, DatabaseTransaction, EntityTrait};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// A customer part number observed on a converted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPartLink {
    pub customer_id: Uuid,
    pub item_id: Uuid,
    pub customer_part_id: String,
    pub customer_part_revision: Option<String>,
}

/// Records each link, overwriting the part number and revision already
/// stored for the same `(customer_id, item_id)`. When a batch names the same
/// pair twice, the later link wins.
pub async fn upsert_customer_parts(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    links: impl IntoIterator<Item = CustomerPartLink>,
) -> Result<(), ServiceError> {
    let deduped: BTreeMap<(Uuid, Uuid), CustomerPartLink> = links
        .into_iter()
        .filter(|link| !link.customer_part_id.trim().is_empty())
        .map(|link| ((link.customer_id, link.item_id), link))
        .collect();

    if deduped.is_empty() {
        return Ok(());
    }

    let count = deduped.len();
    let models = deduped
        .into_values()
        .map(|link| customer_part_to_item::ActiveModel {
            customer_id: Set(link.customer_id),
            item_id: Set(link.item_id),
            customer_part_id: Set(link.customer_part_id),
            customer_part_revision: Set(link.customer_part_revision),
            company_id: Set(company_id),
        });

    customer_part_to_item::Entity::insert_many(models)
        .on_conflict(
            OnConflict::columns([
                customer_part_to_item::Column::CustomerId,
                customer_part_to_item::Column::ItemId,
            ])
            .update_columns([
                customer_part_to_item::Column::CustomerPartId,
                customer_part_to_item::Column::CustomerPartRevision,
            ])
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await
        .map_err(ServiceError::db_error)?;

    debug!(count, "Customer part cross references upserted");
    Ok(())
}
