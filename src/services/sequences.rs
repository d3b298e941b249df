//! Human-readable document numbers, allocated inside the caller's transaction.

use crate::{db, entities::sequence, errors::ServiceError};
use chrono::{DateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseTransaction, EntityTrait, QuerySelect};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Sequence row numbering quotes.
pub const QUOTE_SEQUENCE: &str = "quote";
/// Sequence row numbering sales orders.
pub const SALES_ORDER_SEQUENCE: &str = "sales_order";

static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\{([a-z]+)\}").unwrap());

/// Issues the next number of `(table, company_id)` stamped with the current time.
pub async fn allocate(
    txn: &DatabaseTransaction,
    table: &str,
    company_id: Uuid,
    user_id: &str,
) -> Result<String, ServiceError> {
    allocate_at(txn, table, company_id, user_id, Utc::now()).await
}

/// Issues the next number of `(table, company_id)`, interpolating date tokens
/// against `now`.
///
/// The row is read for update so concurrent allocations serialize on it, and
/// the new counter is written before returning. Nothing is visible to other
/// callers until `txn` commits.
#[instrument(skip(txn))]
pub async fn allocate_at(
    txn: &DatabaseTransaction,
    table: &str,
    company_id: Uuid,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let mut query = sequence::Entity::find_by_id((table.to_string(), company_id));
    if db::supports_row_locks(txn) {
        query = query.lock_exclusive();
    }

    let row = query.one(txn).await.map_err(ServiceError::db_error)?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "sequence {} for company {} not found",
            table, company_id
        ))
    })?;

    let next_value = next_value(&row)?;
    let formatted = format_sequence(&row, next_value, now);

    let mut active: sequence::ActiveModel = row.into();
    active.next = Set(next_value);
    active.updated_by = Set(Some(user_id.to_string()));
    active.updated_at = Set(Some(now));
    active.update(txn).await.map_err(ServiceError::db_error)?;

    counter!("quoteflow_sequences.allocated", 1, "table" => table.to_string());
    debug!(table, %company_id, id = %formatted, "Sequence allocated");

    Ok(formatted)
}

fn next_value(row: &sequence::Model) -> Result<i64, ServiceError> {
    if row.next < 0 || row.step < 1 || row.size < 0 {
        return Err(ServiceError::InvariantViolation(format!(
            "sequence {} has next={}, step={}, size={}",
            row.table_name, row.next, row.step, row.size
        )));
    }
    row.next.checked_add(i64::from(row.step)).ok_or_else(|| {
        ServiceError::InvariantViolation(format!("sequence {} is exhausted", row.table_name))
    })
}

/// `prefix + zero_pad(value, size) + suffix`, with date tokens interpolated.
pub fn format_sequence(row: &sequence::Model, value: i64, now: DateTime<Utc>) -> String {
    let width = usize::try_from(row.size).unwrap_or(0);
    format!(
        "{}{:0width$}{}",
        interpolate(row.prefix.as_deref().unwrap_or_default(), now),
        value,
        interpolate(row.suffix.as_deref().unwrap_or_default(), now),
        width = width
    )
}

/// Replaces `%{yyyy}`, `%{yy}`, `%{mm}`, `%{dd}`, `%{hh}`, `%{mi}` and `%{ss}`
/// with parts of `now`. Any other token is kept as written.
pub fn interpolate(template: &str, now: DateTime<Utc>) -> String {
    DATE_TOKEN
        .replace_all(template, |caps: &Captures| {
            let pattern = match &caps[1] {
                "yyyy" => "%Y",
                "yy" => "%y",
                "mm" => "%m",
                "dd" => "%d",
                "hh" => "%H",
                "mi" => "%M",
                "ss" => "%S",
                _ => return caps[0].to_string(),
            };
            now.format(pattern).to_string()
        })
        .into_owned()
}
