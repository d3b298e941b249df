use super::{
    readable_ids::{assign_readable_ids, readable_id_candidate},
    spawn_method_copies, upsert_customer_parts, ConversionService, CustomerPartLink,
    MethodCopyRequest,
};
use crate::{
    db,
    entities::{
        company, currency, customer, customer_payment, customer_shipping, item, opportunity, part,
        quote, quote_line, quote_payment, quote_shipment, sales_rfq, sales_rfq_line,
    },
    errors::ServiceError,
    events::Event,
    models::{ItemType, MethodType, QuoteStatus, SalesRfqStatus},
    services::sequences::{self, QUOTE_SEQUENCE},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveEnum, ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// What the transaction produced, for the post-commit side effects.
struct QuoteCreated {
    quote_id: Uuid,
    method_copies: Vec<MethodCopyRequest>,
}

impl ConversionService {
    #[instrument(skip(self))]
    pub(super) async fn sales_rfq_to_quote(
        &self,
        sales_rfq_id: Uuid,
        company_id: Uuid,
        user_id: &str,
    ) -> Result<Uuid, ServiceError> {
        let db = &*self.db;

        let rfq = sales_rfq::Entity::find_by_id(sales_rfq_id)
            .filter(sales_rfq::Column::CompanyId.eq(company_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("sales RFQ {} not found", sales_rfq_id)))?;

        if rfq.status != SalesRfqStatus::ReadyForQuote {
            return Err(ServiceError::PreconditionFailed(format!(
                "sales RFQ {} is {}, expected {}",
                rfq.rfq_id,
                rfq.status,
                SalesRfqStatus::ReadyForQuote
            )));
        }

        let started = Instant::now();
        let txn = db::begin(db).await?;
        let created = match self.create_quote(&txn, &rfq, user_id).await {
            Ok(created) => created,
            Err(e) => {
                db::rollback(txn).await;
                return Err(e);
            }
        };
        db::commit(txn, started).await?;

        info!(quote_id = %created.quote_id, rfq_id = %rfq.rfq_id, "Quote created from sales RFQ");

        spawn_method_copies(self.method_copier.clone(), created.method_copies);
        self.emit(Event::QuoteCreated {
            quote_id: created.quote_id,
            sales_rfq_id,
            company_id,
        })
        .await;

        Ok(created.quote_id)
    }

    async fn create_quote(
        &self,
        txn: &DatabaseTransaction,
        rfq: &sales_rfq::Model,
        user_id: &str,
    ) -> Result<QuoteCreated, ServiceError> {
        let now = Utc::now();
        let company_id = rfq.company_id;

        // Claim the RFQ first; a concurrent conversion of the same RFQ
        // either already holds this row or finds the status moved on.
        let claimed = sales_rfq::Entity::update_many()
            .col_expr(
                sales_rfq::Column::Status,
                Expr::value(SalesRfqStatus::Quoted.to_value()),
            )
            .col_expr(sales_rfq::Column::UpdatedBy, Expr::value(user_id))
            .col_expr(sales_rfq::Column::UpdatedAt, Expr::value(now))
            .filter(sales_rfq::Column::Id.eq(rfq.id))
            .filter(sales_rfq::Column::Status.eq(SalesRfqStatus::ReadyForQuote))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;
        if claimed.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "sales RFQ {} was converted concurrently",
                rfq.rfq_id
            )));
        }

        let lines = sales_rfq_line::Entity::find()
            .filter(sales_rfq_line::Column::SalesRfqId.eq(rfq.id))
            .order_by_asc(sales_rfq_line::Column::SortOrder)
            .all(txn)
            .await
            .map_err(ServiceError::db_error)?;

        let customer = customer::Entity::find_by_id(rfq.customer_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("customer {} not found", rfq.customer_id)))?;
        let company = company::Entity::find_by_id(company_id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("company {} not found", company_id)))?;
        let payment_defaults = customer_payment::Entity::find_by_id(customer.id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?;
        let shipping_defaults = customer_shipping::Entity::find_by_id(customer.id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?;

        let item_ids = self
            .resolve_line_items(txn, company_id, &lines, user_id, now)
            .await?;

        let currency_code = customer
            .currency_code
            .clone()
            .or_else(|| company.base_currency_code.clone())
            .unwrap_or_else(|| self.default_currency.clone());
        let exchange_rate = currency::Entity::find_by_id((currency_code.clone(), company_id))
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .map(|c| c.exchange_rate)
            .unwrap_or(Decimal::ONE);

        let quote_number = sequences::allocate(txn, QUOTE_SEQUENCE, company_id, user_id).await?;
        let quote_id = Uuid::new_v4();

        quote::ActiveModel {
            id: Set(quote_id),
            quote_id: Set(quote_number.clone()),
            company_id: Set(company_id),
            customer_id: Set(rfq.customer_id),
            customer_location_id: Set(rfq.customer_location_id),
            customer_contact_id: Set(rfq.customer_contact_id),
            customer_reference: Set(rfq.customer_reference.clone()),
            location_id: Set(rfq.location_id),
            sales_rfq_id: Set(Some(rfq.id)),
            opportunity_id: Set(rfq.opportunity_id),
            status: Set(QuoteStatus::Draft),
            currency_code: Set(currency_code),
            exchange_rate: Set(exchange_rate),
            exchange_rate_updated_at: Set(now),
            created_by: Set(user_id.to_string()),
            created_at: Set(now),
            updated_by: Set(None),
            updated_at: Set(None),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        quote_payment::ActiveModel {
            id: Set(quote_id),
            company_id: Set(company_id),
            invoice_customer_id: Set(payment_defaults
                .as_ref()
                .and_then(|p| p.invoice_customer_id)
                .or(Some(rfq.customer_id))),
            invoice_customer_location_id: Set(payment_defaults
                .as_ref()
                .and_then(|p| p.invoice_customer_location_id)),
            invoice_customer_contact_id: Set(payment_defaults
                .as_ref()
                .and_then(|p| p.invoice_customer_contact_id)),
            payment_term_id: Set(payment_defaults.as_ref().and_then(|p| p.payment_term_id)),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        quote_shipment::ActiveModel {
            id: Set(quote_id),
            company_id: Set(company_id),
            location_id: Set(rfq.location_id),
            shipping_method_id: Set(shipping_defaults.as_ref().and_then(|s| s.shipping_method_id)),
            shipping_term_id: Set(shipping_defaults.as_ref().and_then(|s| s.shipping_term_id)),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        let mut quote_lines = Vec::with_capacity(lines.len());
        let mut method_copies = Vec::new();
        let mut links = Vec::new();
        for line in &lines {
            let item_id = item_ids.get(&line.id).copied().ok_or_else(|| {
                ServiceError::InternalError(format!("no item resolved for RFQ line {}", line.id))
            })?;

            quote_lines.push(quote_line::ActiveModel {
                id: Set(line.id),
                quote_id: Set(quote_id),
                company_id: Set(company_id),
                item_id: Set(item_id),
                customer_part_id: Set(Some(line.customer_part_id.clone())),
                customer_part_revision: Set(line.customer_part_revision.clone()),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity.clone()),
                unit_of_measure_code: Set(line.unit_of_measure_code.clone()),
                method_type: Set(line.method_type),
                unit_cost: Set(Decimal::ZERO),
                additional_charges: Set(serde_json::json!({})),
                created_by: Set(user_id.to_string()),
                created_at: Set(now),
            });

            if line.method_type == MethodType::Make {
                method_copies.push(MethodCopyRequest {
                    item_id,
                    quote_line_id: line.id,
                    company_id,
                    user_id: user_id.to_string(),
                });
            }
            links.push(CustomerPartLink {
                customer_id: rfq.customer_id,
                item_id,
                customer_part_id: line.customer_part_id.clone(),
                customer_part_revision: line.customer_part_revision.clone(),
            });
        }

        if !quote_lines.is_empty() {
            quote_line::Entity::insert_many(quote_lines)
                .exec_without_returning(txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        let linked = opportunity::Entity::update_many()
            .col_expr(opportunity::Column::QuoteId, Expr::value(Some(quote_id)))
            .filter(opportunity::Column::Id.eq(rfq.opportunity_id))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;
        if linked.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "opportunity {} not found",
                rfq.opportunity_id
            )));
        }

        upsert_customer_parts(txn, company_id, links).await?;

        debug!(quote = %quote_number, lines = lines.len(), "Quote rows written");
        Ok(QuoteCreated {
            quote_id,
            method_copies,
        })
    }

    /// Returns the item of every line, creating inactive items (and their
    /// part records) for lines that have none yet.
    async fn resolve_line_items(
        &self,
        txn: &DatabaseTransaction,
        company_id: Uuid,
        lines: &[sales_rfq_line::Model],
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, Uuid>, ServiceError> {
        let mut item_ids: HashMap<Uuid, Uuid> = lines
            .iter()
            .filter_map(|line| line.item_id.map(|item_id| (line.id, item_id)))
            .collect();

        let unassigned: Vec<&sales_rfq_line::Model> =
            lines.iter().filter(|line| line.item_id.is_none()).collect();
        if unassigned.is_empty() {
            return Ok(item_ids);
        }

        let candidates: Vec<String> = unassigned
            .iter()
            .map(|line| {
                readable_id_candidate(&line.customer_part_id, line.customer_part_revision.as_deref())
            })
            .collect();

        let taken = existing_readable_ids(txn, company_id, &candidates).await?;
        let readable_ids = assign_readable_ids(&candidates, &taken);

        let mut items = Vec::with_capacity(unassigned.len());
        let mut parts = Vec::with_capacity(unassigned.len());
        for (line, readable_id) in unassigned.iter().zip(readable_ids) {
            let item_id = Uuid::new_v4();
            items.push(item::ActiveModel {
                id: Set(item_id),
                readable_id: Set(readable_id.clone()),
                company_id: Set(company_id),
                name: Set(line.description.clone().unwrap_or_else(|| readable_id.clone())),
                description: Set(line.description.clone()),
                item_type: Set(ItemType::Part),
                replenishment_system: Set(line.method_type.replenishment_system()),
                default_method_type: Set(line.method_type),
                unit_of_measure_code: Set(line.unit_of_measure_code.clone()),
                active: Set(false),
                created_by: Set(user_id.to_string()),
                created_at: Set(now),
            });
            parts.push(part::ActiveModel {
                id: Set(Uuid::new_v4()),
                item_id: Set(item_id),
                company_id: Set(company_id),
                created_by: Set(user_id.to_string()),
                created_at: Set(now),
            });
            item_ids.insert(line.id, item_id);
        }

        item::Entity::insert_many(items)
            .exec_without_returning(txn)
            .await
            .map_err(ServiceError::db_error)?;
        part::Entity::insert_many(parts)
            .exec_without_returning(txn)
            .await
            .map_err(ServiceError::db_error)?;

        for line in unassigned {
            sales_rfq_line::Entity::update_many()
                .col_expr(
                    sales_rfq_line::Column::ItemId,
                    Expr::value(item_ids.get(&line.id).copied()),
                )
                .filter(sales_rfq_line::Column::Id.eq(line.id))
                .exec(txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        Ok(item_ids)
    }
}

/// Readable ids in the company that start with any of `candidates`.
async fn existing_readable_ids(
    txn: &DatabaseTransaction,
    company_id: Uuid,
    candidates: &[String],
) -> Result<HashSet<String>, ServiceError> {
    let distinct: HashSet<&String> = candidates.iter().collect();
    let prefixes = distinct
        .into_iter()
        .fold(Condition::any(), |condition, candidate| {
            condition.add(item::Column::ReadableId.starts_with(candidate.as_str()))
        });

    let existing = item::Entity::find()
        .filter(item::Column::CompanyId.eq(company_id))
        .filter(prefixes)
        .all(txn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(existing.into_iter().map(|item| item.readable_id).collect())
}
