use super::{upsert_customer_parts, ConversionService, CustomerPartLink, SelectedLine};
use crate::{
    db,
    entities::{
        item, opportunity, quote, quote_line, quote_payment, quote_shipment, sales_order,
        sales_order_line, sales_order_payment, sales_order_shipment,
    },
    errors::ServiceError,
    events::Event,
    models::{QuoteStatus, SalesOrderStatus},
    services::sequences::{self, SALES_ORDER_SEQUENCE},
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveEnum, ActiveModelTrait, ActiveValue::Set, ColumnTrait,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

impl ConversionService {
    #[instrument(skip(self, selected), fields(selected = selected.len()))]
    pub(super) async fn quote_to_sales_order(
        &self,
        quote_id: Uuid,
        company_id: Uuid,
        user_id: &str,
        selected: &HashMap<Uuid, SelectedLine>,
    ) -> Result<Uuid, ServiceError> {
        let db = &*self.db;

        let quote = quote::Entity::find_by_id(quote_id)
            .filter(quote::Column::CompanyId.eq(company_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("quote {} not found", quote_id)))?;

        if !quote.status.is_convertible() {
            return Err(ServiceError::PreconditionFailed(format!(
                "quote {} is {} and cannot be ordered",
                quote.quote_id, quote.status
            )));
        }

        let lines = quote_line::Entity::find()
            .filter(quote_line::Column::QuoteId.eq(quote.id))
            .order_by_asc(quote_line::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(unknown) = selected
            .keys()
            .find(|id| !lines.iter().any(|line| line.id == **id))
        {
            return Err(ServiceError::ValidationError(format!(
                "line {} does not belong to quote {}",
                unknown, quote.quote_id
            )));
        }

        let ordered: Vec<(&quote_line::Model, &SelectedLine)> = lines
            .iter()
            .filter_map(|line| selected.get(&line.id).map(|choice| (line, choice)))
            .collect();
        let partial = ordered.len() < lines.len();

        let started = Instant::now();
        let txn = db::begin(db).await?;
        let sales_order_id = match self
            .create_sales_order(&txn, &quote, &ordered, partial, user_id)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                db::rollback(txn).await;
                return Err(e);
            }
        };
        db::commit(txn, started).await?;

        info!(
            %sales_order_id,
            quote = %quote.quote_id,
            lines = ordered.len(),
            partial,
            "Sales order created from quote"
        );

        self.emit(Event::SalesOrderCreated {
            sales_order_id,
            quote_id,
            company_id,
            line_count: ordered.len(),
            partial,
        })
        .await;

        Ok(sales_order_id)
    }

    async fn create_sales_order(
        &self,
        txn: &DatabaseTransaction,
        quote: &quote::Model,
        ordered: &[(&quote_line::Model, &SelectedLine)],
        partial: bool,
        user_id: &str,
    ) -> Result<Uuid, ServiceError> {
        let now = Utc::now();
        let today = now.date_naive();
        let company_id = quote.company_id;
        let next_status = if partial {
            QuoteStatus::Partial
        } else {
            QuoteStatus::Ordered
        };

        let claimed = quote::Entity::update_many()
            .col_expr(quote::Column::Status, Expr::value(next_status.to_value()))
            .col_expr(quote::Column::UpdatedBy, Expr::value(user_id))
            .col_expr(quote::Column::UpdatedAt, Expr::value(now))
            .filter(quote::Column::Id.eq(quote.id))
            .filter(quote::Column::Status.is_in(QuoteStatus::CONVERTIBLE))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;
        if claimed.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "quote {} was converted concurrently",
                quote.quote_id
            )));
        }

        let payment = quote_payment::Entity::find_by_id(quote.id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("quote payment {}", quote.id)))?;
        let shipment = quote_shipment::Entity::find_by_id(quote.id)
            .one(txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("quote shipment {}", quote.id)))?;

        let order_number =
            sequences::allocate(txn, SALES_ORDER_SEQUENCE, company_id, user_id).await?;
        let sales_order_id = Uuid::new_v4();

        sales_order::ActiveModel {
            id: Set(sales_order_id),
            sales_order_id: Set(order_number.clone()),
            company_id: Set(company_id),
            customer_id: Set(quote.customer_id),
            customer_location_id: Set(quote.customer_location_id),
            customer_contact_id: Set(quote.customer_contact_id),
            customer_reference: Set(quote.customer_reference.clone()),
            location_id: Set(quote.location_id),
            quote_id: Set(quote.id),
            opportunity_id: Set(quote.opportunity_id),
            status: Set(SalesOrderStatus::Draft),
            currency_code: Set(quote.currency_code.clone()),
            exchange_rate: Set(quote.exchange_rate),
            exchange_rate_updated_at: Set(quote.exchange_rate_updated_at),
            order_date: Set(today),
            created_by: Set(user_id.to_string()),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        sales_order_payment::ActiveModel {
            id: Set(sales_order_id),
            company_id: Set(company_id),
            invoice_customer_id: Set(payment.invoice_customer_id),
            invoice_customer_location_id: Set(payment.invoice_customer_location_id),
            invoice_customer_contact_id: Set(payment.invoice_customer_contact_id),
            payment_term_id: Set(payment.payment_term_id),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        sales_order_shipment::ActiveModel {
            id: Set(sales_order_id),
            company_id: Set(company_id),
            location_id: Set(shipment.location_id),
            shipping_method_id: Set(shipment.shipping_method_id),
            shipping_term_id: Set(shipment.shipping_term_id),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;

        let mut order_lines = Vec::with_capacity(ordered.len());
        let mut links = Vec::new();
        for (line, choice) in ordered {
            order_lines.push(sales_order_line::ActiveModel {
                id: Set(line.id),
                sales_order_id: Set(sales_order_id),
                company_id: Set(company_id),
                item_id: Set(line.item_id),
                description: Set(line.description.clone()),
                method_type: Set(line.method_type),
                unit_of_measure_code: Set(line.unit_of_measure_code.clone()),
                sale_quantity: Set(choice.quantity),
                unit_price: Set(choice.net_unit_price),
                converted_unit_price: Set(choice.converted_net_unit_price),
                add_on_cost: Set(choice.add_on),
                converted_add_on_cost: Set(choice.converted_add_on),
                promised_date: Set(promised_date(today, choice.lead_time)?),
                created_by: Set(user_id.to_string()),
                created_at: Set(now),
            });

            if let Some(customer_part_id) = &line.customer_part_id {
                links.push(CustomerPartLink {
                    customer_id: quote.customer_id,
                    item_id: line.item_id,
                    customer_part_id: customer_part_id.clone(),
                    customer_part_revision: line.customer_part_revision.clone(),
                });
            }
        }

        if !order_lines.is_empty() {
            sales_order_line::Entity::insert_many(order_lines)
                .exec_without_returning(txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        let item_ids: Vec<Uuid> = ordered.iter().map(|(line, _)| line.item_id).collect();
        let activated = item::Entity::update_many()
            .col_expr(item::Column::Active, Expr::value(true))
            .filter(item::Column::Id.is_in(item_ids))
            .filter(item::Column::Active.eq(false))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;

        let linked = opportunity::Entity::update_many()
            .col_expr(
                opportunity::Column::SalesOrderId,
                Expr::value(Some(sales_order_id)),
            )
            .filter(opportunity::Column::Id.eq(quote.opportunity_id))
            .exec(txn)
            .await
            .map_err(ServiceError::db_error)?;
        if linked.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "opportunity {} not found",
                quote.opportunity_id
            )));
        }

        upsert_customer_parts(txn, company_id, links).await?;

        debug!(
            sales_order = %order_number,
            items_activated = activated.rows_affected,
            "Sales order rows written"
        );
        Ok(sales_order_id)
    }
}

fn promised_date(order_date: NaiveDate, lead_time: i64) -> Result<NaiveDate, ServiceError> {
    Duration::try_days(lead_time)
        .and_then(|days| order_date.checked_add_signed(days))
        .ok_or_else(|| {
            ServiceError::InvariantViolation(format!(
                "lead time of {} days is out of range",
                lead_time
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn promised_date_adds_lead_time_days() {
        let order_date = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        assert_eq!(
            promised_date(order_date, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(promised_date(order_date, 0).unwrap(), order_date);
    }

    #[test]
    fn unrepresentable_dates_are_rejected() {
        let order_date = NaiveDate::MAX;
        assert_matches!(
            promised_date(order_date, 1),
            Err(ServiceError::InvariantViolation(_))
        );
    }
}
