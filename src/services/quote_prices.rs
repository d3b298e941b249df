//! Price tables and tier edits for quote lines.

use crate::{
    db,
    entities::{quote_line, quote_line_price},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        cost_effects::{compile_cost_effects, CostBreakdown, CostModel},
        method_tree::load_method_tree,
        pricing::{self, AdditionalCharges, PriceRow, StoredPrice, TierPrice},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Changes to one pricing tier. Omitted fields keep their stored value, or
/// start at zero when the tier has no row yet.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceEdit {
    #[validate(custom = "positive")]
    pub quantity: Decimal,
    #[validate(custom = "non_negative")]
    pub unit_price: Option<Decimal>,
    /// Fraction between 0 and 1.
    #[validate(custom = "fraction")]
    pub discount_percent: Option<Decimal>,
    #[validate(range(min = 0, max = 3650))]
    pub lead_time: Option<i32>,
    #[validate(length(min = 1))]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateRequest {
    /// Fraction applied to unit cost; 0.25 prices at cost plus 25%.
    #[validate(custom = "markup")]
    pub markup: Decimal,
    #[validate(length(min = 1))]
    pub user_id: String,
}

/// Costs of a quote line at a single quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub quantity: Decimal,
    pub costs: CostBreakdown,
    pub total_cost: Decimal,
    pub unit_cost: Option<Decimal>,
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_positive"))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::new("must_not_be_negative"))
    } else {
        Ok(())
    }
}

fn fraction(value: &Decimal) -> Result<(), ValidationError> {
    if (Decimal::ZERO..=Decimal::ONE).contains(value) {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_between_0_and_1"))
    }
}

fn markup(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= Decimal::NEGATIVE_ONE {
        Ok(())
    } else {
        Err(ValidationError::new("markup_below_minus_one"))
    }
}

/// Quantity tiers of a line, in the order written, without duplicates.
pub fn line_quantities(line: &quote_line::Model) -> Result<Vec<Decimal>, ServiceError> {
    if line.quantity.is_null() {
        return Ok(Vec::new());
    }
    let raw: Vec<Decimal> = serde_json::from_value(line.quantity.clone()).map_err(|e| {
        ServiceError::InvariantViolation(format!(
            "quote line {} has malformed quantities: {}",
            line.id, e
        ))
    })?;

    let mut quantities: Vec<Decimal> = Vec::with_capacity(raw.len());
    for quantity in raw {
        if !quantities.contains(&quantity) {
            quantities.push(quantity);
        }
    }
    Ok(quantities)
}

pub fn line_charges(line: &quote_line::Model) -> Result<AdditionalCharges, ServiceError> {
    if line.additional_charges.is_null() {
        return Ok(AdditionalCharges::new());
    }
    serde_json::from_value(line.additional_charges.clone()).map_err(|e| {
        ServiceError::InvariantViolation(format!(
            "quote line {} has malformed additional charges: {}",
            line.id, e
        ))
    })
}

/// Reads, edits and recalculates quote line prices.
#[derive(Clone)]
pub struct QuotePriceService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl QuotePriceService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Price table with one row per quantity tier of the line.
    #[instrument(skip(self))]
    pub async fn price_table(&self, quote_line_id: Uuid) -> Result<Vec<PriceRow>, ServiceError> {
        let db = &*self.db;
        let line = find_line(db, quote_line_id).await?;
        let quantities = line_quantities(&line)?;
        let charges = line_charges(&line)?;
        let model = cost_model(db, &line).await?;
        let stored = stored_prices(db, quote_line_id).await?;

        Ok(pricing::price_table(&quantities, &model, &stored, &charges))
    }

    /// Costs of the line at `quantity`, which need not be one of its tiers.
    #[instrument(skip(self))]
    pub async fn costs(
        &self,
        quote_line_id: Uuid,
        quantity: Decimal,
    ) -> Result<CostSummary, ServiceError> {
        if quantity.is_sign_negative() && !quantity.is_zero() {
            return Err(ServiceError::ValidationError(
                "quantity must not be negative".to_string(),
            ));
        }

        let db = &*self.db;
        let line = find_line(db, quote_line_id).await?;
        let too_large =
            || ServiceError::ValidationError(format!("quantity {} is too large to cost", quantity));
        let costs = cost_model(db, &line)
            .await?
            .costs(quantity)
            .ok_or_else(too_large)?;

        Ok(CostSummary {
            quantity,
            total_cost: costs.total_cost().ok_or_else(too_large)?,
            unit_cost: pricing::unit_cost(&costs, quantity),
            costs,
        })
    }

    /// Writes one tier. Creates the row when the tier has none.
    #[instrument(skip(self, edit), fields(quantity = %edit.quantity))]
    pub async fn update_price(
        &self,
        quote_line_id: Uuid,
        edit: PriceEdit,
    ) -> Result<StoredPrice, ServiceError> {
        edit.validate()?;

        let db = &*self.db;
        let line = find_line(db, quote_line_id).await?;
        if !line_quantities(&line)?.contains(&edit.quantity) {
            return Err(ServiceError::ValidationError(format!(
                "quantity {} is not a tier of quote line {}",
                edit.quantity, quote_line_id
            )));
        }

        let mut update_columns = vec![
            quote_line_price::Column::UpdatedBy,
            quote_line_price::Column::UpdatedAt,
        ];
        if edit.unit_price.is_some() {
            update_columns.push(quote_line_price::Column::UnitPrice);
        }
        if edit.discount_percent.is_some() {
            update_columns.push(quote_line_price::Column::DiscountPercent);
        }
        if edit.lead_time.is_some() {
            update_columns.push(quote_line_price::Column::LeadTime);
        }

        let row = quote_line_price::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(line.quote_id),
            quote_line_id: Set(quote_line_id),
            quantity: Set(edit.quantity),
            unit_price: Set(edit.unit_price.unwrap_or(Decimal::ZERO)),
            discount_percent: Set(edit.discount_percent.unwrap_or(Decimal::ZERO)),
            lead_time: Set(edit.lead_time.unwrap_or(0)),
            updated_by: Set(edit.user_id.clone()),
            updated_at: Set(Utc::now()),
        };

        quote_line_price::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    quote_line_price::Column::QuoteLineId,
                    quote_line_price::Column::Quantity,
                ])
                .update_columns(update_columns)
                .to_owned(),
            )
            .exec_without_returning(db)
            .await
            .map_err(ServiceError::db_error)?;

        let stored = stored_prices(db, quote_line_id)
            .await?
            .into_iter()
            .find(|price| price.quantity == edit.quantity)
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "price for quantity {} was not stored",
                    edit.quantity
                ))
            })?;

        info!(%quote_line_id, quantity = %edit.quantity, "Quote line price updated");
        self.emit(Event::QuoteLinePriceUpdated {
            quote_line_id,
            quantity: edit.quantity,
        })
        .await;

        Ok(stored)
    }

    /// Prices every tier at cost plus `markup` and stores the result in one
    /// transaction. Discounts and lead times already stored are kept.
    #[instrument(skip(self, request), fields(markup = %request.markup))]
    pub async fn recalculate(
        &self,
        quote_line_id: Uuid,
        request: RecalculateRequest,
    ) -> Result<Vec<TierPrice>, ServiceError> {
        request.validate()?;

        let started = Instant::now();
        let txn = db::begin(&*self.db).await?;
        let tiers = match store_recalculated(&txn, quote_line_id, &request).await {
            Ok(tiers) => tiers,
            Err(e) => {
                db::rollback(txn).await;
                return Err(e);
            }
        };
        db::commit(txn, started).await?;

        info!(%quote_line_id, tiers = tiers.len(), "Quote line prices recalculated");
        self.emit(Event::QuoteLinePricesRecalculated {
            quote_line_id,
            markup: request.markup,
            tiers: tiers.len(),
        })
        .await;

        Ok(tiers)
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "Failed to publish pricing event");
        }
    }
}

async fn store_recalculated(
    txn: &DatabaseTransaction,
    quote_line_id: Uuid,
    request: &RecalculateRequest,
) -> Result<Vec<TierPrice>, ServiceError> {
    let line = find_line(txn, quote_line_id).await?;
    let quantities = line_quantities(&line)?;
    let model = cost_model(txn, &line).await?;
    let tiers = pricing::recalculate(&quantities, &model, request.markup);
    if tiers.is_empty() {
        return Ok(tiers);
    }

    let now = Utc::now();
    let rows = tiers.iter().map(|tier| quote_line_price::ActiveModel {
        id: Set(Uuid::new_v4()),
        quote_id: Set(line.quote_id),
        quote_line_id: Set(quote_line_id),
        quantity: Set(tier.quantity),
        unit_price: Set(tier.unit_price),
        discount_percent: Set(Decimal::ZERO),
        lead_time: Set(0),
        updated_by: Set(request.user_id.clone()),
        updated_at: Set(now),
    });

    quote_line_price::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                quote_line_price::Column::QuoteLineId,
                quote_line_price::Column::Quantity,
            ])
            .update_columns([
                quote_line_price::Column::UnitPrice,
                quote_line_price::Column::UpdatedBy,
                quote_line_price::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(tiers)
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    quote_line_id: Uuid,
) -> Result<quote_line::Model, ServiceError> {
    quote_line::Entity::find_by_id(quote_line_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("quote line {} not found", quote_line_id)))
}

async fn cost_model<C: ConnectionTrait>(
    conn: &C,
    line: &quote_line::Model,
) -> Result<CostModel, ServiceError> {
    let tree = load_method_tree(conn, line).await?;
    Ok(compile_cost_effects(
        tree.root.as_ref(),
        &tree.operations,
        line.unit_cost,
    ))
}

async fn stored_prices<C: ConnectionTrait>(
    conn: &C,
    quote_line_id: Uuid,
) -> Result<Vec<StoredPrice>, ServiceError> {
    let rows = quote_line_price::Entity::find()
        .filter(quote_line_price::Column::QuoteLineId.eq(quote_line_id))
        .order_by_asc(quote_line_price::Column::Quantity)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(rows
        .into_iter()
        .map(|row| StoredPrice {
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount_percent: row.discount_percent,
            lead_time: row.lead_time,
        })
        .collect())
}
