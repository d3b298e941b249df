//! Transactional document conversions: sales RFQ to quote and quote to sales order.
//!
//! Each conversion validates its input and the source document's status
//! before opening a transaction. Everything after that point, including the
//! sequence allocation and the source status transition, happens inside one
//! transaction; any failure rolls the whole attempt back. Side effects that
//! do not need to be atomic (method copies, events) run after commit and can
//! only be logged when they fail.

mod customer_parts;
mod method_copy;
mod quote_to_sales_order;
pub mod readable_ids;
mod rfq_to_quote;

pub use customer_parts::{upsert_customer_parts, CustomerPartLink};
pub use method_copy::{spawn_method_copies, EventMethodCopier, MethodCopier, MethodCopyRequest};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Longest lead time accepted for a selected tier, in days.
pub const MAX_LEAD_TIME_DAYS: i64 = 3_650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, strum::Display)]
pub enum ConversionType {
    #[serde(rename = "salesRfqToQuote")]
    #[strum(serialize = "salesRfqToQuote")]
    SalesRfqToQuote,
    #[serde(rename = "quoteToSalesOrder")]
    #[strum(serialize = "quoteToSalesOrder")]
    QuoteToSalesOrder,
}

/// Pricing tier chosen for one quote line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLine {
    pub quantity: Decimal,
    pub net_unit_price: Decimal,
    pub converted_net_unit_price: Decimal,
    pub add_on: Decimal,
    pub converted_add_on: Decimal,
    /// Days until the line is promised.
    pub lead_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_selection"))]
pub struct ConversionRequest {
    #[serde(rename = "type")]
    pub conversion_type: ConversionType,
    /// Id of the source document.
    pub id: Uuid,
    pub company_id: Uuid,
    #[validate(length(min = 1))]
    pub user_id: String,
    #[serde(default)]
    pub selected_lines: Option<HashMap<Uuid, SelectedLine>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub converted_id: Uuid,
}

fn validate_selection(request: &ConversionRequest) -> Result<(), ValidationError> {
    let selected = request.selected_lines.as_ref().filter(|lines| !lines.is_empty());
    match (request.conversion_type, selected) {
        (ConversionType::QuoteToSalesOrder, None) => Err(selection_error(
            "selected_lines_required",
            "selectedLines is required when converting a quote to a sales order",
        )),
        (ConversionType::SalesRfqToQuote, Some(_)) => Err(selection_error(
            "selected_lines_unexpected",
            "selectedLines is only accepted when converting a quote to a sales order",
        )),
        (ConversionType::QuoteToSalesOrder, Some(lines)) => {
            for line in lines.values() {
                if line.quantity <= Decimal::ZERO {
                    return Err(selection_error(
                        "selected_line_quantity",
                        "selected quantities must be greater than zero",
                    ));
                }
                if !(0..=MAX_LEAD_TIME_DAYS).contains(&line.lead_time) {
                    return Err(selection_error(
                        "selected_line_lead_time",
                        "selected lead times must be between 0 and 3650 days",
                    ));
                }
            }
            Ok(())
        }
        (ConversionType::SalesRfqToQuote, None) => Ok(()),
    }
}

fn selection_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Runs document conversions against the database.
#[derive(Clone)]
pub struct ConversionService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    method_copier: Arc<dyn MethodCopier>,
    default_currency: String,
}

impl ConversionService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        method_copier: Arc<dyn MethodCopier>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            db,
            event_sender,
            method_copier,
            default_currency: default_currency.into(),
        }
    }

    /// Converts the document named by `request` and returns the new document's id.
    #[instrument(skip(self, request), fields(
        conversion = %request.conversion_type,
        source_id = %request.id,
        company_id = %request.company_id
    ))]
    pub async fn convert(&self, request: ConversionRequest) -> Result<ConversionResult, ServiceError> {
        request.validate()?;

        let started = Instant::now();
        let kind = request.conversion_type.to_string();
        let result = match request.conversion_type {
            ConversionType::SalesRfqToQuote => {
                self.sales_rfq_to_quote(request.id, request.company_id, &request.user_id)
                    .await
            }
            ConversionType::QuoteToSalesOrder => {
                let selected = request.selected_lines.unwrap_or_default();
                self.quote_to_sales_order(
                    request.id,
                    request.company_id,
                    &request.user_id,
                    &selected,
                )
                .await
            }
        };

        histogram!("quoteflow_conversions.duration", started.elapsed(), "type" => kind.clone());
        match &result {
            Ok(converted_id) => {
                counter!("quoteflow_conversions.completed", 1, "type" => kind);
                info!(%converted_id, "Conversion completed");
            }
            Err(e) => {
                counter!("quoteflow_conversions.failed", 1, "type" => kind);
                warn!(error = %e, "Conversion failed");
            }
        }

        result.map(|converted_id| ConversionResult { converted_id })
    }

    async fn emit(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "Failed to publish conversion event");
        }
    }
}
