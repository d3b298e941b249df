use super::common::{map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::{
        pricing::{PriceRow, StoredPrice, TierPrice},
        quote_prices::{CostSummary, PriceEdit, RecalculateRequest},
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

/// Creates the router for quote line pricing endpoints
pub fn quote_price_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/prices", get(get_price_table).put(update_price))
        .route("/:id/prices/recalculate", post(recalculate_prices))
        .route("/:id/costs", get(get_costs))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CostsQuery {
    /// Quantity to cost the line at
    pub quantity: Decimal,
}

/// Price table of a quote line, one row per quantity tier
#[utoipa::path(
    get,
    path = "/api/v1/quote-lines/{id}/prices",
    summary = "Get price table",
    params(("id" = Uuid, Path, description = "Quote line id")),
    responses(
        (status = 200, description = "Price table", body = Vec<PriceRow>),
        (status = 404, description = "Quote line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn get_price_table(
    State(state): State<AppState>,
    Path(quote_line_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state
        .services
        .quote_prices
        .price_table(quote_line_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(rows))
}

/// Update the price settings of one tier
#[utoipa::path(
    put,
    path = "/api/v1/quote-lines/{id}/prices",
    summary = "Update tier price",
    params(("id" = Uuid, Path, description = "Quote line id")),
    request_body = PriceEdit,
    responses(
        (status = 200, description = "Stored tier", body = StoredPrice),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn update_price(
    State(state): State<AppState>,
    Path(quote_line_id): Path<Uuid>,
    Json(payload): Json<PriceEdit>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let stored = state
        .services
        .quote_prices
        .update_price(quote_line_id, payload)
        .await
        .map_err(map_service_error)?;

    info!("Quote line {} price updated", quote_line_id);
    Ok(success_response(stored))
}

/// Reprice every tier at cost plus a markup
#[utoipa::path(
    post,
    path = "/api/v1/quote-lines/{id}/prices/recalculate",
    summary = "Recalculate prices",
    params(("id" = Uuid, Path, description = "Quote line id")),
    request_body = RecalculateRequest,
    responses(
        (status = 200, description = "Stored tier prices", body = Vec<TierPrice>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Quote line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn recalculate_prices(
    State(state): State<AppState>,
    Path(quote_line_id): Path<Uuid>,
    Json(payload): Json<RecalculateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let tiers = state
        .services
        .quote_prices
        .recalculate(quote_line_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(tiers))
}

/// Cost breakdown of a quote line at a quantity
#[utoipa::path(
    get,
    path = "/api/v1/quote-lines/{id}/costs",
    summary = "Get cost breakdown",
    params(("id" = Uuid, Path, description = "Quote line id"), CostsQuery),
    responses(
        (status = 200, description = "Cost breakdown", body = CostSummary),
        (status = 404, description = "Quote line not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Pricing"
)]
pub async fn get_costs(
    State(state): State<AppState>,
    Path(quote_line_id): Path<Uuid>,
    Query(query): Query<CostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .quote_prices
        .costs(quote_line_id, query.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}
