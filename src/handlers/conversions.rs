use super::common::success_response;
use crate::{
    errors::{ApiError, ServiceError},
    handlers::AppState,
    services::conversions::{ConversionRequest, ConversionResult, ConversionType},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::{error, info};

/// Creates the router for document conversion endpoints
pub fn conversion_routes() -> Router<AppState> {
    Router::new().route("/", post(convert))
}

fn failure_message(conversion_type: ConversionType) -> &'static str {
    match conversion_type {
        ConversionType::SalesRfqToQuote => "Failed to convert sales RFQ to quote",
        ConversionType::QuoteToSalesOrder => "Failed to convert quote to sales order",
    }
}

/// Convert a sales RFQ into a quote, or a quote into a sales order
#[utoipa::path(
    post,
    path = "/api/v1/conversions",
    summary = "Convert document",
    description = "Converts a sales RFQ to a quote or a quote to a sales order in one transaction",
    request_body = ConversionRequest,
    responses(
        (status = 200, description = "Document converted", body = ConversionResult),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Conversion failed", body = crate::errors::ErrorResponse)
    ),
    tag = "Conversions"
)]
pub async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConversionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApiError::ValidationError(rejection.body_text()))?;

    let conversion_type = request.conversion_type;
    let source_id = request.id;

    match state.services.conversions.convert(request).await {
        Ok(result) => {
            info!(%conversion_type, %source_id, converted_id = %result.converted_id, "Document converted");
            Ok(success_response(result))
        }
        Err(ServiceError::ValidationError(msg)) => Err(ApiError::ValidationError(msg)),
        Err(source) => {
            error!(%conversion_type, %source_id, error = %source, "Document conversion failed");
            Err(ApiError::ConversionFailed {
                message: failure_message(conversion_type).to_string(),
                source,
            })
        }
    }
}
