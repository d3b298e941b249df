use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quoteflow API",
        version = "0.1.0",
        description = r#"
# Quoteflow Manufacturing Sales API

Converts sales RFQs into quotes and quotes into sales orders, and prices
quote lines from their method trees.

## Error Handling

Every error uses the same body:

```json
{
  "error": "Internal Server Error",
  "message": "Failed to convert quote to sales order",
  "details": "Conflict: quote Q-000042 was converted concurrently",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Conversions", description = "Document conversion endpoints"),
        (name = "Pricing", description = "Quote line price and cost endpoints")
    ),
    paths(
        crate::handlers::conversions::convert,
        crate::handlers::quote_prices::get_price_table,
        crate::handlers::quote_prices::update_price,
        crate::handlers::quote_prices::recalculate_prices,
        crate::handlers::quote_prices::get_costs,
    ),
    components(
        schemas(
            crate::services::conversions::ConversionRequest,
            crate::services::conversions::ConversionResult,
            crate::services::conversions::ConversionType,
            crate::services::conversions::SelectedLine,
            crate::services::cost_effects::CostBreakdown,
            crate::services::pricing::PriceRow,
            crate::services::pricing::StoredPrice,
            crate::services::pricing::TierPrice,
            crate::services::quote_prices::PriceEdit,
            crate::services::quote_prices::RecalculateRequest,
            crate::services::quote_prices::CostSummary,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;
