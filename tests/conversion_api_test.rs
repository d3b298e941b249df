mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{seed_company, seed_rfq, RecordingCopier, RfqLine, TestApp, USER};
use quoteflow_api::{
    entities::{quote, quote_line, sales_rfq},
    models::{MethodType, QuoteStatus, SalesRfqStatus},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn app() -> TestApp {
    TestApp::new(Arc::new(RecordingCopier::default())).await
}

#[tokio::test]
async fn health_reports_the_database() {
    let app = app().await;

    let (status, body) = app.request(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn status_reports_the_service() {
    let app = app().await;

    let (status, body) = app.request(Method::GET, "/api/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "quoteflow-api");
}

#[tokio::test]
async fn openapi_document_lists_the_routes() {
    let app = app().await;

    let (status, body) = app.request(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/conversions"].is_object());
    assert!(body["paths"]["/api/v1/quote-lines/{id}/prices"].is_object());
}

#[tokio::test]
async fn rfq_and_quote_convert_over_http() {
    let app = app().await;
    let fixture = seed_company(app.db()).await;
    let rfq = seed_rfq(
        app.db(),
        &fixture,
        SalesRfqStatus::ReadyForQuote,
        &[RfqLine::new("BRK-100", MethodType::Buy)],
    )
    .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "salesRfqToQuote",
                "id": rfq.id,
                "companyId": fixture.company_id,
                "userId": USER,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let quote_id: Uuid = serde_json::from_value(body["convertedId"].clone()).unwrap();

    let stored = quote::Entity::find_by_id(quote_id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, QuoteStatus::Draft);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "quoteToSalesOrder",
                "id": quote_id,
                "companyId": fixture.company_id,
                "userId": USER,
                "selectedLines": {
                    (rfq.line_ids[0].to_string()): {
                        "quantity": "10",
                        "netUnitPrice": "12.5",
                        "convertedNetUnitPrice": "12.5",
                        "addOn": "0",
                        "convertedAddOn": "0",
                        "leadTime": 7
                    }
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["convertedId"].is_string());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/conversions")
        .header("content-type", "application/json")
        .body(Body::from("{\"type\": "))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "invoiceToPayment",
                "id": Uuid::new_v4(),
                "companyId": Uuid::new_v4(),
                "userId": USER,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn a_quote_conversion_without_lines_is_a_bad_request() {
    let app = app().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "quoteToSalesOrder",
                "id": Uuid::new_v4(),
                "companyId": Uuid::new_v4(),
                "userId": USER,
                "selectedLines": {}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn failed_conversions_report_the_cause() {
    let app = app().await;
    let fixture = seed_company(app.db()).await;
    let rfq = seed_rfq(
        app.db(),
        &fixture,
        SalesRfqStatus::Draft,
        &[RfqLine::new("BRK-100", MethodType::Buy)],
    )
    .await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "salesRfqToQuote",
                "id": rfq.id,
                "companyId": fixture.company_id,
                "userId": USER,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to convert sales RFQ to quote");
    assert!(body["details"].as_str().unwrap().contains("expected"));

    let untouched = sales_rfq::Entity::find_by_id(rfq.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched.status, SalesRfqStatus::Draft);
}

#[tokio::test]
async fn prices_can_be_edited_and_recalculated_over_http() {
    let app = app().await;
    let fixture = seed_company(app.db()).await;
    let mut line = RfqLine::new("SCR-12", MethodType::Buy);
    line.quantities = vec![1, 10];
    let rfq = seed_rfq(app.db(), &fixture, SalesRfqStatus::ReadyForQuote, &[line]).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/conversions",
            Some(json!({
                "type": "salesRfqToQuote",
                "id": rfq.id,
                "companyId": fixture.company_id,
                "userId": USER,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let line_id = rfq.line_ids[0];
    let stored = quote_line::Entity::find()
        .filter(quote_line::Column::Id.eq(line_id))
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    let mut active: quote_line::ActiveModel = stored.into();
    active.unit_cost = Set(dec!(2.5));
    active.update(app.db()).await.unwrap();

    let prices_uri = format!("/api/v1/quote-lines/{}/prices", line_id);

    let (status, body) = app.request(Method::GET, &prices_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(decimal(&rows[1]["unitCost"]), dec!(2.5));
    assert_eq!(decimal(&rows[1]["unitPrice"]), Decimal::ZERO);

    let (status, body) = app
        .request(
            Method::PUT,
            &prices_uri,
            Some(json!({
                "quantity": "10",
                "unitPrice": "4",
                "leadTime": 3,
                "userId": USER,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(decimal(&body["unitPrice"]), dec!(4));
    assert_eq!(body["leadTime"], 3);

    let (status, _) = app
        .request(
            Method::PUT,
            &prices_uri,
            Some(json!({ "quantity": "25", "unitPrice": "4", "userId": USER })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("{}/recalculate", prices_uri),
            Some(json!({ "markup": "1", "userId": USER })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let tiers = body.as_array().unwrap();
    assert_eq!(tiers.len(), 2);
    assert!(tiers.iter().all(|t| decimal(&t["unitPrice"]) == dec!(5)));

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/quote-lines/{}/costs?quantity=4", line_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["totalCost"]), dec!(10));
    assert_eq!(decimal(&body["unitCost"]), dec!(2.5));

    let (status, body) = app
        .request(
            Method::GET,
            &format!(
                "/api/v1/quote-lines/{}/costs?quantity=50000000000000000000000000000",
                line_id
            ),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn unknown_quote_lines_are_not_found() {
    let app = app().await;

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/quote-lines/{}/prices", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}
