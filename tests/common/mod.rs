#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use quoteflow_api::{
    config::AppConfig,
    db,
    entities::{company, customer, item, opportunity, sales_rfq, sales_rfq_line, sequence},
    errors::ServiceError,
    events::{Event, EventSender},
    handlers::AppServices,
    models::{ItemType, MethodType, SalesRfqStatus},
    services::{
        conversions::{
            ConversionRequest, ConversionService, ConversionType, MethodCopier, MethodCopyRequest,
            SelectedLine,
        },
        quote_prices::QuotePriceService,
        sequences::{QUOTE_SEQUENCE, SALES_ORDER_SEQUENCE},
    },
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbBackend, Statement,
};
use serde_json::Value;
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const USER: &str = "user-1";

/// A migrated SQLite database in a temporary directory, behind one connection
/// so every query and transaction sees the same state.
pub struct TestDb {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("quoteflow_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        Self {
            db: Arc::new(pool),
            config: cfg,
            _dir: dir,
        }
    }

    /// Makes every insert into `customer_part_to_item` fail. Both conversions
    /// write that table last, so the failure lands after every other write.
    pub async fn fail_customer_part_writes(&self) {
        self.db
            .execute(Statement::from_string(
                DbBackend::Sqlite,
                "CREATE TRIGGER fail_customer_part_writes BEFORE INSERT ON customer_part_to_item \
                 BEGIN SELECT RAISE(ABORT, 'forced failure'); END;"
                    .to_string(),
            ))
            .await
            .expect("failed to create trigger");
    }
}

/// Company and customer every fixture hangs off.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub company_id: Uuid,
    pub customer_id: Uuid,
}

pub async fn seed_company(db: &DatabaseConnection) -> Fixture {
    let company_id = Uuid::new_v4();
    let customer_id = Uuid::new_v4();

    company::ActiveModel {
        id: Set(company_id),
        name: Set("Acme Machining".to_string()),
        base_currency_code: Set(Some("USD".to_string())),
    }
    .insert(db)
    .await
    .expect("insert company");

    customer::ActiveModel {
        id: Set(customer_id),
        company_id: Set(company_id),
        name: Set("Globex".to_string()),
        currency_code: Set(None),
    }
    .insert(db)
    .await
    .expect("insert customer");

    seed_sequence(db, QUOTE_SEQUENCE, company_id, "Q", 0, 6, 1).await;
    seed_sequence(db, SALES_ORDER_SEQUENCE, company_id, "SO", 0, 6, 1).await;

    Fixture {
        company_id,
        customer_id,
    }
}

pub async fn seed_sequence(
    db: &DatabaseConnection,
    table: &str,
    company_id: Uuid,
    prefix: &str,
    next: i64,
    size: i32,
    step: i32,
) {
    sequence::ActiveModel {
        table_name: Set(table.to_string()),
        company_id: Set(company_id),
        prefix: Set(Some(prefix.to_string())),
        suffix: Set(None),
        next: Set(next),
        size: Set(size),
        step: Set(step),
        updated_by: Set(None),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("insert sequence");
}

pub async fn seed_item(db: &DatabaseConnection, company_id: Uuid, readable_id: &str) -> Uuid {
    let id = Uuid::new_v4();
    item::ActiveModel {
        id: Set(id),
        readable_id: Set(readable_id.to_string()),
        company_id: Set(company_id),
        name: Set(readable_id.to_string()),
        description: Set(None),
        item_type: Set(ItemType::Part),
        replenishment_system: Set(MethodType::Make.replenishment_system()),
        default_method_type: Set(MethodType::Make),
        unit_of_measure_code: Set(Some("EA".to_string())),
        active: Set(true),
        created_by: Set(USER.to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("insert item");
    id
}

/// One requested line of a seeded RFQ.
#[derive(Debug, Clone)]
pub struct RfqLine {
    pub customer_part_id: &'static str,
    pub revision: Option<&'static str>,
    pub method_type: MethodType,
    pub item_id: Option<Uuid>,
    pub quantities: Vec<i64>,
}

impl RfqLine {
    pub fn new(customer_part_id: &'static str, method_type: MethodType) -> Self {
        Self {
            customer_part_id,
            revision: None,
            method_type,
            item_id: None,
            quantities: vec![1, 10, 100],
        }
    }

    pub fn revision(mut self, revision: &'static str) -> Self {
        self.revision = Some(revision);
        self
    }

    pub fn item(mut self, item_id: Uuid) -> Self {
        self.item_id = Some(item_id);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SeededRfq {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub line_ids: Vec<Uuid>,
}

pub async fn seed_rfq(
    db: &DatabaseConnection,
    fixture: &Fixture,
    status: SalesRfqStatus,
    lines: &[RfqLine],
) -> SeededRfq {
    let id = Uuid::new_v4();
    let opportunity_id = Uuid::new_v4();

    opportunity::ActiveModel {
        id: Set(opportunity_id),
        company_id: Set(fixture.company_id),
        customer_id: Set(fixture.customer_id),
        sales_rfq_id: Set(Some(id)),
        quote_id: Set(None),
        sales_order_id: Set(None),
    }
    .insert(db)
    .await
    .expect("insert opportunity");

    sales_rfq::ActiveModel {
        id: Set(id),
        rfq_id: Set(format!("RFQ-{}", &id.simple().to_string()[..6])),
        company_id: Set(fixture.company_id),
        customer_id: Set(fixture.customer_id),
        customer_location_id: Set(None),
        customer_contact_id: Set(None),
        customer_reference: Set(Some("PO-778".to_string())),
        location_id: Set(None),
        opportunity_id: Set(opportunity_id),
        status: Set(status),
        created_by: Set(USER.to_string()),
        created_at: Set(Utc::now()),
        updated_by: Set(None),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("insert sales rfq");

    let mut line_ids = Vec::with_capacity(lines.len());
    for (sort_order, line) in lines.iter().enumerate() {
        let line_id = Uuid::new_v4();
        sales_rfq_line::ActiveModel {
            id: Set(line_id),
            sales_rfq_id: Set(id),
            company_id: Set(fixture.company_id),
            item_id: Set(line.item_id),
            customer_part_id: Set(line.customer_part_id.to_string()),
            customer_part_revision: Set(line.revision.map(str::to_string)),
            description: Set(Some(format!("{} bracket", line.customer_part_id))),
            quantity: Set(serde_json::json!(line.quantities)),
            unit_of_measure_code: Set(Some("EA".to_string())),
            method_type: Set(line.method_type),
            sort_order: Set(sort_order as i32),
        }
        .insert(db)
        .await
        .expect("insert sales rfq line");
        line_ids.push(line_id);
    }

    SeededRfq {
        id,
        opportunity_id,
        line_ids,
    }
}

/// Records copy requests instead of copying anything.
#[derive(Default)]
pub struct RecordingCopier {
    pub requests: Mutex<Vec<MethodCopyRequest>>,
}

impl RecordingCopier {
    pub fn recorded(&self) -> Vec<MethodCopyRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Waits for the spawned copy tasks to report in.
    pub async fn wait_for(&self, count: usize) -> Vec<MethodCopyRequest> {
        for _ in 0..100 {
            let recorded = self.recorded();
            if recorded.len() >= count {
                return recorded;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.recorded()
    }
}

#[async_trait]
impl MethodCopier for RecordingCopier {
    async fn copy_item_method_to_quote_line(
        &self,
        request: MethodCopyRequest,
    ) -> Result<(), ServiceError> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

/// Fails every copy.
pub struct FailingCopier;

#[async_trait]
impl MethodCopier for FailingCopier {
    async fn copy_item_method_to_quote_line(
        &self,
        request: MethodCopyRequest,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::InternalError(format!(
            "method service unavailable for {}",
            request.quote_line_id
        )))
    }
}

/// Services under test plus the receiving end of their event channel.
pub struct Harness {
    pub test_db: TestDb,
    pub conversions: ConversionService,
    pub quote_prices: QuotePriceService,
    pub events: mpsc::Receiver<Event>,
}

impl Harness {
    pub async fn new(copier: Arc<dyn MethodCopier>) -> Self {
        let test_db = TestDb::new().await;
        let (sender, events) = EventSender::channel(256);
        let sender = Arc::new(sender);
        let conversions =
            ConversionService::new(test_db.db.clone(), sender.clone(), copier, "USD");
        let quote_prices = QuotePriceService::new(test_db.db.clone(), sender);
        Self {
            test_db,
            conversions,
            quote_prices,
            events,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.test_db.db
    }

    /// Events published so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn rfq_request(fixture: &Fixture, rfq_id: Uuid) -> ConversionRequest {
    ConversionRequest {
        conversion_type: ConversionType::SalesRfqToQuote,
        id: rfq_id,
        company_id: fixture.company_id,
        user_id: USER.to_string(),
        selected_lines: None,
    }
}

pub fn quote_request(
    fixture: &Fixture,
    quote_id: Uuid,
    selected: HashMap<Uuid, SelectedLine>,
) -> ConversionRequest {
    ConversionRequest {
        conversion_type: ConversionType::QuoteToSalesOrder,
        id: quote_id,
        company_id: fixture.company_id,
        user_id: USER.to_string(),
        selected_lines: Some(selected),
    }
}

pub fn selected(quantity: i64, net_unit_price: Decimal, lead_time: i64) -> SelectedLine {
    SelectedLine {
        quantity: Decimal::from(quantity),
        net_unit_price,
        converted_net_unit_price: net_unit_price,
        add_on: Decimal::ZERO,
        converted_add_on: Decimal::ZERO,
        lead_time,
    }
}

/// Router over a fresh database, as served by the binary.
pub struct TestApp {
    router: Router,
    pub test_db: TestDb,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new(copier: Arc<dyn MethodCopier>) -> Self {
        let test_db = TestDb::new().await;
        let (sender, rx) = EventSender::channel(256);
        let event_task = tokio::spawn(quoteflow_api::events::process_events(rx));
        let sender = Arc::new(sender);

        let services = AppServices::with_method_copier(
            test_db.db.clone(),
            sender.clone(),
            copier,
            &test_db.config.default_currency,
        );
        let state = AppState {
            db: test_db.db.clone(),
            config: test_db.config.clone(),
            event_sender: sender,
            services,
        };

        Self {
            router: quoteflow_api::app_router(state),
            test_db,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.test_db.db
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("failed to build request")).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
