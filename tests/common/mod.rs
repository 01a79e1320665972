#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tourdesk_api::{
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

/// Application router over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

/// Status code plus parsed JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> Uuid {
        self.data()["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(|| panic!("response has no id: {}", self.body))
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.sweep_enabled = false;

        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel();
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, Arc::new(event_sender));
        let router = tourdesk_api::build_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates and returns a customer id.
    pub async fn seed_customer(&self, name: &str) -> Uuid {
        let response = self
            .post(
                "/api/v1/customers",
                json!({ "full_name": name, "email": "guest@example.com" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    pub async fn seed_supplier(&self, name: &str) -> Uuid {
        let response = self
            .post(
                "/api/v1/suppliers",
                json!({ "name": name, "supplier_type": "hotel" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    /// Tour with one version priced at `adult` per adult for all of 2030.
    /// Returns the version id.
    pub async fn seed_priced_version(&self, code: &str, adult: &str) -> Uuid {
        let tour = self
            .post(
                "/api/v1/tours",
                json!({ "code": code, "name": format!("Tour {code}"), "duration_days": 3 }),
            )
            .await;
        assert_eq!(tour.status, StatusCode::CREATED, "{}", tour.body);

        let version = self
            .post(
                &format!("/api/v1/tours/{}/versions", tour.id()),
                json!({ "name": "Standard" }),
            )
            .await;
        assert_eq!(version.status, StatusCode::CREATED, "{}", version.body);
        let version_id = version.id();

        let price = self
            .post(
                &format!("/api/v1/tours/versions/{version_id}/prices"),
                json!({
                    "traveler_type": "adult",
                    "price": adult,
                    "currency": "USD",
                    "valid_from": "2030-01-01",
                    "valid_to": "2030-12-31"
                }),
            )
            .await;
        assert_eq!(price.status, StatusCode::CREATED, "{}", price.body);
        version_id
    }

    /// Departure of `version_id` on `date`, returning after three days.
    pub async fn seed_departure(&self, version_id: Uuid, date: NaiveDate, capacity: i32) -> Uuid {
        let response = self
            .post(
                "/api/v1/tours/departures",
                json!({
                    "tour_version_id": version_id,
                    "departure_date": date,
                    "return_date": date + chrono::Duration::days(3),
                    "capacity": capacity
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }

    pub async fn seed_guest(&self, departure_id: Uuid, name: &str) -> Uuid {
        let response = self
            .post(
                &format!("/api/v1/tours/departures/{departure_id}/guests"),
                json!({ "full_name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.id()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Reads a decimal serialized either as a JSON string or number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}
