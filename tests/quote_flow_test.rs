mod common;

use axum::http::StatusCode;
use common::{date, decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn calculate_prices_travelers_and_services() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;

    let response = app
        .post(
            "/api/v1/quotes/calculate",
            json!({
                "tour_version_id": version_id,
                "departure_date": "2030-06-01",
                "adult_count": 2,
                "additional_services": [
                    { "name": "Kayak rental", "quantity": 1, "unit_price": "50" }
                ]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let price = response.data();
    assert_eq!(decimal(&price["subtotal"]), dec!(250));
    let lines = price["breakdown"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["label"], "adult");
    assert_eq!(decimal(&lines[0]["amount"]), dec!(200));
    assert_eq!(lines[1]["label"], "Kayak rental");
    assert_eq!(price["currency"], "USD");
}

#[tokio::test]
async fn calculate_without_a_matching_price_is_rejected() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;

    let response = app
        .post(
            "/api/v1/quotes/calculate",
            json!({
                "tour_version_id": version_id,
                "departure_date": "2031-01-15",
                "adult_count": 1
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
}

#[tokio::test]
async fn quote_lifecycle_stamps_each_transition() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Lan Nguyen").await;
    let version_id = app.seed_priced_version("SPA", "120").await;

    let created = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_date": "2030-03-10",
                "adult_count": 2,
                "discount_amount": "40",
                "valid_until": "2099-12-31"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    let quote = created.data();
    assert_eq!(quote["status"], "draft");
    assert_eq!(decimal(&quote["subtotal"]), dec!(240));
    assert_eq!(decimal(&quote["final_amount"]), dec!(200));
    assert!(quote["quote_number"].as_str().unwrap().starts_with("QT"));
    let quote_id = created.id();

    let accepted_too_early = app
        .patch(
            &format!("/api/v1/quotes/{quote_id}/status"),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(accepted_too_early.status, StatusCode::BAD_REQUEST);

    let sent = app
        .patch(
            &format!("/api/v1/quotes/{quote_id}/status"),
            json!({ "status": "sent", "actor_id": customer_id }),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK, "{}", sent.body);
    assert!(!sent.data()["sent_at"].is_null());

    let accepted = app
        .patch(
            &format!("/api/v1/quotes/{quote_id}/status"),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK, "{}", accepted.body);
    assert_eq!(accepted.data()["status"], "accepted");
    assert!(!accepted.data()["accepted_at"].is_null());

    let delete = app.delete(&format!("/api/v1/quotes/{quote_id}")).await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_quote_creation_leaves_no_row() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Minh Tran").await;
    let version_id = app.seed_priced_version("MKD", "80").await;

    let response = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_date": "2030-05-01",
                "child_count": 2
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);

    let over_discounted = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_date": "2030-05-01",
                "adult_count": 1,
                "discount_amount": "500"
            }),
        )
        .await;
    assert_eq!(over_discounted.status, StatusCode::BAD_REQUEST);

    let list = app.get("/api/v1/quotes").await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data()["total"], 0);
}

#[tokio::test]
async fn quote_for_blacklisted_customer_is_refused() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("CTO", "60").await;
    let customer = app
        .post(
            "/api/v1/customers",
            json!({ "full_name": "Blocked Guest", "is_blacklisted": true }),
        )
        .await;
    assert_eq!(customer.status, StatusCode::CREATED);

    let response = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer.id(),
                "tour_version_id": version_id,
                "departure_date": "2030-05-01",
                "adult_count": 1
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_departure_must_match_the_date() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Hoa Le").await;
    let version_id = app.seed_priced_version("NTR", "90").await;
    let departure_id = app.seed_departure(version_id, date(2030, 8, 1), 10).await;

    let response = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_id": departure_id,
                "departure_date": "2030-08-02",
                "adult_count": 1
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_id": departure_id,
                "departure_date": "2030-08-01",
                "adult_count": 1
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
}

#[tokio::test]
async fn sweep_expires_only_overdue_sent_quotes() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Quang Do").await;
    let version_id = app.seed_priced_version("DLT", "70").await;

    let mut ids = Vec::new();
    for valid_until in ["2030-01-10", "2030-03-01"] {
        let created = app
            .post(
                "/api/v1/quotes",
                json!({
                    "customer_id": customer_id,
                    "tour_version_id": version_id,
                    "departure_date": "2030-04-01",
                    "adult_count": 1,
                    "valid_until": valid_until
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        let id = created.id();
        let sent = app
            .patch(
                &format!("/api/v1/quotes/{id}/status"),
                json!({ "status": "sent" }),
            )
            .await;
        assert_eq!(sent.status, StatusCode::OK);
        ids.push(id);
    }

    let sweep = app.post("/api/v1/quotes/expire?today=2030-02-01", json!({})).await;
    assert_eq!(sweep.status, StatusCode::OK, "{}", sweep.body);
    assert_eq!(sweep.data()["updated"], 1);

    let first = app.get(&format!("/api/v1/quotes/{}", ids[0])).await;
    assert_eq!(first.data()["status"], "expired");
    let second = app.get(&format!("/api/v1/quotes/{}", ids[1])).await;
    assert_eq!(second.data()["status"], "sent");
}

#[tokio::test]
async fn calculate_rejects_amounts_that_overflow() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;

    let response = app
        .post(
            "/api/v1/quotes/calculate",
            json!({
                "tour_version_id": version_id,
                "departure_date": "2030-06-01",
                "adult_count": 1,
                "additional_services": [
                    {
                        "name": "Private charter",
                        "quantity": 2,
                        "unit_price": "79228162514264337593543950335"
                    }
                ]
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
}

async fn draft_quote(app: &TestApp, valid_until: &str) -> uuid::Uuid {
    let customer_id = app.seed_customer("Hoa Pham").await;
    let version_id = app.seed_priced_version("DLT", "100").await;
    let created = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_date": "2030-08-01",
                "adult_count": 2,
                "additional_services": [
                    { "name": "Boat tour", "quantity": 2, "unit_price": "10" }
                ],
                "discount_amount": "20",
                "valid_until": valid_until
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(decimal(&created.data()["subtotal"]), dec!(220));
    created.id()
}

#[tokio::test]
async fn editing_a_draft_reprices_it() {
    let app = TestApp::new().await;
    let quote_id = draft_quote(&app, "2099-12-31").await;
    let uri = format!("/api/v1/quotes/{quote_id}");

    let more_adults = app.put(&uri, json!({ "adult_count": 3 })).await;
    assert_eq!(more_adults.status, StatusCode::OK, "{}", more_adults.body);
    let quote = more_adults.data();
    assert_eq!(quote["adult_count"], 3);
    assert_eq!(decimal(&quote["subtotal"]), dec!(320));
    assert_eq!(decimal(&quote["final_amount"]), dec!(300));
    assert_eq!(quote["additional_services"].as_array().unwrap().len(), 1);

    let no_services = app
        .put(&uri, json!({ "additional_services": [], "notes": "walk-in group" }))
        .await;
    assert_eq!(no_services.status, StatusCode::OK, "{}", no_services.body);
    assert_eq!(decimal(&no_services.data()["subtotal"]), dec!(300));
    assert_eq!(decimal(&no_services.data()["final_amount"]), dec!(280));
    assert_eq!(no_services.data()["notes"], "walk-in group");

    let over_discount = app.put(&uri, json!({ "discount_amount": "301" })).await;
    assert_eq!(over_discount.status, StatusCode::BAD_REQUEST);
    let unchanged = app.get(&uri).await;
    assert_eq!(decimal(&unchanged.data()["discount_amount"]), dec!(20));

    let nobody = app.put(&uri, json!({ "adult_count": 0 })).await;
    assert_eq!(nobody.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_drafts_can_be_edited() {
    let app = TestApp::new().await;
    let quote_id = draft_quote(&app, "2099-12-31").await;

    let sent = app
        .patch(
            &format!("/api/v1/quotes/{quote_id}/status"),
            json!({ "status": "sent" }),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK);

    let edit = app
        .put(&format!("/api/v1/quotes/{quote_id}"), json!({ "adult_count": 4 }))
        .await;
    assert_eq!(edit.status, StatusCode::BAD_REQUEST);
    let stored = app.get(&format!("/api/v1/quotes/{quote_id}")).await;
    assert_eq!(stored.data()["adult_count"], 2);
}

#[tokio::test]
async fn lapsed_quote_cannot_be_accepted() {
    let app = TestApp::new().await;
    let quote_id = draft_quote(&app, "2000-01-01").await;
    let uri = format!("/api/v1/quotes/{quote_id}/status");

    let sent = app.patch(&uri, json!({ "status": "sent" })).await;
    assert_eq!(sent.status, StatusCode::OK, "{}", sent.body);

    let accepted = app.patch(&uri, json!({ "status": "accepted" })).await;
    assert_eq!(accepted.status, StatusCode::BAD_REQUEST);
    let stored = app.get(&format!("/api/v1/quotes/{quote_id}")).await;
    assert_eq!(stored.data()["status"], "sent");
    assert!(stored.data()["accepted_at"].is_null());
}
