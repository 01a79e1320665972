mod common;

use axum::http::StatusCode;
use common::{date, decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn debt_payments_cannot_exceed_the_balance() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Thu Pham").await;

    let debt = app
        .post(
            "/api/v1/financial/debts",
            json!({
                "debt_type": "receivable",
                "customer_id": customer_id,
                "original_amount": "300",
                "due_date": "2099-01-01"
            }),
        )
        .await;
    assert_eq!(debt.status, StatusCode::CREATED, "{}", debt.body);
    assert_eq!(debt.data()["status"], "pending");
    assert_eq!(debt.data()["currency"], "VND");
    let debt_id = debt.id();
    let payments_uri = format!("/api/v1/financial/debts/{debt_id}/payments");

    let partial = app.post(&payments_uri, json!({ "amount": "100" })).await;
    assert_eq!(partial.status, StatusCode::CREATED, "{}", partial.body);
    assert_eq!(partial.data()["debt"]["status"], "partial");
    assert_eq!(decimal(&partial.data()["debt"]["remaining_amount"]), dec!(200));

    let overpay = app.post(&payments_uri, json!({ "amount": "250" })).await;
    assert_eq!(overpay.status, StatusCode::BAD_REQUEST);

    let unchanged = app.get(&format!("/api/v1/financial/debts/{debt_id}")).await;
    assert_eq!(decimal(&unchanged.data()["paid_amount"]), dec!(100));

    let exact = app
        .post(&payments_uri, json!({ "amount": "200", "payment_method": "bank_transfer" }))
        .await;
    assert_eq!(exact.status, StatusCode::CREATED, "{}", exact.body);
    assert_eq!(exact.data()["debt"]["status"], "paid");
    assert_eq!(decimal(&exact.data()["debt"]["remaining_amount"]), dec!(0));

    let history = app.get(&payments_uri).await;
    assert_eq!(history.data().as_array().unwrap().len(), 2);

    let zero = app.post(&payments_uri, json!({ "amount": "0" })).await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn receivable_without_customer_is_invalid() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/v1/financial/debts",
            json!({ "debt_type": "receivable", "original_amount": "10" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overdue_sweep_feeds_the_summary() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Bao Vu").await;
    let supplier_id = app.seed_supplier("Riverside Hotel").await;

    for (body, expected) in [
        (
            json!({
                "debt_type": "receivable",
                "customer_id": customer_id,
                "original_amount": "500",
                "due_date": "2030-01-01"
            }),
            StatusCode::CREATED,
        ),
        (
            json!({
                "debt_type": "payable",
                "supplier_id": supplier_id,
                "original_amount": "120",
                "due_date": "2030-12-01"
            }),
            StatusCode::CREATED,
        ),
    ] {
        let response = app.post("/api/v1/financial/debts", body).await;
        assert_eq!(response.status, expected, "{}", response.body);
    }

    let sweep = app
        .post("/api/v1/financial/debts/mark-overdue?today=2030-02-01", json!({}))
        .await;
    assert_eq!(sweep.status, StatusCode::OK, "{}", sweep.body);
    assert_eq!(sweep.data()["updated"], 1);

    let summary = app.get("/api/v1/financial/debts/summary").await;
    assert_eq!(summary.status, StatusCode::OK);
    let data = summary.data();
    assert_eq!(decimal(&data["receivable_outstanding"]), dec!(500));
    assert_eq!(decimal(&data["receivable_overdue"]), dec!(500));
    assert_eq!(decimal(&data["payable_outstanding"]), dec!(120));
    assert_eq!(decimal(&data["payable_overdue"]), dec!(0));

    let overdue = app.get("/api/v1/financial/debts?status=overdue").await;
    assert_eq!(overdue.data()["total"], 1);
}

#[tokio::test]
async fn only_pending_transactions_can_be_approved_or_changed() {
    let app = TestApp::new().await;
    let approver = Uuid::new_v4();

    let mut ids = Vec::new();
    for (kind, amount) in [("income", "1000"), ("expense", "300"), ("expense", "50")] {
        let created = app
            .post(
                "/api/v1/financial/transactions",
                json!({
                    "transaction_type": kind,
                    "category": "tour_sales",
                    "amount": amount,
                    "transaction_date": "2030-06-15"
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        ids.push(created.id());
    }

    for id in &ids[..2] {
        let approved = app
            .post(
                &format!("/api/v1/financial/transactions/{id}/approve"),
                json!({ "approved_by": approver }),
            )
            .await;
        assert_eq!(approved.status, StatusCode::OK, "{}", approved.body);
        assert_eq!(approved.data()["status"], "approved");
    }

    let again = app
        .post(
            &format!("/api/v1/financial/transactions/{}/approve", ids[0]),
            json!({ "approved_by": approver }),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let edit = app
        .put(
            &format!("/api/v1/financial/transactions/{}", ids[0]),
            json!({ "amount": "1" }),
        )
        .await;
    assert_eq!(edit.status, StatusCode::BAD_REQUEST);

    let summary = app
        .get("/api/v1/financial/transactions/summary?from=2030-06-01&to=2030-06-30")
        .await;
    assert_eq!(summary.status, StatusCode::OK, "{}", summary.body);
    let data = summary.data();
    assert_eq!(decimal(&data["total_income"]), dec!(1000));
    assert_eq!(decimal(&data["total_expense"]), dec!(300));
    assert_eq!(decimal(&data["net"]), dec!(700));
    assert_eq!(data["approved_count"], 2);
    assert_eq!(data["pending_count"], 1);

    let rejected = app
        .post(
            &format!("/api/v1/financial/transactions/{}/reject", ids[2]),
            json!({ "rejected_by": approver, "reason": "duplicate receipt" }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::OK, "{}", rejected.body);
    assert_eq!(rejected.data()["rejection_reason"], "duplicate receipt");
}

#[tokio::test]
async fn completed_service_bookings_cannot_be_deleted() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Bay Cruises").await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 9, 1), 20).await;

    let mut bookings = Vec::new();
    for _ in 0..2 {
        let created = app
            .post(
                "/api/v1/bookings/services",
                json!({
                    "departure_id": departure_id,
                    "supplier_id": supplier_id,
                    "service_type": "cruise",
                    "service_date": "2030-09-02",
                    "quantity": 4,
                    "unit_price": "25.50"
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        assert_eq!(decimal(&created.data()["total_amount"]), dec!(102));
        bookings.push(created.id());
    }

    for status in ["confirmed", "completed"] {
        let moved = app
            .patch(
                &format!("/api/v1/bookings/services/{}/status", bookings[0]),
                json!({ "status": status }),
            )
            .await;
        assert_eq!(moved.status, StatusCode::OK, "{}", moved.body);
    }

    let blocked = app
        .delete(&format!("/api/v1/bookings/services/{}", bookings[0]))
        .await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);

    let deleted = app
        .delete(&format!("/api/v1/bookings/services/{}", bookings[1]))
        .await;
    assert_eq!(deleted.status, StatusCode::OK, "{}", deleted.body);
    assert_eq!(deleted.data()["deleted"], true);

    let gone = app
        .get(&format!("/api/v1/bookings/services/{}", bookings[1]))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn past_due_debt_waits_for_the_overdue_sweep() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Khanh Do").await;

    let created = app
        .post(
            "/api/v1/financial/debts",
            json!({
                "debt_type": "receivable",
                "customer_id": customer_id,
                "original_amount": "75",
                "due_date": "2000-01-01"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.data()["status"], "pending");
    let debt_id = created.id();

    let sweep = app
        .post("/api/v1/financial/debts/mark-overdue", json!({}))
        .await;
    assert_eq!(sweep.status, StatusCode::OK, "{}", sweep.body);
    assert_eq!(sweep.data()["updated"], 1);

    let stored = app.get(&format!("/api/v1/financial/debts/{debt_id}")).await;
    assert_eq!(stored.data()["status"], "overdue");
}

#[tokio::test]
async fn ledger_entries_must_point_at_existing_parties() {
    let app = TestApp::new().await;

    let ghost_customer = app
        .post(
            "/api/v1/financial/debts",
            json!({
                "debt_type": "receivable",
                "customer_id": Uuid::new_v4(),
                "original_amount": "10"
            }),
        )
        .await;
    assert_eq!(ghost_customer.status, StatusCode::NOT_FOUND);

    let ghost_supplier = app
        .post(
            "/api/v1/financial/debts",
            json!({
                "debt_type": "payable",
                "supplier_id": Uuid::new_v4(),
                "original_amount": "10"
            }),
        )
        .await;
    assert_eq!(ghost_supplier.status, StatusCode::NOT_FOUND);

    let ghost_departure = app
        .post(
            "/api/v1/financial/transactions",
            json!({
                "transaction_type": "expense",
                "category": "fuel",
                "amount": "40",
                "transaction_date": "2030-06-15",
                "departure_id": Uuid::new_v4()
            }),
        )
        .await;
    assert_eq!(ghost_departure.status, StatusCode::NOT_FOUND);

    let debts = app.get("/api/v1/financial/debts").await;
    assert_eq!(debts.data()["total"], 0);
    let transactions = app.get("/api/v1/financial/transactions").await;
    assert_eq!(transactions.data()["total"], 0);
}

#[tokio::test]
async fn customers_with_debts_cannot_be_deleted() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Quang Ly").await;

    let debt = app
        .post(
            "/api/v1/financial/debts",
            json!({
                "debt_type": "receivable",
                "customer_id": customer_id,
                "original_amount": "60"
            }),
        )
        .await;
    assert_eq!(debt.status, StatusCode::CREATED, "{}", debt.body);

    let delete = app.delete(&format!("/api/v1/customers/{customer_id}")).await;
    assert_eq!(delete.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn service_booking_total_must_fit() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("CTO", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 9, 1), 10).await;
    let supplier_id = app.seed_supplier("Bay Cruises").await;

    let response = app
        .post(
            "/api/v1/bookings/services",
            json!({
                "departure_id": departure_id,
                "supplier_id": supplier_id,
                "service_type": "cruise",
                "service_date": "2030-09-02",
                "quantity": 2,
                "unit_price": "79228162514264337593543950335"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);

    let bookings = app.get("/api/v1/bookings/services").await;
    assert_eq!(bookings.data()["total"], 0);
}
