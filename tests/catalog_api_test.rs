mod common;

use axum::http::StatusCode;
use common::{date, decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn customer_round_trip() {
    let app = TestApp::new().await;

    let created = app
        .post(
            "/api/v1/customers",
            json!({
                "full_name": "  Mai Hoang  ",
                "email": "mai@example.com",
                "phone": "+84 90 123 4567",
                "is_vip": true
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.data()["full_name"], "Mai Hoang");
    let id = created.id();

    let fetched = app.get(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["email"], "mai@example.com");
    assert_eq!(fetched.data()["is_vip"], true);

    let updated = app
        .put(
            &format!("/api/v1/customers/{id}"),
            json!({ "nationality": "VN", "notes": "Prefers window seats" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.body);
    assert_eq!(updated.data()["nationality"], "VN");
    assert_eq!(updated.data()["full_name"], "Mai Hoang");

    let found = app.get("/api/v1/customers?search=Hoang").await;
    assert_eq!(found.data()["total"], 1);
    let none = app.get("/api/v1/customers?search=nobody").await;
    assert_eq!(none.data()["total"], 0);

    let deleted = app.delete(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.get(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["success"], false);
}

#[tokio::test]
async fn customer_validation_and_missing_rows() {
    let app = TestApp::new().await;

    let invalid = app
        .post(
            "/api/v1/customers",
            json!({ "full_name": "X", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let blank = app.post("/api/v1/customers", json!({ "full_name": "" })).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let missing = app
        .get("/api/v1/customers/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_with_quotes_cannot_be_deleted() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Khanh Ly").await;
    let version_id = app.seed_priced_version("HUE", "75").await;

    let quote = app
        .post(
            "/api/v1/quotes",
            json!({
                "customer_id": customer_id,
                "tour_version_id": version_id,
                "departure_date": "2030-02-02",
                "adult_count": 1
            }),
        )
        .await;
    assert_eq!(quote.status, StatusCode::CREATED, "{}", quote.body);

    let deleted = app.delete(&format!("/api/v1/customers/{customer_id}")).await;
    assert_eq!(deleted.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn tour_codes_are_unique() {
    let app = TestApp::new().await;
    app.seed_priced_version("HLB", "100").await;

    let duplicate = app
        .post(
            "/api/v1/tours",
            json!({ "code": "HLB", "name": "Another", "duration_days": 2 }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let bad_range = app
        .post(
            "/api/v1/tours",
            json!({ "code": "LONG", "name": "Too long", "duration_days": 0 }),
        )
        .await;
    assert_eq!(bad_range.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn price_rows_need_an_ordered_validity_window() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("SGN", "40").await;

    let reversed = app
        .post(
            &format!("/api/v1/tours/versions/{version_id}/prices"),
            json!({
                "traveler_type": "child",
                "price": "20",
                "valid_from": "2030-12-31",
                "valid_to": "2030-01-01"
            }),
        )
        .await;
    assert_eq!(reversed.status, StatusCode::BAD_REQUEST);

    let prices = app
        .get(&format!("/api/v1/tours/versions/{version_id}/prices"))
        .await;
    assert_eq!(prices.status, StatusCode::OK);
    assert_eq!(prices.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn supplier_rating_average_follows_every_write() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Lotus Bus Co").await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 5, 5), 10).await;
    let first_guest = app.seed_guest(departure_id, "Anh").await;
    let second_guest = app.seed_guest(departure_id, "Binh").await;
    let ratings_uri = format!("/api/v1/suppliers/{supplier_id}/ratings");

    let first = app
        .post(&ratings_uri, json!({ "guest_id": first_guest, "score": 5 }))
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    let second = app
        .post(
            &ratings_uri,
            json!({ "guest_id": second_guest, "score": 4, "comment": "Late pickup" }),
        )
        .await;
    assert_eq!(second.status, StatusCode::CREATED, "{}", second.body);

    let supplier = app.get(&format!("/api/v1/suppliers/{supplier_id}")).await;
    assert_eq!(decimal(&supplier.data()["rating"]), dec!(4.5));
    assert_eq!(supplier.data()["rating_count"], 2);

    let duplicate = app
        .post(&ratings_uri, json!({ "guest_id": first_guest, "score": 1 }))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let out_of_range = app
        .post(
            &ratings_uri,
            json!({ "guest_id": first_guest, "rating_type": "punctuality", "score": 6 }),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let removed = app
        .delete(&format!("/api/v1/suppliers/ratings/{}", second.id()))
        .await;
    assert_eq!(removed.status, StatusCode::OK, "{}", removed.body);

    let supplier = app.get(&format!("/api/v1/suppliers/{supplier_id}")).await;
    assert_eq!(decimal(&supplier.data()["rating"]), dec!(5));
    assert_eq!(supplier.data()["rating_count"], 1);
}
