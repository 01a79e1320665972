mod common;

use axum::http::StatusCode;
use common::{date, decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn departures_refuse_guests_beyond_capacity() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 4, 1), 2).await;

    app.seed_guest(departure_id, "First").await;
    app.seed_guest(departure_id, "Second").await;

    let third = app
        .post(
            &format!("/api/v1/tours/departures/{departure_id}/guests"),
            json!({ "full_name": "Third" }),
        )
        .await;
    assert_eq!(third.status, StatusCode::CONFLICT);

    let guests = app
        .get(&format!("/api/v1/tours/departures/{departure_id}/guests"))
        .await;
    assert_eq!(guests.data().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn return_date_cannot_precede_departure() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;

    let response = app
        .post(
            "/api/v1/tours/departures",
            json!({
                "tour_version_id": version_id,
                "departure_date": "2030-04-10",
                "return_date": "2030-04-09",
                "capacity": 10
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn departure_status_follows_its_lifecycle() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 4, 1), 5).await;
    let status_uri = format!("/api/v1/tours/departures/{departure_id}/status");

    let skip = app.patch(&status_uri, json!({ "status": "completed" })).await;
    assert_eq!(skip.status, StatusCode::BAD_REQUEST);

    let confirmed = app.patch(&status_uri, json!({ "status": "confirmed" })).await;
    assert_eq!(confirmed.status, StatusCode::OK, "{}", confirmed.body);

    let cancelled = app.patch(&status_uri, json!({ "status": "cancelled" })).await;
    assert_eq!(cancelled.status, StatusCode::OK);

    let late_guest = app
        .post(
            &format!("/api/v1/tours/departures/{departure_id}/guests"),
            json!({ "full_name": "Too late" }),
        )
        .await;
    assert_eq!(late_guest.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overview_counts_guests_staff_and_active_bookings() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 4, 1), 10).await;
    let supplier_id = app.seed_supplier("Harbour Hotel").await;
    let guide = Uuid::new_v4();

    app.seed_guest(departure_id, "Guest A").await;
    app.seed_guest(departure_id, "Guest B").await;

    let staff_uri = format!("/api/v1/tours/departures/{departure_id}/staff");
    let assigned = app
        .post(&staff_uri, json!({ "staff_user_id": guide, "role": "tour_guide" }))
        .await;
    assert_eq!(assigned.status, StatusCode::CREATED, "{}", assigned.body);
    let again = app
        .post(&staff_uri, json!({ "staff_user_id": guide, "role": "tour_guide" }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let mut booking_ids = Vec::new();
    for price in ["100", "40"] {
        let booking = app
            .post(
                "/api/v1/bookings/services",
                json!({
                    "departure_id": departure_id,
                    "supplier_id": supplier_id,
                    "service_type": "hotel",
                    "service_date": "2030-04-01",
                    "quantity": 2,
                    "unit_price": price
                }),
            )
            .await;
        assert_eq!(booking.status, StatusCode::CREATED, "{}", booking.body);
        booking_ids.push(booking.id());
    }
    let cancelled = app
        .patch(
            &format!("/api/v1/bookings/services/{}/status", booking_ids[1]),
            json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);

    let overview = app
        .get(&format!("/api/v1/tours/departures/{departure_id}/overview"))
        .await;
    assert_eq!(overview.status, StatusCode::OK, "{}", overview.body);
    let data = overview.data();
    assert_eq!(data["guest_count"], 2);
    assert_eq!(data["seats_left"], 8);
    assert_eq!(data["staff"].as_array().unwrap().len(), 1);
    assert_eq!(data["service_bookings"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&data["service_total"]), dec!(200));

    let schedule = app
        .get(&format!("/api/v1/tours/staff/{guide}/assignments"))
        .await;
    assert_eq!(schedule.data().as_array().unwrap().len(), 1);

    let unassigned = app
        .delete(&format!("/api/v1/tours/staff-assignments/{}", assigned.id()))
        .await;
    assert_eq!(unassigned.status, StatusCode::OK);
}

#[tokio::test]
async fn special_requests_follow_the_guest() {
    let app = TestApp::new().await;
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 4, 1), 10).await;
    let guest_id = app.seed_guest(departure_id, "Vegetarian guest").await;
    let handler = Uuid::new_v4();

    let created = app
        .post(
            "/api/v1/tours/special-requests",
            json!({
                "guest_id": guest_id,
                "request_type": "dietary",
                "description": "No fish sauce"
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.data()["departure_id"], departure_id.to_string());
    assert_eq!(created.data()["status"], "pending");
    let request_id = created.id();

    let acknowledged = app
        .patch(
            &format!("/api/v1/tours/special-requests/{request_id}/status"),
            json!({ "status": "acknowledged", "handled_by": handler }),
        )
        .await;
    assert_eq!(acknowledged.status, StatusCode::OK, "{}", acknowledged.body);
    assert_eq!(acknowledged.data()["handled_by"], handler.to_string());
    assert!(!acknowledged.data()["handled_at"].is_null());

    let backwards = app
        .patch(
            &format!("/api/v1/tours/special-requests/{request_id}/status"),
            json!({ "status": "pending" }),
        )
        .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);

    let removed = app
        .delete(&format!(
            "/api/v1/tours/departures/{departure_id}/guests/{guest_id}"
        ))
        .await;
    assert_eq!(removed.status, StatusCode::OK, "{}", removed.body);

    let remaining = app
        .get(&format!("/api/v1/tours/special-requests?departure_id={departure_id}"))
        .await;
    assert_eq!(remaining.status, StatusCode::OK, "{}", remaining.body);
    assert_eq!(remaining.data()["total"], 0);
}
