mod common;

use axum::http::StatusCode;
use common::{date, decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

struct Trip {
    departure_id: Uuid,
    guests: Vec<Uuid>,
    /// Starts 2030-07-01 09:00 UTC, manual check-in
    walk_id: Uuid,
    /// Starts 2030-07-01 14:00 UTC, auto check-in
    cruise_id: Uuid,
}

async fn seed_trip(app: &TestApp, guests: usize) -> Trip {
    let version_id = app.seed_priced_version("HLB", "100").await;
    let departure_id = app.seed_departure(version_id, date(2030, 7, 1), 10).await;

    let mut guest_ids = Vec::new();
    for n in 0..guests {
        guest_ids.push(app.seed_guest(departure_id, &format!("Guest {n}")).await);
    }

    let walk_id = add_activity(app, departure_id, "Old quarter walk", "2030-07-01T09:00:00Z", false).await;
    let cruise_id = add_activity(app, departure_id, "Sunset cruise", "2030-07-01T14:00:00Z", true).await;

    Trip {
        departure_id,
        guests: guest_ids,
        walk_id,
        cruise_id,
    }
}

async fn add_activity(
    app: &TestApp,
    departure_id: Uuid,
    title: &str,
    starts_at: &str,
    auto_checkin: bool,
) -> Uuid {
    let response = app
        .post(
            &format!("/api/v1/tours/departures/{departure_id}/activities"),
            json!({
                "day_number": 1,
                "title": title,
                "starts_at": starts_at,
                "auto_checkin": auto_checkin
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.id()
}

fn status_of(rows: &Value, guest_id: Uuid) -> String {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|row| row["guest_id"] == guest_id.to_string())
        .map(|row| row["status"].as_str().unwrap().to_string())
        .unwrap_or_else(|| panic!("no row for guest {guest_id}"))
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 3).await;
    let uri = format!(
        "/api/v1/activity-checkins/departures/{}/initialize",
        trip.departure_id
    );

    let first = app.post(&uri, json!({})).await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.data()["created"], 6);

    let second = app.post(&uri, json!({})).await;
    assert_eq!(second.data()["created"], 0);

    app.seed_guest(trip.departure_id, "Late booker").await;
    let third = app.post(&uri, json!({})).await;
    assert_eq!(third.data()["created"], 2);

    let rows = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.walk_id))
        .await;
    assert_eq!(rows.data().as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn double_check_in_is_a_conflict() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 1).await;
    let uri = format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id);

    let first = app
        .post(
            &uri,
            json!({ "guest_id": trip.guests[0], "latitude": 21.03, "longitude": 105.85 }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.data()["status"], "checked_in");
    assert_eq!(first.data()["method"], "manual");

    let second = app.post(&uri, json!({ "guest_id": trip.guests[0] })).await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let half_coordinates = app
        .post(&uri, json!({ "guest_id": trip.guests[0], "latitude": 21.03 }))
        .await;
    assert_eq!(half_coordinates.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn guest_from_another_departure_cannot_check_in() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 1).await;
    let version_id = app.seed_priced_version("SPA", "50").await;
    let other_departure = app.seed_departure(version_id, date(2030, 8, 1), 5).await;
    let outsider = app.seed_guest(other_departure, "Outsider").await;

    let response = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id),
            json!({ "guest_id": outsider }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_check_in_reports_each_guest() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 3).await;
    let stranger = Uuid::new_v4();

    let single = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id),
            json!({ "guest_id": trip.guests[0] }),
        )
        .await;
    assert_eq!(single.status, StatusCode::OK);

    let bulk = app
        .post(
            &format!(
                "/api/v1/activity-checkins/activities/{}/bulk-check-in",
                trip.walk_id
            ),
            json!({
                "guest_ids": [trip.guests[0], trip.guests[1], trip.guests[2], trip.guests[1], stranger]
            }),
        )
        .await;
    assert_eq!(bulk.status, StatusCode::OK, "{}", bulk.body);
    let data = bulk.data();
    assert_eq!(data["checked_in"].as_array().unwrap().len(), 2);
    assert_eq!(data["already_checked_in"], json!([trip.guests[0]]));
    assert_eq!(data["not_in_departure"], json!([stranger]));

    let empty = app
        .post(
            &format!(
                "/api/v1/activity-checkins/activities/{}/bulk-check-in",
                trip.walk_id
            ),
            json!({ "guest_ids": [] }),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let stats = app
        .get(&format!(
            "/api/v1/activity-checkins/activities/{}/stats",
            trip.walk_id
        ))
        .await;
    assert_eq!(stats.data()["checked_in"], 3);
    assert_eq!(decimal(&stats.data()["attendance_rate"]), dec!(100));
}

#[tokio::test]
async fn auto_processing_never_touches_excused_guests() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 3).await;
    let init = app
        .post(
            &format!(
                "/api/v1/activity-checkins/departures/{}/initialize",
                trip.departure_id
            ),
            json!({}),
        )
        .await;
    assert_eq!(init.status, StatusCode::OK);

    for activity_id in [trip.walk_id, trip.cruise_id] {
        let excused = app
            .post(
                &format!("/api/v1/activity-checkins/activities/{activity_id}/excuse"),
                json!({ "guest_id": trip.guests[0], "reason": "seasick" }),
            )
            .await;
        assert_eq!(excused.status, StatusCode::OK, "{}", excused.body);
        assert_eq!(excused.data()["status"], "excused");
    }
    let checked_in = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id),
            json!({ "guest_id": trip.guests[1] }),
        )
        .await;
    assert_eq!(checked_in.status, StatusCode::OK);

    let early = app
        .post(
            "/api/v1/activity-checkins/auto-process",
            json!({ "departure_id": trip.departure_id, "at": "2030-07-01T09:10:00Z" }),
        )
        .await;
    assert_eq!(early.status, StatusCode::OK, "{}", early.body);
    assert_eq!(early.data()["marked_missed"], 0);
    assert_eq!(early.data()["auto_checked_in"], 0);

    let later = app
        .post(
            "/api/v1/activity-checkins/auto-process",
            json!({ "departure_id": trip.departure_id, "at": "2030-07-01T15:00:00Z" }),
        )
        .await;
    assert_eq!(later.status, StatusCode::OK, "{}", later.body);
    assert_eq!(later.data()["activities_processed"], 2);
    assert_eq!(later.data()["marked_missed"], 1);
    assert_eq!(later.data()["auto_checked_in"], 2);

    let walk = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.walk_id))
        .await;
    assert_eq!(status_of(walk.data(), trip.guests[0]), "excused");
    assert_eq!(status_of(walk.data(), trip.guests[1]), "checked_in");
    assert_eq!(status_of(walk.data(), trip.guests[2]), "missed");

    let cruise = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.cruise_id))
        .await;
    assert_eq!(status_of(cruise.data(), trip.guests[0]), "excused");
    assert_eq!(status_of(cruise.data(), trip.guests[1]), "checked_in");
    assert_eq!(status_of(cruise.data(), trip.guests[2]), "checked_in");

    let excuse_checked_in = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/excuse", trip.walk_id),
            json!({ "guest_id": trip.guests[1], "reason": "left early" }),
        )
        .await;
    assert_eq!(excuse_checked_in.status, StatusCode::BAD_REQUEST);

    let summary = app
        .get(&format!(
            "/api/v1/activity-checkins/departures/{}/summary",
            trip.departure_id
        ))
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.data()["guest_count"], 3);
    // 3 checked in out of 4 eligible rows
    assert_eq!(decimal(&summary.data()["overall_attendance_rate"]), dec!(75));
}

#[tokio::test]
async fn reset_returns_a_row_to_pending() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 1).await;
    let guest_id = trip.guests[0];

    let missing = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/reset", trip.walk_id),
            json!({ "guest_id": guest_id }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    app.post(
        &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id),
        json!({ "guest_id": guest_id }),
    )
    .await;
    let reset = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/reset", trip.walk_id),
            json!({ "guest_id": guest_id }),
        )
        .await;
    assert_eq!(reset.status, StatusCode::OK, "{}", reset.body);
    assert_eq!(reset.data()["status"], "pending");
    assert!(reset.data()["checked_in_at"].is_null());

    let history = app
        .get(&format!("/api/v1/activity-checkins/guests/{guest_id}"))
        .await;
    assert_eq!(history.status, StatusCode::OK);
    let entries = history.data().as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["activity_title"], "Old quarter walk");
}

#[tokio::test]
async fn missed_and_excused_guests_can_still_check_in() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 2).await;
    let (late, excused) = (trip.guests[0], trip.guests[1]);
    let check_in_uri = format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id);

    app.post(
        &format!(
            "/api/v1/activity-checkins/departures/{}/initialize",
            trip.departure_id
        ),
        json!({}),
    )
    .await;
    let excuse = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/excuse", trip.walk_id),
            json!({ "guest_id": excused, "reason": "migraine" }),
        )
        .await;
    assert_eq!(excuse.status, StatusCode::OK, "{}", excuse.body);
    assert_eq!(excuse.data()["excuse_reason"], "migraine");

    let processed = app
        .post(
            "/api/v1/activity-checkins/auto-process",
            json!({ "departure_id": trip.departure_id, "at": "2030-07-01T10:00:00Z" }),
        )
        .await;
    assert_eq!(processed.status, StatusCode::OK, "{}", processed.body);
    let walk = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.walk_id))
        .await;
    assert_eq!(status_of(walk.data(), late), "missed");

    let late_arrival = app.post(&check_in_uri, json!({ "guest_id": late })).await;
    assert_eq!(late_arrival.status, StatusCode::OK, "{}", late_arrival.body);
    assert_eq!(late_arrival.data()["status"], "checked_in");
    assert!(!late_arrival.data()["checked_in_at"].is_null());

    let recovered = app.post(&check_in_uri, json!({ "guest_id": excused })).await;
    assert_eq!(recovered.status, StatusCode::OK, "{}", recovered.body);
    assert_eq!(recovered.data()["status"], "checked_in");
    assert!(recovered.data()["excuse_reason"].is_null());

    let walk = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.walk_id))
        .await;
    assert_eq!(walk.data().as_array().unwrap().len(), 2);
    assert_eq!(status_of(walk.data(), late), "checked_in");
    assert_eq!(status_of(walk.data(), excused), "checked_in");
}

#[tokio::test]
async fn checked_in_guest_cannot_be_excused() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 1).await;
    let guest_id = trip.guests[0];

    let checked_in = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.cruise_id),
            json!({ "guest_id": guest_id }),
        )
        .await;
    assert_eq!(checked_in.status, StatusCode::OK, "{}", checked_in.body);

    let excuse = app
        .post(
            &format!("/api/v1/activity-checkins/activities/{}/excuse", trip.cruise_id),
            json!({ "guest_id": guest_id, "reason": "changed mind" }),
        )
        .await;
    assert_eq!(excuse.status, StatusCode::BAD_REQUEST);

    let cruise = app
        .get(&format!("/api/v1/activity-checkins/activities/{}", trip.cruise_id))
        .await;
    assert_eq!(status_of(cruise.data(), guest_id), "checked_in");
}

#[tokio::test]
async fn removing_a_guest_drops_their_check_ins() {
    let app = TestApp::new().await;
    let trip = seed_trip(&app, 2).await;
    let (leaving, staying) = (trip.guests[0], trip.guests[1]);

    let init = app
        .post(
            &format!(
                "/api/v1/activity-checkins/departures/{}/initialize",
                trip.departure_id
            ),
            json!({}),
        )
        .await;
    assert_eq!(init.data()["created"], 4);
    app.post(
        &format!("/api/v1/activity-checkins/activities/{}/check-in", trip.walk_id),
        json!({ "guest_id": leaving }),
    )
    .await;

    let removed = app
        .delete(&format!(
            "/api/v1/tours/departures/{}/guests/{leaving}",
            trip.departure_id
        ))
        .await;
    assert!(removed.status.is_success(), "{}", removed.body);

    for activity_id in [trip.walk_id, trip.cruise_id] {
        let rows = app
            .get(&format!("/api/v1/activity-checkins/activities/{activity_id}"))
            .await;
        let rows = rows.data().as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["guest_id"], staying.to_string());
    }

    let history = app
        .get(&format!("/api/v1/activity-checkins/guests/{leaving}"))
        .await;
    assert_eq!(history.status, StatusCode::NOT_FOUND);
}
