mod common;

use axum::http::StatusCode;
use common::TestApp;
use rstest::rstest;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_permission(app: &TestApp, slug: &str) -> Uuid {
    let response = app
        .post(
            "/api/v1/permissions",
            json!({ "name": slug, "slug": slug, "group_name": "quotes" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.id()
}

fn slugs(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|p| p["slug"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn role_permission_set_is_replaced_as_a_whole() {
    let app = TestApp::new().await;
    let role = app
        .post("/api/v1/roles", json!({ "name": "Sales", "slug": "sales" }))
        .await;
    assert_eq!(role.status, StatusCode::CREATED, "{}", role.body);
    let role_id = role.id();

    let view = create_permission(&app, "quotes.view").await;
    let edit = create_permission(&app, "quotes.edit").await;
    let send = create_permission(&app, "quotes.send").await;
    let uri = format!("/api/v1/permission-roles/roles/{role_id}/permissions");

    let first = app
        .put(&uri, json!({ "permission_ids": [view, edit] }))
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.body);
    assert_eq!(first.data()["added"].as_array().unwrap().len(), 2);

    let second = app
        .put(&uri, json!({ "permission_ids": [view, send] }))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.data()["added"], json!([send.to_string()]));
    assert_eq!(second.data()["removed"], json!([edit.to_string()]));

    let repeat = app
        .put(&uri, json!({ "permission_ids": [view, send] }))
        .await;
    assert!(repeat.data()["added"].as_array().unwrap().is_empty());
    assert!(repeat.data()["removed"].as_array().unwrap().is_empty());

    let stored = app.get(&uri).await;
    assert_eq!(slugs(stored.data()), vec!["quotes.send", "quotes.view"]);
}

#[tokio::test]
async fn unknown_permission_ids_leave_the_role_untouched() {
    let app = TestApp::new().await;
    let role_id = app
        .post("/api/v1/roles", json!({ "name": "Ops", "slug": "ops" }))
        .await
        .id();
    let view = create_permission(&app, "departures.view").await;
    let uri = format!("/api/v1/permission-roles/roles/{role_id}/permissions");
    app.put(&uri, json!({ "permission_ids": [view] })).await;

    let rejected = app
        .put(&uri, json!({ "permission_ids": [view, Uuid::new_v4()] }))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let stored = app.get(&uri).await;
    assert_eq!(slugs(stored.data()), vec!["departures.view"]);
}

#[tokio::test]
async fn slugs_are_unique_and_well_formed() {
    let app = TestApp::new().await;
    let first = app
        .post("/api/v1/roles", json!({ "name": "Admin", "slug": "admin" }))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let duplicate = app
        .post("/api/v1/roles", json!({ "name": "Other admin", "slug": "admin" }))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let malformed = app
        .post("/api/v1/roles", json!({ "name": "Bad", "slug": "Has Spaces" }))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);

    create_permission(&app, "debts.pay").await;
    let again = app
        .post(
            "/api/v1/permissions",
            json!({ "name": "Pay debts", "slug": "debts.pay" }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

async fn open_feedback(app: &TestApp) -> Uuid {
    let response = app
        .post(
            "/api/v1/feedbacks",
            json!({
                "feedback_type": "complaint",
                "priority": "high",
                "subject": "Cold breakfast",
                "content": "Breakfast on day two was served cold.",
                "rating": 2
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.data()["status"], "open");
    response.id()
}

#[tokio::test]
async fn feedback_is_assigned_then_resolved() {
    let app = TestApp::new().await;
    let feedback_id = open_feedback(&app).await;
    let agent = Uuid::new_v4();

    let assigned = app
        .patch(
            &format!("/api/v1/feedbacks/{feedback_id}/assign"),
            json!({ "assigned_to": agent }),
        )
        .await;
    assert_eq!(assigned.status, StatusCode::OK, "{}", assigned.body);
    assert_eq!(assigned.data()["status"], "in_progress");
    assert_eq!(assigned.data()["assigned_to"], agent.to_string());

    let resolved = app
        .patch(
            &format!("/api/v1/feedbacks/{feedback_id}/status"),
            json!({
                "status": "resolved",
                "actor_id": agent,
                "resolution": "  Refunded breakfast  "
            }),
        )
        .await;
    assert_eq!(resolved.status, StatusCode::OK, "{}", resolved.body);
    let data = resolved.data();
    assert_eq!(data["resolved_by"], agent.to_string());
    assert_eq!(data["resolution"], "Refunded breakfast");
    assert!(!data["resolved_at"].is_null());

    let reassign = app
        .patch(
            &format!("/api/v1/feedbacks/{feedback_id}/assign"),
            json!({ "assigned_to": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(reassign.status, StatusCode::BAD_REQUEST);

    let filtered = app.get("/api/v1/feedbacks?status=resolved").await;
    assert_eq!(filtered.data()["total"], 1);
}

#[rstest]
#[case("open")]
#[case("in_progress")]
#[case("resolved")]
#[tokio::test]
async fn closed_feedback_cannot_reopen(#[case] next: &str) {
    let app = TestApp::new().await;
    let feedback_id = open_feedback(&app).await;
    let uri = format!("/api/v1/feedbacks/{feedback_id}/status");

    let closed = app.patch(&uri, json!({ "status": "closed" })).await;
    assert_eq!(closed.status, StatusCode::OK);
    assert!(closed.data()["resolved_at"].is_null());

    let reopened = app.patch(&uri, json!({ "status": next })).await;
    assert_eq!(reopened.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feedback_rating_is_bounded() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/v1/feedbacks",
            json!({
                "feedback_type": "compliment",
                "subject": "Great guide",
                "content": "Our guide was wonderful.",
                "rating": 6
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
