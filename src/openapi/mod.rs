use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tourdesk API",
        version = "0.1.0",
        description = r#"
# Tour Operator Back Office

Customers, tours and their versioned price lists, quotes, departures with
guests and staff, supplier bookings, debts and cash transactions, activity
check-in and role based permissions.

## Responses

Successful calls return an envelope:

```json
{ "success": true, "data": { }, "meta": { "request_id": "...", "timestamp": "..." } }
```

Errors carry an HTTP status and a JSON body with `error` and `message`.

## Pagination

List endpoints accept `page` (1-based, default 1) and `limit`
(default 20, capped by configuration).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "quotes", description = "Price calculation and quote lifecycle"),
        (name = "activity-checkins", description = "Per-activity guest attendance"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::quotes::list_quotes,
        crate::handlers::quotes::calculate_quote,
        crate::handlers::quotes::create_quote,
        crate::handlers::quotes::get_quote,
        crate::handlers::quotes::update_quote,
        crate::handlers::quotes::update_quote_status,
        crate::handlers::quotes::delete_quote,
        crate::handlers::quotes::expire_quotes,
        crate::handlers::checkins::initialize,
        crate::handlers::checkins::departure_summary,
        crate::handlers::checkins::list_for_activity,
        crate::handlers::checkins::activity_stats,
        crate::handlers::checkins::check_in,
        crate::handlers::checkins::bulk_check_in,
        crate::handlers::checkins::excuse,
        crate::handlers::checkins::reset,
        crate::handlers::checkins::guest_history,
        crate::handlers::checkins::auto_process,
        crate::health::health_check,
        crate::health::readiness_check,
        crate::health::liveness_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse,
            crate::handlers::common::DeletedResponse,
            crate::handlers::common::SweepResult,
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn openapi_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDocV1::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_quote_and_checkin_paths() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Tourdesk API"));
        assert!(json.contains("/api/v1/quotes/{id}/status"));
        assert!(json.contains("/api/v1/activity-checkins/auto-process"));
        assert!(json.contains("/health/ready"));
    }
}
