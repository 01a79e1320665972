use crate::{
    entities::activity_checkin,
    errors::{ErrorResponse, ServiceError},
    services::checkins::{
        ActivityStats, AutoProcessRequest, AutoProcessResult, BulkCheckInRequest,
        BulkCheckInResult, CheckInRequest, DepartureCheckinSummary, ExcuseRequest,
        GuestCheckinEntry, ResetRequest,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitializeResult {
    pub departure_id: Uuid,
    pub created: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/departures/{id}/initialize",
    summary = "Create pending check-in rows",
    description = "Inserts a pending row for each (activity, guest) pair of the departure that has none. Safe to repeat.",
    params(("id" = Uuid, Path, description = "Departure ID")),
    responses(
        (status = 200, description = "Rows created", body = ApiResponse<InitializeResult>),
        (status = 404, description = "Departure not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn initialize(
    State(state): State<AppState>,
    Path(departure_id): Path<Uuid>,
) -> ApiResult<InitializeResult> {
    let created = state.services.checkins.initialize(departure_id).await?;
    Ok(Json(ApiResponse::success(InitializeResult {
        departure_id,
        created,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/activity-checkins/departures/{id}/summary",
    summary = "Attendance per activity of a departure",
    params(("id" = Uuid, Path, description = "Departure ID")),
    responses(
        (status = 200, description = "Summary", body = ApiResponse<DepartureCheckinSummary>),
        (status = 404, description = "Departure not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn departure_summary(
    State(state): State<AppState>,
    Path(departure_id): Path<Uuid>,
) -> ApiResult<DepartureCheckinSummary> {
    let summary = state
        .services
        .checkins
        .departure_summary(departure_id)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/activity-checkins/activities/{id}",
    summary = "Check-in rows of an activity",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Rows", body = ApiResponse<Vec<activity_checkin::Model>>),
        (status = 404, description = "Activity not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn list_for_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
) -> ApiResult<Vec<activity_checkin::Model>> {
    let rows = state
        .services
        .checkins
        .list_for_activity(activity_id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/activity-checkins/activities/{id}/stats",
    summary = "Attendance counts of an activity",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Stats", body = ApiResponse<ActivityStats>),
        (status = 404, description = "Activity not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn activity_stats(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
) -> ApiResult<ActivityStats> {
    let stats = state.services.checkins.activity_stats(activity_id).await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/activities/{id}/check-in",
    summary = "Check a guest in",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Guest checked in", body = ApiResponse<activity_checkin::Model>),
        (status = 400, description = "Invalid coordinates or guest not on the departure", body = ErrorResponse),
        (status = 404, description = "Activity or guest not found", body = ErrorResponse),
        (status = 409, description = "Guest already checked in", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn check_in(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Json(payload): Json<CheckInRequest>,
) -> ApiResult<activity_checkin::Model> {
    let row = state.services.checkins.check_in(activity_id, payload).await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/activities/{id}/bulk-check-in",
    summary = "Check several guests in at once",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = BulkCheckInRequest,
    responses(
        (status = 200, description = "Per-guest outcome", body = ApiResponse<BulkCheckInResult>),
        (status = 400, description = "Empty guest list", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn bulk_check_in(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Json(payload): Json<BulkCheckInRequest>,
) -> ApiResult<BulkCheckInResult> {
    let result = state
        .services
        .checkins
        .bulk_check_in(activity_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/activities/{id}/excuse",
    summary = "Excuse a guest from an activity",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = ExcuseRequest,
    responses(
        (status = 200, description = "Guest excused", body = ApiResponse<activity_checkin::Model>),
        (status = 400, description = "Guest already checked in or reason missing", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn excuse(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Json(payload): Json<ExcuseRequest>,
) -> ApiResult<activity_checkin::Model> {
    let row = state
        .services
        .checkins
        .mark_excused(activity_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/activities/{id}/reset",
    summary = "Reset a guest's check-in to pending",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Row reset", body = ApiResponse<activity_checkin::Model>),
        (status = 404, description = "No row for this guest", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn reset(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<activity_checkin::Model> {
    let row = state
        .services
        .checkins
        .reset(activity_id, payload.guest_id)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    get,
    path = "/api/v1/activity-checkins/guests/{id}",
    summary = "Check-in history of a guest",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "History", body = ApiResponse<Vec<GuestCheckinEntry>>),
        (status = 404, description = "Guest not found", body = ErrorResponse),
    ),
    tag = "activity-checkins"
)]
pub async fn guest_history(
    State(state): State<AppState>,
    Path(guest_id): Path<Uuid>,
) -> ApiResult<Vec<GuestCheckinEntry>> {
    let history = state.services.checkins.guest_history(guest_id).await?;
    Ok(Json(ApiResponse::success(history)))
}

#[utoipa::path(
    post,
    path = "/api/v1/activity-checkins/auto-process",
    summary = "Run check-in auto-processing",
    description = "Auto-checks-in pending guests of started auto_checkin activities and marks pending guests missed once the grace period has passed.",
    request_body = AutoProcessRequest,
    responses(
        (status = 200, description = "Processing result", body = ApiResponse<AutoProcessResult>),
    ),
    tag = "activity-checkins"
)]
pub async fn auto_process(
    State(state): State<AppState>,
    payload: Option<Json<AutoProcessRequest>>,
) -> Result<Json<ApiResponse<AutoProcessResult>>, ServiceError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    let now = request.at.unwrap_or_else(Utc::now);
    let result = state
        .services
        .checkins
        .run_auto_processing(now, request.departure_id)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/activity-checkins/departures/:id/initialize",
            post(initialize),
        )
        .route(
            "/activity-checkins/departures/:id/summary",
            get(departure_summary),
        )
        .route("/activity-checkins/activities/:id", get(list_for_activity))
        .route(
            "/activity-checkins/activities/:id/stats",
            get(activity_stats),
        )
        .route(
            "/activity-checkins/activities/:id/check-in",
            post(check_in),
        )
        .route(
            "/activity-checkins/activities/:id/bulk-check-in",
            post(bulk_check_in),
        )
        .route("/activity-checkins/activities/:id/excuse", post(excuse))
        .route("/activity-checkins/activities/:id/reset", post(reset))
        .route("/activity-checkins/guests/:id", get(guest_history))
        .route("/activity-checkins/auto-process", post(auto_process))
}
