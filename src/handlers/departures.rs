//! Departure operations: schedule, guests, staffing and special requests.

use super::common::{created, page_and_limit, DeletedResponse};
use crate::{
    entities::{
        departure_activity, departure_guest,
        guest_special_request::{self, SpecialRequestStatus},
        staff_assignment,
        tour_departure::{self, DepartureStatus},
    },
    errors::ServiceError,
    services::{
        departures::{
            AddActivityRequest, AddGuestRequest, CreateDepartureRequest, DepartureFilter,
            DepartureOverview, UpdateDepartureStatusRequest,
        },
        special_requests::{
            CreateSpecialRequestRequest, SpecialRequestFilter, UpdateSpecialRequestStatusRequest,
        },
        staff::AssignStaffRequest,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct DepartureListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<DepartureStatus>,
    pub tour_version_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpecialRequestListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub departure_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub status: Option<SpecialRequestStatus>,
}

pub async fn list_departures(
    State(state): State<AppState>,
    Query(query): Query<DepartureListQuery>,
) -> ApiResult<PaginatedResponse<tour_departure::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = DepartureFilter {
        status: query.status,
        tour_version_id: query.tour_version_id,
        from: query.from,
        to: query.to,
    };
    let departures = state
        .services
        .departures
        .list_departures(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(departures)))
}

pub async fn create_departure(
    State(state): State<AppState>,
    Json(payload): Json<CreateDepartureRequest>,
) -> Result<(StatusCode, Json<ApiResponse<tour_departure::Model>>), ServiceError> {
    let departure = state.services.departures.create_departure(payload).await?;
    Ok(created(departure))
}

pub async fn get_departure(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<tour_departure::Model> {
    let departure = state.services.departures.get_departure(id).await?;
    Ok(Json(ApiResponse::success(departure)))
}

pub async fn update_departure_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDepartureStatusRequest>,
) -> ApiResult<tour_departure::Model> {
    let departure = state
        .services
        .departures
        .update_departure_status(id, payload.status)
        .await?;
    Ok(Json(ApiResponse::success(departure)))
}

pub async fn departure_overview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DepartureOverview> {
    let overview = state.services.departures.overview(id).await?;
    Ok(Json(ApiResponse::success(overview)))
}

pub async fn list_guests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<departure_guest::Model>> {
    let guests = state.services.departures.list_guests(id).await?;
    Ok(Json(ApiResponse::success(guests)))
}

pub async fn add_guest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddGuestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<departure_guest::Model>>), ServiceError> {
    let guest = state.services.departures.add_guest(id, payload).await?;
    Ok(created(guest))
}

pub async fn remove_guest(
    State(state): State<AppState>,
    Path((id, guest_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<DeletedResponse> {
    state.services.departures.remove_guest(id, guest_id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(guest_id))))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<departure_activity::Model>> {
    let activities = state.services.departures.list_activities(id).await?;
    Ok(Json(ApiResponse::success(activities)))
}

pub async fn add_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddActivityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<departure_activity::Model>>), ServiceError> {
    let activity = state.services.departures.add_activity(id, payload).await?;
    Ok(created(activity))
}

pub async fn list_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<staff_assignment::Model>> {
    let staff = state.services.staff.list_assignments(id).await?;
    Ok(Json(ApiResponse::success(staff)))
}

pub async fn assign_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignStaffRequest>,
) -> Result<(StatusCode, Json<ApiResponse<staff_assignment::Model>>), ServiceError> {
    let assignment = state.services.staff.assign_staff(id, payload).await?;
    Ok(created(assignment))
}

pub async fn remove_staff_assignment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.staff.remove_assignment(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub async fn staff_assignments(
    State(state): State<AppState>,
    Path(staff_user_id): Path<Uuid>,
) -> ApiResult<Vec<staff_assignment::Model>> {
    let assignments = state.services.staff.list_for_staff(staff_user_id).await?;
    Ok(Json(ApiResponse::success(assignments)))
}

pub async fn list_special_requests(
    State(state): State<AppState>,
    Query(query): Query<SpecialRequestListQuery>,
) -> ApiResult<PaginatedResponse<guest_special_request::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = SpecialRequestFilter {
        departure_id: query.departure_id,
        guest_id: query.guest_id,
        status: query.status,
    };
    let requests = state
        .services
        .special_requests
        .list_requests(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(requests)))
}

pub async fn create_special_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateSpecialRequestRequest>,
) -> Result<(StatusCode, Json<ApiResponse<guest_special_request::Model>>), ServiceError> {
    let request = state.services.special_requests.create_request(payload).await?;
    Ok(created(request))
}

pub async fn update_special_request_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSpecialRequestStatusRequest>,
) -> ApiResult<guest_special_request::Model> {
    let request = state
        .services
        .special_requests
        .update_status(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn delete_special_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.special_requests.delete_request(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tours/departures",
            get(list_departures).post(create_departure),
        )
        .route("/tours/departures/:id", get(get_departure))
        .route(
            "/tours/departures/:id/status",
            patch(update_departure_status),
        )
        .route("/tours/departures/:id/overview", get(departure_overview))
        .route(
            "/tours/departures/:id/guests",
            get(list_guests).post(add_guest),
        )
        .route(
            "/tours/departures/:id/guests/:guest_id",
            delete(remove_guest),
        )
        .route(
            "/tours/departures/:id/activities",
            get(list_activities).post(add_activity),
        )
        .route(
            "/tours/departures/:id/staff",
            get(list_staff).post(assign_staff),
        )
        .route(
            "/tours/staff-assignments/:id",
            delete(remove_staff_assignment),
        )
        .route(
            "/tours/staff/:staff_user_id/assignments",
            get(staff_assignments),
        )
        .route(
            "/tours/special-requests",
            get(list_special_requests).post(create_special_request),
        )
        .route(
            "/tours/special-requests/:id/status",
            patch(update_special_request_status),
        )
        .route(
            "/tours/special-requests/:id",
            delete(delete_special_request),
        )
}
