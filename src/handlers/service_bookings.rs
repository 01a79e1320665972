use super::common::{created, page_and_limit, DeletedResponse};
use crate::{
    entities::service_booking::{self, ServiceBookingStatus},
    errors::ServiceError,
    services::service_bookings::{
        CreateServiceBookingRequest, ServiceBookingFilter, UpdateServiceBookingRequest,
        UpdateServiceBookingStatusRequest,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ServiceBookingListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub departure_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub status: Option<ServiceBookingStatus>,
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ServiceBookingListQuery>,
) -> ApiResult<PaginatedResponse<service_booking::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = ServiceBookingFilter {
        departure_id: query.departure_id,
        supplier_id: query.supplier_id,
        status: query.status,
    };
    let bookings = state
        .services
        .service_bookings
        .list_bookings(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(bookings)))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateServiceBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<service_booking::Model>>), ServiceError> {
    let booking = state.services.service_bookings.create_booking(payload).await?;
    Ok(created(booking))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<service_booking::Model> {
    let booking = state.services.service_bookings.get_booking(id).await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceBookingRequest>,
) -> ApiResult<service_booking::Model> {
    let booking = state
        .services
        .service_bookings
        .update_booking(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceBookingStatusRequest>,
) -> ApiResult<service_booking::Model> {
    let booking = state
        .services
        .service_bookings
        .update_status(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.service_bookings.delete_booking(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/services", get(list_bookings).post(create_booking))
        .route(
            "/bookings/services/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/bookings/services/:id/status", patch(update_booking_status))
}
