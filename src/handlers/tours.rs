use super::common::{created, page_and_limit};
use crate::{
    entities::{tour, tour_price, tour_version},
    errors::ServiceError,
    services::tours::{
        CreateTourPriceRequest, CreateTourRequest, CreateTourVersionRequest, TourDetail,
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct TourListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Substring of code or name
    pub search: Option<String>,
}

pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<TourListQuery>,
) -> ApiResult<PaginatedResponse<tour::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let tours = state
        .services
        .tours
        .list_tours(query.search, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(tours)))
}

pub async fn create_tour(
    State(state): State<AppState>,
    Json(payload): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<ApiResponse<tour::Model>>), ServiceError> {
    let tour = state.services.tours.create_tour(payload).await?;
    Ok(created(tour))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TourDetail> {
    let tour = state.services.tours.get_tour(id).await?;
    Ok(Json(ApiResponse::success(tour)))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
) -> ApiResult<Vec<tour_version::Model>> {
    let versions = state.services.tours.list_versions(tour_id).await?;
    Ok(Json(ApiResponse::success(versions)))
}

pub async fn create_version(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
    Json(payload): Json<CreateTourVersionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<tour_version::Model>>), ServiceError> {
    let version = state.services.tours.create_version(tour_id, payload).await?;
    Ok(created(version))
}

pub async fn list_prices(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
) -> ApiResult<Vec<tour_price::Model>> {
    let prices = state.services.tours.list_prices(version_id).await?;
    Ok(Json(ApiResponse::success(prices)))
}

pub async fn create_price(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
    Json(payload): Json<CreateTourPriceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<tour_price::Model>>), ServiceError> {
    let price = state.services.tours.create_price(version_id, payload).await?;
    Ok(created(price))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours).post(create_tour))
        .route("/tours/:id", get(get_tour))
        .route("/tours/:id/versions", get(list_versions).post(create_version))
        .route("/tours/versions/:id/prices", get(list_prices).post(create_price))
}
