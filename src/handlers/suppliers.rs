use super::common::{created, page_and_limit, DeletedResponse};
use crate::{
    entities::{
        supplier::{self, SupplierType},
        supplier_rating,
    },
    errors::ServiceError,
    services::{
        supplier_ratings::{CreateSupplierRatingRequest, UpdateSupplierRatingRequest},
        suppliers::{CreateSupplierRequest, SupplierFilter, UpdateSupplierRequest},
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct SupplierListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub supplier_type: Option<SupplierType>,
    pub is_active: Option<bool>,
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierListQuery>,
) -> ApiResult<PaginatedResponse<supplier::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = SupplierFilter {
        search: query.search,
        supplier_type: query.supplier_type,
        is_active: query.is_active,
    };
    let suppliers = state
        .services
        .suppliers
        .list_suppliers(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(suppliers)))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<ApiResponse<supplier::Model>>), ServiceError> {
    let supplier = state.services.suppliers.create_supplier(payload).await?;
    Ok(created(supplier))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<supplier::Model> {
    let supplier = state.services.suppliers.get_supplier(id).await?;
    Ok(Json(ApiResponse::success(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> ApiResult<supplier::Model> {
    let supplier = state.services.suppliers.update_supplier(id, payload).await?;
    Ok(Json(ApiResponse::success(supplier)))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.suppliers.delete_supplier(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub async fn list_ratings(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> ApiResult<Vec<supplier_rating::Model>> {
    let ratings = state
        .services
        .supplier_ratings
        .list_for_supplier(supplier_id)
        .await?;
    Ok(Json(ApiResponse::success(ratings)))
}

pub async fn create_rating(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<CreateSupplierRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<supplier_rating::Model>>), ServiceError> {
    let rating = state
        .services
        .supplier_ratings
        .create_rating(supplier_id, payload)
        .await?;
    Ok(created(rating))
}

pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRatingRequest>,
) -> ApiResult<supplier_rating::Model> {
    let rating = state
        .services
        .supplier_ratings
        .update_rating(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(rating)))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.supplier_ratings.delete_rating(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/suppliers/:id/ratings", get(list_ratings).post(create_rating))
        .route(
            "/suppliers/ratings/:id",
            put(update_rating).delete(delete_rating),
        )
}
