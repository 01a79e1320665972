use super::common::{created, page_and_limit, DeletedResponse};
use crate::{
    entities::customer::{self, CustomerType},
    errors::ServiceError,
    services::customers::{CreateCustomerRequest, CustomerFilter, UpdateCustomerRequest},
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
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CustomerListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Substring of name, email or phone
    pub search: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub is_vip: Option<bool>,
}

pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<PaginatedResponse<customer::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = CustomerFilter {
        search: query.search,
        customer_type: query.customer_type,
        is_vip: query.is_vip,
    };
    let customers = state
        .services
        .customers
        .list_customers(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(customers)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<customer::Model>>), ServiceError> {
    let customer = state.services.customers.create_customer(payload).await?;
    Ok(created(customer))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(ApiResponse::success(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> ApiResult<customer::Model> {
    let customer = state.services.customers.update_customer(id, payload).await?;
    Ok(Json(ApiResponse::success(customer)))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.customers.delete_customer(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}
