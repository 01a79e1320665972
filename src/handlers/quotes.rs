use super::common::{created, page_and_limit, DeletedResponse, SweepParams, SweepResult};
use crate::{
    entities::quote::{self, QuoteStatus},
    errors::{ErrorResponse, ServiceError},
    services::{
        pricing::{QuotePrice, QuotePriceRequest},
        quotes::{CreateQuoteRequest, QuoteFilter, UpdateQuoteRequest, UpdateQuoteStatusRequest},
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct QuoteListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<QuoteStatus>,
    pub customer_id: Option<Uuid>,
    /// Substring of the quote number
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/quotes",
    summary = "List quotes",
    params(QuoteListQuery),
    responses(
        (status = 200, description = "Quotes retrieved", body = ApiResponse<PaginatedResponse<quote::Model>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> ApiResult<PaginatedResponse<quote::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = QuoteFilter {
        status: query.status,
        customer_id: query.customer_id,
        search: query.search,
    };
    let quotes = state.services.quotes.list_quotes(filter, page, limit).await?;
    Ok(Json(ApiResponse::success(quotes)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quotes/calculate",
    summary = "Price a prospective quote",
    description = "Prices travelers and additional services against the version's active price list. Nothing is stored.",
    request_body = QuotePriceRequest,
    responses(
        (status = 200, description = "Price computed", body = ApiResponse<QuotePrice>),
        (status = 400, description = "Missing price for a traveler category", body = ErrorResponse),
        (status = 404, description = "Tour version not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn calculate_quote(
    State(state): State<AppState>,
    Json(payload): Json<QuotePriceRequest>,
) -> ApiResult<QuotePrice> {
    let price = state.services.quotes.calculate(payload).await?;
    Ok(Json(ApiResponse::success(price)))
}

#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    summary = "Create quote",
    description = "Creates a draft quote. Validation, pricing and the insert share one transaction.",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Quote created", body = ApiResponse<quote::Model>),
        (status = 400, description = "Invalid quote", body = ErrorResponse),
        (status = 404, description = "Customer, version or departure not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn create_quote(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<quote::Model>>), ServiceError> {
    let quote = state.services.quotes.create_quote(payload).await?;
    Ok(created(quote))
}

#[utoipa::path(
    get,
    path = "/api/v1/quotes/{id}",
    summary = "Get quote",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote retrieved", body = ApiResponse<quote::Model>),
        (status = 404, description = "Quote not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<quote::Model> {
    let quote = state.services.quotes.get_quote(id).await?;
    Ok(Json(ApiResponse::success(quote)))
}

#[utoipa::path(
    put,
    path = "/api/v1/quotes/{id}",
    summary = "Update draft quote",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = UpdateQuoteRequest,
    responses(
        (status = 200, description = "Quote updated", body = ApiResponse<quote::Model>),
        (status = 400, description = "Quote is not a draft or input is invalid", body = ErrorResponse),
        (status = 404, description = "Quote not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> ApiResult<quote::Model> {
    let quote = state.services.quotes.update_quote(id, payload).await?;
    Ok(Json(ApiResponse::success(quote)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/quotes/{id}/status",
    summary = "Change quote status",
    params(("id" = Uuid, Path, description = "Quote ID")),
    request_body = UpdateQuoteStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<quote::Model>),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 404, description = "Quote not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn update_quote_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> ApiResult<quote::Model> {
    let quote = state.services.quotes.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(quote)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/quotes/{id}",
    summary = "Delete draft quote",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote deleted", body = ApiResponse<DeletedResponse>),
        (status = 400, description = "Quote is not a draft", body = ErrorResponse),
        (status = 404, description = "Quote not found", body = ErrorResponse),
    ),
    tag = "quotes"
)]
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.quotes.delete_quote(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quotes/expire",
    summary = "Expire overdue quotes",
    description = "Sent quotes whose valid_until is before `today` become expired.",
    params(SweepParams),
    responses(
        (status = 200, description = "Sweep finished", body = ApiResponse<SweepResult>),
    ),
    tag = "quotes"
)]
pub async fn expire_quotes(
    State(state): State<AppState>,
    Query(params): Query<SweepParams>,
) -> ApiResult<SweepResult> {
    let updated = state
        .services
        .quotes
        .expire_overdue_quotes(params.today())
        .await?;
    Ok(Json(ApiResponse::success(SweepResult { updated })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/calculate", post(calculate_quote))
        .route("/quotes/expire", post(expire_quotes))
        .route(
            "/quotes/:id",
            get(get_quote).put(update_quote).delete(delete_quote),
        )
        .route("/quotes/:id/status", patch(update_quote_status))
}
