//! Debts, debt payments and cash transactions.

use super::common::{created, page_and_limit, DeletedResponse, SweepParams, SweepResult};
use crate::{
    entities::{
        debt::{self, DebtStatus, DebtType},
        debt_payment,
        transaction::{self, TransactionStatus, TransactionType},
    },
    errors::ServiceError,
    services::{
        debts::{CreateDebtRequest, DebtFilter, DebtSummary, PaymentRecorded, RecordPaymentRequest},
        transactions::{
            ApproveTransactionRequest, CreateTransactionRequest, RejectTransactionRequest,
            TransactionFilter, TransactionSummary, UpdateTransactionRequest,
        },
    },
    ApiResponse, ApiResult, AppState, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct DebtListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub debt_type: Option<DebtType>,
    pub status: Option<DebtStatus>,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub departure_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn list_debts(
    State(state): State<AppState>,
    Query(query): Query<DebtListQuery>,
) -> ApiResult<PaginatedResponse<debt::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = DebtFilter {
        debt_type: query.debt_type,
        status: query.status,
        customer_id: query.customer_id,
        supplier_id: query.supplier_id,
    };
    let debts = state.services.debts.list_debts(filter, page, limit).await?;
    Ok(Json(ApiResponse::success(debts)))
}

pub async fn create_debt(
    State(state): State<AppState>,
    Json(payload): Json<CreateDebtRequest>,
) -> Result<(StatusCode, Json<ApiResponse<debt::Model>>), ServiceError> {
    let debt = state.services.debts.create_debt(payload).await?;
    Ok(created(debt))
}

pub async fn debt_summary(State(state): State<AppState>) -> ApiResult<DebtSummary> {
    let summary = state.services.debts.summary().await?;
    Ok(Json(ApiResponse::success(summary)))
}

pub async fn get_debt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<debt::Model> {
    let debt = state.services.debts.get_debt(id).await?;
    Ok(Json(ApiResponse::success(debt)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<debt_payment::Model>> {
    let payments = state.services.debts.list_payments(id).await?;
    Ok(Json(ApiResponse::success(payments)))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentRecorded>>), ServiceError> {
    let recorded = state.services.debts.record_payment(id, payload).await?;
    Ok(created(recorded))
}

pub async fn mark_overdue(
    State(state): State<AppState>,
    Query(params): Query<SweepParams>,
) -> ApiResult<SweepResult> {
    let updated = state.services.debts.mark_overdue(params.today()).await?;
    Ok(Json(ApiResponse::success(SweepResult { updated })))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> ApiResult<PaginatedResponse<transaction::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = TransactionFilter {
        transaction_type: query.transaction_type,
        status: query.status,
        departure_id: query.departure_id,
        from: query.from,
        to: query.to,
    };
    let transactions = state
        .services
        .transactions
        .list_transactions(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(transactions)))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<transaction::Model>>), ServiceError> {
    let transaction = state
        .services
        .transactions
        .create_transaction(payload)
        .await?;
    Ok(created(transaction))
}

pub async fn transaction_summary(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<TransactionSummary> {
    let summary = state
        .services
        .transactions
        .summary(range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<transaction::Model> {
    let transaction = state.services.transactions.get_transaction(id).await?;
    Ok(Json(ApiResponse::success(transaction)))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<transaction::Model> {
    let transaction = state
        .services
        .transactions
        .update_transaction(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.transactions.delete_transaction(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub async fn approve_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveTransactionRequest>,
) -> ApiResult<transaction::Model> {
    let transaction = state.services.transactions.approve(id, payload).await?;
    Ok(Json(ApiResponse::success(transaction)))
}

pub async fn reject_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectTransactionRequest>,
) -> ApiResult<transaction::Model> {
    let transaction = state.services.transactions.reject(id, payload).await?;
    Ok(Json(ApiResponse::success(transaction)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/financial/debts", get(list_debts).post(create_debt))
        .route("/financial/debts/summary", get(debt_summary))
        .route("/financial/debts/mark-overdue", post(mark_overdue))
        .route("/financial/debts/:id", get(get_debt))
        .route(
            "/financial/debts/:id/payments",
            get(list_payments).post(record_payment),
        )
        .route(
            "/financial/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/financial/transactions/summary", get(transaction_summary))
        .route(
            "/financial/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route(
            "/financial/transactions/:id/approve",
            post(approve_transaction),
        )
        .route(
            "/financial/transactions/:id/reject",
            post(reject_transaction),
        )
}
