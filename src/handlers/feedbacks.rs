use super::common::{created, page_and_limit, DeletedResponse};
use crate::{
    entities::feedback::{self, FeedbackPriority, FeedbackStatus, FeedbackType},
    errors::ServiceError,
    services::feedbacks::{
        AssignFeedbackRequest, CreateFeedbackRequest, FeedbackFilter, UpdateFeedbackStatusRequest,
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
pub struct FeedbackListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    pub feedback_type: Option<FeedbackType>,
    pub assigned_to: Option<Uuid>,
}

pub async fn list_feedbacks(
    State(state): State<AppState>,
    Query(query): Query<FeedbackListQuery>,
) -> ApiResult<PaginatedResponse<feedback::Model>> {
    let (page, limit) = page_and_limit(&state.config, query.page, query.limit);
    let filter = FeedbackFilter {
        status: query.status,
        priority: query.priority,
        feedback_type: query.feedback_type,
        assigned_to: query.assigned_to,
    };
    let feedbacks = state
        .services
        .feedbacks
        .list_feedbacks(filter, page, limit)
        .await?;
    Ok(Json(ApiResponse::success(feedbacks)))
}

pub async fn create_feedback(
    State(state): State<AppState>,
    Json(payload): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<feedback::Model>>), ServiceError> {
    let feedback = state.services.feedbacks.create_feedback(payload).await?;
    Ok(created(feedback))
}

pub async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<feedback::Model> {
    let feedback = state.services.feedbacks.get_feedback(id).await?;
    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn assign_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignFeedbackRequest>,
) -> ApiResult<feedback::Model> {
    let feedback = state.services.feedbacks.assign(id, payload).await?;
    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn update_feedback_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFeedbackStatusRequest>,
) -> ApiResult<feedback::Model> {
    let feedback = state.services.feedbacks.update_status(id, payload).await?;
    Ok(Json(ApiResponse::success(feedback)))
}

pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.feedbacks.delete_feedback(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedbacks", get(list_feedbacks).post(create_feedback))
        .route(
            "/feedbacks/:id",
            get(get_feedback).delete(delete_feedback),
        )
        .route("/feedbacks/:id/assign", patch(assign_feedback))
        .route("/feedbacks/:id/status", patch(update_feedback_status))
}
