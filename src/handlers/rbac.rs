use super::common::{created, DeletedResponse};
use crate::{
    entities::{permission, role},
    errors::ServiceError,
    services::rbac::{
        CreatePermissionRequest, CreateRoleRequest, RolePermissionsUpdate,
        SetRolePermissionsRequest, UpdateRoleRequest,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use uuid::Uuid;

pub async fn list_roles(State(state): State<AppState>) -> ApiResult<Vec<role::Model>> {
    let roles = state.services.rbac.list_roles().await?;
    Ok(Json(ApiResponse::success(roles)))
}

pub async fn create_role(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<role::Model>>), ServiceError> {
    let role = state.services.rbac.create_role(payload).await?;
    Ok(created(role))
}

pub async fn get_role(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<role::Model> {
    let role = state.services.rbac.get_role(id).await?;
    Ok(Json(ApiResponse::success(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<role::Model> {
    let role = state.services.rbac.update_role(id, payload).await?;
    Ok(Json(ApiResponse::success(role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.rbac.delete_role(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub async fn list_permissions(State(state): State<AppState>) -> ApiResult<Vec<permission::Model>> {
    let permissions = state.services.rbac.list_permissions().await?;
    Ok(Json(ApiResponse::success(permissions)))
}

pub async fn create_permission(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<permission::Model>>), ServiceError> {
    let permission = state.services.rbac.create_permission(payload).await?;
    Ok(created(permission))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedResponse> {
    state.services.rbac.delete_permission(id).await?;
    Ok(Json(ApiResponse::success(DeletedResponse::new(id))))
}

pub async fn get_role_permissions(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Vec<permission::Model>> {
    let permissions = state.services.rbac.get_role_permissions(role_id).await?;
    Ok(Json(ApiResponse::success(permissions)))
}

/// Replaces the full permission set of a role.
pub async fn set_role_permissions(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<SetRolePermissionsRequest>,
) -> ApiResult<RolePermissionsUpdate> {
    let update = state
        .services
        .rbac
        .set_role_permissions(role_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(update)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/:id",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route(
            "/permissions",
            get(list_permissions).post(create_permission),
        )
        .route("/permissions/:id", delete(delete_permission))
        .route(
            "/permission-roles/roles/:id/permissions",
            get(get_role_permissions).put(set_role_permissions),
        )
}
