use crate::{config::AppConfig, ApiResponse};
use axum::{http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// `page` is 1-based; `limit` is clamped to the configured maximum.
pub fn page_and_limit(config: &AppConfig, page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    (page.unwrap_or(1).max(1), config.page_size(limit))
}

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Body returned by every delete endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn new(id: Uuid) -> Self {
        Self { id, deleted: true }
    }
}

/// Pagination parameters for list operations
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Optional reference date for the sweep endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SweepParams {
    /// Defaults to today (UTC)
    pub today: Option<NaiveDate>,
}

impl SweepParams {
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

/// Count of rows a sweep changed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepResult {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_limit_clamps() {
        let config = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        assert_eq!(page_and_limit(&config, None, None), (1, config.api_default_page_size));
        assert_eq!(page_and_limit(&config, Some(0), Some(10_000)), (1, config.api_max_page_size));
        assert_eq!(page_and_limit(&config, Some(3), Some(5)), (3, 5));
    }
}
