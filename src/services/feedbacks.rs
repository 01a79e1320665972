use crate::{
    db::DbPool,
    entities::feedback::{self, Entity as FeedbackEntity, FeedbackPriority, FeedbackStatus, FeedbackType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFeedbackRequest {
    pub feedback_type: FeedbackType,
    #[serde(default)]
    pub priority: FeedbackPriority,
    #[validate(length(min = 1, max = 255, message = "subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    pub customer_id: Option<Uuid>,
    pub departure_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignFeedbackRequest {
    pub assigned_to: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateFeedbackStatusRequest {
    pub status: FeedbackStatus,
    pub actor_id: Option<Uuid>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    pub feedback_type: Option<FeedbackType>,
    pub assigned_to: Option<Uuid>,
}

/// Customer complaints, suggestions and compliments
#[derive(Clone)]
pub struct FeedbackService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FeedbackService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(feedback_type = %request.feedback_type))]
    pub async fn create_feedback(
        &self,
        request: CreateFeedbackRequest,
    ) -> Result<feedback::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();

        let model = feedback::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(request.customer_id),
            departure_id: Set(request.departure_id),
            feedback_type: Set(request.feedback_type),
            priority: Set(request.priority),
            subject: Set(request.subject.trim().to_string()),
            content: Set(request.content),
            rating: Set(request.rating),
            status: Set(FeedbackStatus::Open),
            assigned_to: Set(None),
            resolution: Set(None),
            resolved_by: Set(None),
            resolved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(feedback_id = %model.id, priority = %model.priority, "Feedback received");
        self.event_sender
            .send_or_log(Event::FeedbackCreated(model.id))
            .await;
        Ok(model)
    }

    pub async fn get_feedback(&self, id: Uuid) -> Result<feedback::Model, ServiceError> {
        FeedbackEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Feedback", id))
    }

    pub async fn list_feedbacks(
        &self,
        filter: FeedbackFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<feedback::Model>, ServiceError> {
        let mut query = FeedbackEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(feedback::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(feedback::Column::Priority.eq(priority));
        }
        if let Some(feedback_type) = filter.feedback_type {
            query = query.filter(feedback::Column::FeedbackType.eq(feedback_type));
        }
        if let Some(assigned_to) = filter.assigned_to {
            query = query.filter(feedback::Column::AssignedTo.eq(assigned_to));
        }
        paginate(
            query.order_by_desc(feedback::Column::CreatedAt),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    /// Assigning an open ticket starts work on it.
    #[instrument(skip(self, request))]
    pub async fn assign(
        &self,
        id: Uuid,
        request: AssignFeedbackRequest,
    ) -> Result<feedback::Model, ServiceError> {
        let existing = self.get_feedback(id).await?;
        if matches!(existing.status, FeedbackStatus::Resolved | FeedbackStatus::Closed) {
            return Err(ServiceError::InvalidOperation(format!(
                "Feedback {} is {} and cannot be reassigned",
                id, existing.status
            )));
        }

        let mut active: feedback::ActiveModel = existing.clone().into();
        active.assigned_to = Set(Some(request.assigned_to));
        if existing.status == FeedbackStatus::Open {
            active.status = Set(FeedbackStatus::InProgress);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::FeedbackAssigned {
                feedback_id: id,
                assigned_to: request.assigned_to,
            })
            .await;
        Ok(updated)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateFeedbackStatusRequest,
    ) -> Result<feedback::Model, ServiceError> {
        self.update_status_at(id, request, Utc::now()).await
    }

    /// Only a move to `resolved` stamps `resolved_by`/`resolved_at`.
    /// Closed tickets are final.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status_at(
        &self,
        id: Uuid,
        request: UpdateFeedbackStatusRequest,
        now: DateTime<Utc>,
    ) -> Result<feedback::Model, ServiceError> {
        let existing = self.get_feedback(id).await?;
        if existing.status == FeedbackStatus::Closed && request.status != FeedbackStatus::Closed {
            return Err(ServiceError::InvalidStatus(format!(
                "Feedback {} is closed",
                id
            )));
        }

        let mut active: feedback::ActiveModel = existing.into();
        active.status = Set(request.status);
        if request.status == FeedbackStatus::Resolved {
            active.resolved_by = Set(request.actor_id);
            active.resolved_at = Set(Some(now));
            if let Some(resolution) = non_blank(request.resolution) {
                active.resolution = Set(Some(resolution));
            }
        }
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        info!(feedback_id = %id, status = %updated.status, "Feedback status changed");
        if updated.status == FeedbackStatus::Resolved {
            self.event_sender.send_or_log(Event::FeedbackResolved(id)).await;
        }
        Ok(updated)
    }

    pub async fn delete_feedback(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = FeedbackEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Feedback", id));
        }
        info!(feedback_id = %id, "Feedback deleted");
        Ok(())
    }
}
