use crate::{
    db::DbPool,
    entities::departure_guest::Entity as GuestEntity,
    entities::guest_special_request::{
        self, Entity as SpecialRequestEntity, SpecialRequestStatus, SpecialRequestType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSpecialRequestRequest {
    pub guest_id: Uuid,
    pub request_type: SpecialRequestType,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSpecialRequestStatusRequest {
    pub status: SpecialRequestStatus,
    pub handled_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecialRequestFilter {
    pub departure_id: Option<Uuid>,
    pub guest_id: Option<Uuid>,
    pub status: Option<SpecialRequestStatus>,
}

#[derive(Clone)]
pub struct SpecialRequestService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SpecialRequestService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// The departure is taken from the guest.
    #[instrument(skip(self, request), fields(guest_id = %request.guest_id))]
    pub async fn create_request(
        &self,
        request: CreateSpecialRequestRequest,
    ) -> Result<guest_special_request::Model, ServiceError> {
        request.validate()?;
        let guest = GuestEntity::find_by_id(request.guest_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guest", request.guest_id))?;

        let now = Utc::now();
        let model = guest_special_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            guest_id: Set(guest.id),
            departure_id: Set(guest.departure_id),
            request_type: Set(request.request_type),
            description: Set(request.description.trim().to_string()),
            status: Set(SpecialRequestStatus::Pending),
            handled_by: Set(None),
            handled_at: Set(None),
            notes: Set(non_blank(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(request_id = %model.id, request_type = %model.request_type, "Special request recorded");
        self.event_sender
            .send_or_log(Event::SpecialRequestCreated(model.id))
            .await;
        Ok(model)
    }

    pub async fn list_requests(
        &self,
        filter: SpecialRequestFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<guest_special_request::Model>, ServiceError> {
        let mut query = SpecialRequestEntity::find();
        if let Some(departure_id) = filter.departure_id {
            query = query.filter(guest_special_request::Column::DepartureId.eq(departure_id));
        }
        if let Some(guest_id) = filter.guest_id {
            query = query.filter(guest_special_request::Column::GuestId.eq(guest_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(guest_special_request::Column::Status.eq(status));
        }
        paginate(
            query.order_by_desc(guest_special_request::Column::CreatedAt),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    /// Leaving `pending` stamps who handled the request and when.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateSpecialRequestStatusRequest,
    ) -> Result<guest_special_request::Model, ServiceError> {
        let existing = SpecialRequestEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Special request", id))?;
        if !existing.status.can_transition_to(request.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move special request from {} to {}",
                existing.status, request.status
            )));
        }

        let now = Utc::now();
        let was_pending = existing.status == SpecialRequestStatus::Pending;
        let mut active: guest_special_request::ActiveModel = existing.into();
        active.status = Set(request.status);
        if was_pending {
            active.handled_by = Set(request.handled_by);
            active.handled_at = Set(Some(now));
        }
        if request.notes.is_some() {
            active.notes = Set(non_blank(request.notes));
        }
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SpecialRequestStatusChanged {
                request_id: id,
                new_status: updated.status.to_string(),
            })
            .await;
        Ok(updated)
    }

    pub async fn delete_request(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = SpecialRequestEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Special request", id));
        }
        info!(request_id = %id, "Special request deleted");
        Ok(())
    }
}
