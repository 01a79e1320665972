use crate::{
    db::DbPool,
    entities::staff_assignment::{self, Entity as StaffAssignmentEntity, StaffRole},
    entities::tour_departure::Entity as DepartureEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::non_blank,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignStaffRequest {
    pub staff_user_id: Uuid,
    pub role: StaffRole,
    pub notes: Option<String>,
}

/// Guides, leaders and drivers attached to departures
#[derive(Clone)]
pub struct StaffAssignmentService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl StaffAssignmentService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// One assignment per (departure, staff member, role).
    #[instrument(skip(self, request), fields(staff_user_id = %request.staff_user_id))]
    pub async fn assign_staff(
        &self,
        departure_id: Uuid,
        request: AssignStaffRequest,
    ) -> Result<staff_assignment::Model, ServiceError> {
        DepartureEntity::find_by_id(departure_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", departure_id))?;

        let existing = StaffAssignmentEntity::find()
            .filter(staff_assignment::Column::DepartureId.eq(departure_id))
            .filter(staff_assignment::Column::StaffUserId.eq(request.staff_user_id))
            .filter(staff_assignment::Column::Role.eq(request.role))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Staff {} is already assigned to departure {} as {}",
                request.staff_user_id, departure_id, request.role
            )));
        }

        let assignment = staff_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            departure_id: Set(departure_id),
            staff_user_id: Set(request.staff_user_id),
            role: Set(request.role),
            notes: Set(non_blank(request.notes)),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(assignment_id = %assignment.id, departure_id = %departure_id, "Staff assigned");
        self.event_sender
            .send_or_log(Event::StaffAssigned {
                departure_id,
                staff_user_id: assignment.staff_user_id,
                role: assignment.role.to_string(),
            })
            .await;
        Ok(assignment)
    }

    pub async fn list_assignments(
        &self,
        departure_id: Uuid,
    ) -> Result<Vec<staff_assignment::Model>, ServiceError> {
        Ok(StaffAssignmentEntity::find()
            .filter(staff_assignment::Column::DepartureId.eq(departure_id))
            .order_by_asc(staff_assignment::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn list_for_staff(
        &self,
        staff_user_id: Uuid,
    ) -> Result<Vec<staff_assignment::Model>, ServiceError> {
        Ok(StaffAssignmentEntity::find()
            .filter(staff_assignment::Column::StaffUserId.eq(staff_user_id))
            .order_by_desc(staff_assignment::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn remove_assignment(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = StaffAssignmentEntity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Staff assignment", id));
        }
        info!(assignment_id = %id, "Staff assignment removed");
        Ok(())
    }
}
