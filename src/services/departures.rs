use crate::{
    db::DbPool,
    entities::activity_checkin::{self, Entity as CheckinEntity},
    entities::departure_activity::{self, Entity as ActivityEntity},
    entities::departure_guest::{self, Entity as GuestEntity},
    entities::guest_special_request::{self, Entity as SpecialRequestEntity},
    entities::service_booking::{self, Entity as ServiceBookingEntity, ServiceBookingStatus},
    entities::staff_assignment::{self, Entity as StaffAssignmentEntity},
    entities::tour_departure::{self, DepartureStatus, Entity as DepartureEntity},
    entities::tour_price::TravelerType,
    entities::tour_version::Entity as TourVersionEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_departure_dates"))]
pub struct CreateDepartureRequest {
    pub tour_version_id: Uuid,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    #[validate(range(min = 1, message = "capacity must be at least 1"))]
    pub capacity: i32,
    pub notes: Option<String>,
}

fn validate_departure_dates(request: &CreateDepartureRequest) -> Result<(), ValidationError> {
    if request.return_date < request.departure_date {
        let mut err = ValidationError::new("return_date");
        err.message = Some("return_date must not be before departure_date".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDepartureStatusRequest {
    pub status: DepartureStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartureFilter {
    pub status: Option<DepartureStatus>,
    pub tour_version_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddGuestRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "full_name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub traveler_type: TravelerType,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_activity_window"))]
pub struct AddActivityRequest {
    #[validate(range(min = 1, message = "day_number must be at least 1"))]
    pub day_number: i32,
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_checkin: bool,
}

fn validate_activity_window(request: &AddActivityRequest) -> Result<(), ValidationError> {
    if let Some(ends_at) = request.ends_at {
        if ends_at < request.starts_at {
            let mut err = ValidationError::new("ends_at");
            err.message = Some("ends_at must not be before starts_at".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Departure with its headcount, staffing and supplier spend
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartureOverview {
    pub departure: tour_departure::Model,
    pub guest_count: u64,
    pub seats_left: i64,
    pub activity_count: u64,
    pub staff: Vec<staff_assignment::Model>,
    pub service_bookings: Vec<service_booking::Model>,
    /// Sum over bookings that are not cancelled
    pub service_total: Decimal,
}

#[derive(Clone)]
pub struct DepartureService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DepartureService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(tour_version_id = %request.tour_version_id))]
    pub async fn create_departure(
        &self,
        request: CreateDepartureRequest,
    ) -> Result<tour_departure::Model, ServiceError> {
        request.validate()?;

        TourVersionEntity::find_by_id(request.tour_version_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tour version", request.tour_version_id))?;

        let now = Utc::now();
        let departure = tour_departure::ActiveModel {
            id: Set(Uuid::new_v4()),
            tour_version_id: Set(request.tour_version_id),
            departure_date: Set(request.departure_date),
            return_date: Set(request.return_date),
            capacity: Set(request.capacity),
            status: Set(DepartureStatus::Scheduled),
            notes: Set(non_blank(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(departure_id = %departure.id, date = %departure.departure_date, "Departure created");
        self.event_sender
            .send_or_log(Event::DepartureCreated(departure.id))
            .await;
        Ok(departure)
    }

    pub async fn get_departure(&self, id: Uuid) -> Result<tour_departure::Model, ServiceError> {
        DepartureEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", id))
    }

    pub async fn list_departures(
        &self,
        filter: DepartureFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<tour_departure::Model>, ServiceError> {
        let mut query = DepartureEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(tour_departure::Column::Status.eq(status));
        }
        if let Some(version_id) = filter.tour_version_id {
            query = query.filter(tour_departure::Column::TourVersionId.eq(version_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(tour_departure::Column::DepartureDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(tour_departure::Column::DepartureDate.lte(to));
        }
        paginate(
            query.order_by_asc(tour_departure::Column::DepartureDate),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_departure_status(
        &self,
        id: Uuid,
        status: DepartureStatus,
    ) -> Result<tour_departure::Model, ServiceError> {
        let departure = self.get_departure(id).await?;
        let old_status = departure.status;
        if !old_status.can_transition_to(status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move departure from {} to {}",
                old_status, status
            )));
        }

        let mut active: tour_departure::ActiveModel = departure.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        info!(departure_id = %id, from = %old_status, to = %status, "Departure status changed");
        self.event_sender
            .send_or_log(Event::DepartureStatusChanged {
                departure_id: id,
                old_status: old_status.to_string(),
                new_status: status.to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Adds a guest while seats remain. The departure row is locked for the count.
    #[instrument(skip(self, request))]
    pub async fn add_guest(
        &self,
        departure_id: Uuid,
        request: AddGuestRequest,
    ) -> Result<departure_guest::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;

        let departure = DepartureEntity::find_by_id(departure_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", departure_id))?;
        if departure.status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Departure {} is {}",
                departure_id, departure.status
            )));
        }

        let booked = GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(departure_id))
            .count(&txn)
            .await?;
        if booked >= departure.capacity as u64 {
            return Err(ServiceError::Conflict(format!(
                "Departure {} is full ({} of {} seats taken)",
                departure_id, booked, departure.capacity
            )));
        }

        let guest = departure_guest::ActiveModel {
            id: Set(Uuid::new_v4()),
            departure_id: Set(departure_id),
            customer_id: Set(request.customer_id),
            full_name: Set(request.full_name.trim().to_string()),
            traveler_type: Set(request.traveler_type),
            phone: Set(non_blank(request.phone)),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(departure_id = %departure_id, guest_id = %guest.id, "Guest added");
        self.event_sender
            .send_or_log(Event::GuestAdded {
                departure_id,
                guest_id: guest.id,
            })
            .await;
        Ok(guest)
    }

    pub async fn list_guests(
        &self,
        departure_id: Uuid,
    ) -> Result<Vec<departure_guest::Model>, ServiceError> {
        self.get_departure(departure_id).await?;
        Ok(GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(departure_id))
            .order_by_asc(departure_guest::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_guest(&self, guest_id: Uuid) -> Result<departure_guest::Model, ServiceError> {
        GuestEntity::find_by_id(guest_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guest", guest_id))
    }

    /// Removes a guest together with their check-in rows and special requests.
    #[instrument(skip(self))]
    pub async fn remove_guest(&self, departure_id: Uuid, guest_id: Uuid) -> Result<(), ServiceError> {
        let guest = self.get_guest(guest_id).await?;
        if guest.departure_id != departure_id {
            return Err(ServiceError::not_found("Guest", guest_id));
        }

        let txn = self.db.begin().await?;
        CheckinEntity::delete_many()
            .filter(activity_checkin::Column::GuestId.eq(guest_id))
            .exec(&txn)
            .await?;
        SpecialRequestEntity::delete_many()
            .filter(guest_special_request::Column::GuestId.eq(guest_id))
            .exec(&txn)
            .await?;
        GuestEntity::delete_by_id(guest_id).exec(&txn).await?;
        txn.commit().await?;

        info!(departure_id = %departure_id, guest_id = %guest_id, "Guest removed");
        self.event_sender
            .send_or_log(Event::GuestRemoved {
                departure_id,
                guest_id,
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn add_activity(
        &self,
        departure_id: Uuid,
        request: AddActivityRequest,
    ) -> Result<departure_activity::Model, ServiceError> {
        request.validate()?;
        self.get_departure(departure_id).await?;

        let activity = departure_activity::ActiveModel {
            id: Set(Uuid::new_v4()),
            departure_id: Set(departure_id),
            day_number: Set(request.day_number),
            title: Set(request.title.trim().to_string()),
            location: Set(non_blank(request.location)),
            starts_at: Set(request.starts_at),
            ends_at: Set(request.ends_at),
            auto_checkin: Set(request.auto_checkin),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(departure_id = %departure_id, activity_id = %activity.id, "Activity scheduled");
        Ok(activity)
    }

    pub async fn list_activities(
        &self,
        departure_id: Uuid,
    ) -> Result<Vec<departure_activity::Model>, ServiceError> {
        self.get_departure(departure_id).await?;
        Ok(ActivityEntity::find()
            .filter(departure_activity::Column::DepartureId.eq(departure_id))
            .order_by_asc(departure_activity::Column::StartsAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn overview(&self, departure_id: Uuid) -> Result<DepartureOverview, ServiceError> {
        let departure = self.get_departure(departure_id).await?;

        let guest_count = GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(departure_id))
            .count(&*self.db)
            .await?;
        let activity_count = ActivityEntity::find()
            .filter(departure_activity::Column::DepartureId.eq(departure_id))
            .count(&*self.db)
            .await?;
        let staff = StaffAssignmentEntity::find()
            .filter(staff_assignment::Column::DepartureId.eq(departure_id))
            .order_by_asc(staff_assignment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let service_bookings = ServiceBookingEntity::find()
            .filter(service_booking::Column::DepartureId.eq(departure_id))
            .order_by_asc(service_booking::Column::ServiceDate)
            .all(&*self.db)
            .await?;

        let service_total = service_bookings
            .iter()
            .filter(|b| b.status != ServiceBookingStatus::Cancelled)
            .map(|b| b.total_amount)
            .sum();

        Ok(DepartureOverview {
            seats_left: departure.capacity as i64 - guest_count as i64,
            departure,
            guest_count,
            activity_count,
            staff,
            service_bookings,
            service_total,
        })
    }
}
