use crate::{
    db::DbPool,
    entities::service_booking::{self, Entity as ServiceBookingEntity, ServiceBookingStatus},
    entities::supplier::Entity as SupplierEntity,
    entities::tour_departure::Entity as DepartureEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate, pricing::line_amount},
    PaginatedResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateServiceBookingRequest {
    pub departure_id: Uuid,
    pub supplier_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "service_type is required"))]
    pub service_type: String,
    pub description: Option<String>,
    pub service_date: NaiveDate,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
    pub confirmation_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceBookingRequest {
    #[validate(length(min = 1, max = 100))]
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub service_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Option<Decimal>,
    pub confirmation_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateServiceBookingStatusRequest {
    pub status: ServiceBookingStatus,
    pub confirmation_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceBookingFilter {
    pub departure_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub status: Option<ServiceBookingStatus>,
}

fn validate_unit_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("unit_price");
        err.message = Some("unit_price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Supplier services reserved for a departure
#[derive(Clone)]
pub struct ServiceBookingService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ServiceBookingService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(supplier_id = %request.supplier_id))]
    pub async fn create_booking(
        &self,
        request: CreateServiceBookingRequest,
    ) -> Result<service_booking::Model, ServiceError> {
        request.validate()?;
        let total_amount = line_amount(request.unit_price, request.quantity)?;

        DepartureEntity::find_by_id(request.departure_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", request.departure_id))?;
        let supplier = SupplierEntity::find_by_id(request.supplier_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", request.supplier_id))?;
        if !supplier.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Supplier {} is inactive",
                supplier.id
            )));
        }

        let now = Utc::now();
        let booking = service_booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            departure_id: Set(request.departure_id),
            supplier_id: Set(request.supplier_id),
            service_type: Set(request.service_type.trim().to_string()),
            description: Set(non_blank(request.description)),
            service_date: Set(request.service_date),
            quantity: Set(request.quantity),
            unit_price: Set(request.unit_price),
            total_amount: Set(total_amount),
            status: Set(ServiceBookingStatus::Pending),
            confirmation_code: Set(non_blank(request.confirmation_code)),
            notes: Set(non_blank(request.notes)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(booking_id = %booking.id, total = %booking.total_amount, "Service booking created");
        self.event_sender
            .send_or_log(Event::ServiceBookingCreated(booking.id))
            .await;
        Ok(booking)
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<service_booking::Model, ServiceError> {
        ServiceBookingEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service booking", id))
    }

    pub async fn list_bookings(
        &self,
        filter: ServiceBookingFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<service_booking::Model>, ServiceError> {
        let mut query = ServiceBookingEntity::find();
        if let Some(departure_id) = filter.departure_id {
            query = query.filter(service_booking::Column::DepartureId.eq(departure_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(service_booking::Column::SupplierId.eq(supplier_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(service_booking::Column::Status.eq(status));
        }
        paginate(
            query.order_by_asc(service_booking::Column::ServiceDate),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    /// Quantity or price changes recompute the total. Closed bookings are frozen.
    #[instrument(skip(self, request))]
    pub async fn update_booking(
        &self,
        id: Uuid,
        request: UpdateServiceBookingRequest,
    ) -> Result<service_booking::Model, ServiceError> {
        request.validate()?;
        let booking = self.get_booking(id).await?;
        if booking.status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Service booking {} is {} and can no longer be edited",
                id, booking.status
            )));
        }

        let quantity = request.quantity.unwrap_or(booking.quantity);
        let unit_price = request.unit_price.unwrap_or(booking.unit_price);

        let mut active: service_booking::ActiveModel = booking.into();
        if let Some(service_type) = request.service_type {
            active.service_type = Set(service_type.trim().to_string());
        }
        if request.description.is_some() {
            active.description = Set(non_blank(request.description));
        }
        if let Some(service_date) = request.service_date {
            active.service_date = Set(service_date);
        }
        if request.confirmation_code.is_some() {
            active.confirmation_code = Set(non_blank(request.confirmation_code));
        }
        if request.notes.is_some() {
            active.notes = Set(non_blank(request.notes));
        }
        active.quantity = Set(quantity);
        active.unit_price = Set(unit_price);
        active.total_amount = Set(line_amount(unit_price, quantity)?);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateServiceBookingStatusRequest,
    ) -> Result<service_booking::Model, ServiceError> {
        let booking = self.get_booking(id).await?;
        let old_status = booking.status;
        if !old_status.can_transition_to(request.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move service booking from {} to {}",
                old_status, request.status
            )));
        }

        let mut active: service_booking::ActiveModel = booking.into();
        active.status = Set(request.status);
        if request.confirmation_code.is_some() {
            active.confirmation_code = Set(non_blank(request.confirmation_code));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ServiceBookingStatusChanged {
                booking_id: id,
                old_status: old_status.to_string(),
                new_status: request.status.to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Completed bookings are part of the financial record and cannot be deleted.
    pub async fn delete_booking(&self, id: Uuid) -> Result<(), ServiceError> {
        let booking = self.get_booking(id).await?;
        if booking.status == ServiceBookingStatus::Completed {
            warn!(booking_id = %id, "Refusing to delete completed service booking");
            return Err(ServiceError::InvalidOperation(format!(
                "Service booking {} is completed and cannot be deleted",
                id
            )));
        }
        ServiceBookingEntity::delete_by_id(id).exec(&*self.db).await?;
        info!(booking_id = %id, "Service booking deleted");
        Ok(())
    }
}
