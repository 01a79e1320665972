use crate::{
    db::DbPool,
    entities::debt::{self, Entity as DebtEntity},
    entities::service_booking::{self, Entity as ServiceBookingEntity},
    entities::supplier::{self, Entity as SupplierEntity, SupplierType},
    entities::supplier_rating::{self, Entity as SupplierRatingEntity},
    entities::transaction::{self, Entity as TransactionEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub supplier_type: SupplierType,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub supplier_type: Option<SupplierType>,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierFilter {
    pub search: Option<String>,
    pub supplier_type: Option<SupplierType>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            supplier_type: Set(request.supplier_type),
            contact_name: Set(non_blank(request.contact_name)),
            email: Set(non_blank(request.email)),
            phone: Set(non_blank(request.phone)),
            address: Set(non_blank(request.address)),
            rating: Set(Decimal::ZERO),
            rating_count: Set(0),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(supplier_id = %model.id, "Supplier created");
        self.event_sender
            .send_or_log(Event::SupplierCreated(model.id))
            .await;
        Ok(model)
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        SupplierEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", id))
    }

    pub async fn list_suppliers(
        &self,
        filter: SupplierFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<supplier::Model>, ServiceError> {
        let mut query = SupplierEntity::find();
        if let Some(search) = non_blank(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(supplier::Column::Name.contains(&search))
                    .add(supplier::Column::ContactName.contains(&search))
                    .add(supplier::Column::Email.contains(&search)),
            );
        }
        if let Some(supplier_type) = filter.supplier_type {
            query = query.filter(supplier::Column::SupplierType.eq(supplier_type));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(supplier::Column::IsActive.eq(is_active));
        }

        paginate(
            query.order_by_asc(supplier::Column::Name),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    pub async fn update_supplier(
        &self,
        id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let mut active: supplier::ActiveModel = self.get_supplier(id).await?.into();

        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(supplier_type) = request.supplier_type {
            active.supplier_type = Set(supplier_type);
        }
        if request.contact_name.is_some() {
            active.contact_name = Set(non_blank(request.contact_name));
        }
        if request.email.is_some() {
            active.email = Set(non_blank(request.email));
        }
        if request.phone.is_some() {
            active.phone = Set(non_blank(request.phone));
        }
        if request.address.is_some() {
            active.address = Set(non_blank(request.address));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    /// Refused while service bookings reference the supplier.
    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_supplier(id).await?;

        let bookings = ServiceBookingEntity::find()
            .filter(service_booking::Column::SupplierId.eq(id))
            .count(&*self.db)
            .await?;
        if bookings > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} still has {} service booking(s)",
                id, bookings
            )));
        }
        let ledger_count = DebtEntity::find()
            .filter(debt::Column::SupplierId.eq(id))
            .count(&*self.db)
            .await?
            + TransactionEntity::find()
                .filter(transaction::Column::SupplierId.eq(id))
                .count(&*self.db)
                .await?;
        if ledger_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Supplier {} is referenced by {} debt or transaction record(s)",
                id, ledger_count
            )));
        }

        let txn = self.db.begin().await?;
        SupplierRatingEntity::delete_many()
            .filter(supplier_rating::Column::SupplierId.eq(id))
            .exec(&txn)
            .await?;
        SupplierEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }
}
