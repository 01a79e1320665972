use crate::{
    db::DbPool,
    entities::customer::{self, CustomerType, Entity as CustomerEntity},
    entities::debt::{self, Entity as DebtEntity},
    entities::quote::{self, Entity as QuoteEntity},
    entities::transaction::{self, Entity as TransactionEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "full_name is required"))]
    pub full_name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_type: Option<CustomerType>,
    pub source: Option<String>,
    pub is_vip: Option<bool>,
    pub is_blacklisted: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_type: Option<CustomerType>,
    pub source: Option<String>,
    pub is_vip: Option<bool>,
    pub is_blacklisted: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub is_vip: Option<bool>,
}

/// Customer CRM records
#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, request), fields(full_name = %request.full_name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let now = Utc::now();
        let customer = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(request.full_name.trim().to_string()),
            email: Set(non_blank(request.email)),
            phone: Set(non_blank(request.phone)),
            address: Set(non_blank(request.address)),
            nationality: Set(non_blank(request.nationality)),
            date_of_birth: Set(request.date_of_birth),
            customer_type: Set(request.customer_type.unwrap_or_default()),
            source: Set(non_blank(request.source)),
            is_vip: Set(request.is_vip.unwrap_or(false)),
            is_blacklisted: Set(request.is_blacklisted.unwrap_or(false)),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(customer_id = %customer.id, "Customer created");
        self.event_sender
            .send_or_log(Event::CustomerCreated(customer.id))
            .await;
        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        CustomerEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }

    /// Newest first. `search` matches name, email or phone.
    pub async fn list_customers(
        &self,
        filter: CustomerFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<customer::Model>, ServiceError> {
        let mut query = CustomerEntity::find();

        if let Some(search) = non_blank(filter.search) {
            query = query.filter(
                Condition::any()
                    .add(customer::Column::FullName.contains(&search))
                    .add(customer::Column::Email.contains(&search))
                    .add(customer::Column::Phone.contains(&search)),
            );
        }
        if let Some(customer_type) = filter.customer_type {
            query = query.filter(customer::Column::CustomerType.eq(customer_type));
        }
        if let Some(is_vip) = filter.is_vip {
            query = query.filter(customer::Column::IsVip.eq(is_vip));
        }

        paginate(
            query.order_by_desc(customer::Column::CreatedAt),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let existing = self.get_customer(id).await?;
        let mut active: customer::ActiveModel = existing.into();

        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name.trim().to_string());
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
        if request.nationality.is_some() {
            active.nationality = Set(non_blank(request.nationality));
        }
        if let Some(dob) = request.date_of_birth {
            active.date_of_birth = Set(Some(dob));
        }
        if let Some(customer_type) = request.customer_type {
            active.customer_type = Set(customer_type);
        }
        if request.source.is_some() {
            active.source = Set(non_blank(request.source));
        }
        if let Some(is_vip) = request.is_vip {
            active.is_vip = Set(is_vip);
        }
        if let Some(is_blacklisted) = request.is_blacklisted {
            active.is_blacklisted = Set(is_blacklisted);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::CustomerUpdated(id))
            .await;
        Ok(updated)
    }

    /// Refused while quotes reference the customer.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_customer(id).await?;

        let quote_count = QuoteEntity::find()
            .filter(quote::Column::CustomerId.eq(id))
            .count(&*self.db)
            .await?;
        if quote_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} is referenced by {} quote(s)",
                id, quote_count
            )));
        }
        let ledger_count = DebtEntity::find()
            .filter(debt::Column::CustomerId.eq(id))
            .count(&*self.db)
            .await?
            + TransactionEntity::find()
                .filter(transaction::Column::CustomerId.eq(id))
                .count(&*self.db)
                .await?;
        if ledger_count > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} is referenced by {} debt or transaction record(s)",
                id, ledger_count
            )));
        }

        CustomerEntity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        info!(customer_id = %id, "Customer deleted");
        self.event_sender
            .send_or_log(Event::CustomerDeleted(id))
            .await;
        Ok(())
    }
}
