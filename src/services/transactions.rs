use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::supplier::Entity as SupplierEntity,
    entities::tour_departure::Entity as DepartureEntity,
    entities::transaction::{self, Entity as TransactionEntity, TransactionStatus, TransactionType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{debts::validate_positive_amount, non_blank, paginate},
    PaginatedResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    pub transaction_type: TransactionType,
    #[validate(length(min = 1, max = 100, message = "category is required"))]
    pub category: String,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub departure_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionRequest {
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(custom = "validate_positive_amount")]
    pub amount: Option<Decimal>,
    pub transaction_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub departure_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApproveTransactionRequest {
    pub approved_by: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectTransactionRequest {
    pub rejected_by: Uuid,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub departure_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Approved totals over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TransactionSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    pub approved_count: u64,
    pub pending_count: u64,
}

#[derive(Clone)]
pub struct TransactionService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_currency: String,
}

impl TransactionService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, default_currency: String) -> Self {
        Self {
            db,
            event_sender,
            default_currency,
        }
    }

    /// Every linked departure, supplier and customer must exist.
    async fn ensure_links(
        &self,
        departure_id: Option<Uuid>,
        supplier_id: Option<Uuid>,
        customer_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if let Some(id) = departure_id {
            DepartureEntity::find_by_id(id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Departure", id))?;
        }
        if let Some(id) = supplier_id {
            SupplierEntity::find_by_id(id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Supplier", id))?;
        }
        if let Some(id) = customer_id {
            CustomerEntity::find_by_id(id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Customer", id))?;
        }
        Ok(())
    }

    #[instrument(skip(self, request), fields(transaction_type = %request.transaction_type))]
    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<transaction::Model, ServiceError> {
        request.validate()?;
        self.ensure_links(request.departure_id, request.supplier_id, request.customer_id)
            .await?;
        let now = Utc::now();

        let model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_type: Set(request.transaction_type),
            category: Set(request.category.trim().to_string()),
            amount: Set(request.amount),
            currency: Set(request
                .currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| self.default_currency.clone())),
            transaction_date: Set(request.transaction_date),
            description: Set(non_blank(request.description)),
            departure_id: Set(request.departure_id),
            supplier_id: Set(request.supplier_id),
            customer_id: Set(request.customer_id),
            payment_method: Set(non_blank(request.payment_method)),
            status: Set(TransactionStatus::Pending),
            approved_by: Set(None),
            approved_at: Set(None),
            rejected_by: Set(None),
            rejected_at: Set(None),
            rejection_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(transaction_id = %model.id, amount = %model.amount, "Transaction recorded");
        self.event_sender
            .send_or_log(Event::TransactionCreated(model.id))
            .await;
        Ok(model)
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<transaction::Model, ServiceError> {
        TransactionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Transaction", id))
    }

    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<transaction::Model>, ServiceError> {
        let mut query = TransactionEntity::find();
        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(transaction::Column::TransactionType.eq(transaction_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(transaction::Column::Status.eq(status));
        }
        if let Some(departure_id) = filter.departure_id {
            query = query.filter(transaction::Column::DepartureId.eq(departure_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(transaction::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transaction::Column::TransactionDate.lte(to));
        }
        paginate(
            query
                .order_by_desc(transaction::Column::TransactionDate)
                .order_by_desc(transaction::Column::CreatedAt),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    async fn get_pending(&self, id: Uuid, action: &str) -> Result<transaction::Model, ServiceError> {
        let model = self.get_transaction(id).await?;
        if model.status != TransactionStatus::Pending {
            return Err(ServiceError::InvalidOperation(format!(
                "Cannot {} transaction {}: it is {}",
                action, id, model.status
            )));
        }
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_transaction(
        &self,
        id: Uuid,
        request: UpdateTransactionRequest,
    ) -> Result<transaction::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_pending(id, "update").await?;
        self.ensure_links(request.departure_id, request.supplier_id, request.customer_id)
            .await?;

        let mut active: transaction::ActiveModel = existing.into();
        if let Some(category) = request.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(amount) = request.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = request.transaction_date {
            active.transaction_date = Set(date);
        }
        if request.description.is_some() {
            active.description = Set(non_blank(request.description));
        }
        if request.departure_id.is_some() {
            active.departure_id = Set(request.departure_id);
        }
        if request.supplier_id.is_some() {
            active.supplier_id = Set(request.supplier_id);
        }
        if request.customer_id.is_some() {
            active.customer_id = Set(request.customer_id);
        }
        if request.payment_method.is_some() {
            active.payment_method = Set(non_blank(request.payment_method));
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    pub async fn delete_transaction(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_pending(id, "delete").await?;
        TransactionEntity::delete_by_id(id).exec(&*self.db).await?;
        info!(transaction_id = %id, "Transaction deleted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn approve(
        &self,
        id: Uuid,
        request: ApproveTransactionRequest,
    ) -> Result<transaction::Model, ServiceError> {
        let existing = self.get_pending(id, "approve").await?;
        let now = Utc::now();

        let mut active: transaction::ActiveModel = existing.into();
        active.status = Set(TransactionStatus::Approved);
        active.approved_by = Set(Some(request.approved_by));
        active.approved_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        info!(transaction_id = %id, approved_by = %request.approved_by, "Transaction approved");
        self.event_sender
            .send_or_log(Event::TransactionApproved(id))
            .await;
        Ok(updated)
    }

    #[instrument(skip(self, request))]
    pub async fn reject(
        &self,
        id: Uuid,
        request: RejectTransactionRequest,
    ) -> Result<transaction::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_pending(id, "reject").await?;
        let now = Utc::now();

        let mut active: transaction::ActiveModel = existing.into();
        active.status = Set(TransactionStatus::Rejected);
        active.rejected_by = Set(Some(request.rejected_by));
        active.rejected_at = Set(Some(now));
        active.rejection_reason = Set(Some(request.reason.trim().to_string()));
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        info!(transaction_id = %id, "Transaction rejected");
        self.event_sender
            .send_or_log(Event::TransactionRejected(id))
            .await;
        Ok(updated)
    }

    pub async fn summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<TransactionSummary, ServiceError> {
        let mut query = TransactionEntity::find()
            .filter(transaction::Column::Status.ne(TransactionStatus::Rejected));
        if let Some(from) = from {
            query = query.filter(transaction::Column::TransactionDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(transaction::Column::TransactionDate.lte(to));
        }
        let rows = query.all(&*self.db).await?;
        Ok(summarize(&rows, from, to))
    }
}

fn summarize(
    rows: &[transaction::Model],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> TransactionSummary {
    let mut summary = TransactionSummary {
        from,
        to,
        ..Default::default()
    };
    for row in rows {
        match row.status {
            TransactionStatus::Approved => {
                summary.approved_count += 1;
                match row.transaction_type {
                    TransactionType::Income => summary.total_income += row.amount,
                    TransactionType::Expense => summary.total_expense += row.amount,
                }
            }
            TransactionStatus::Pending => summary.pending_count += 1,
            TransactionStatus::Rejected => {}
        }
    }
    summary.net = summary.total_income - summary.total_expense;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(kind: TransactionType, amount: Decimal, status: TransactionStatus) -> transaction::Model {
        let now = Utc::now();
        transaction::Model {
            id: Uuid::new_v4(),
            transaction_type: kind,
            category: "tour".into(),
            amount,
            currency: "VND".into(),
            transaction_date: now.date_naive(),
            description: None,
            departure_id: None,
            supplier_id: None,
            customer_id: None,
            payment_method: None,
            status,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn only_approved_rows_count_towards_totals() {
        let rows = vec![
            row(TransactionType::Income, dec!(500), TransactionStatus::Approved),
            row(TransactionType::Income, dec!(999), TransactionStatus::Pending),
            row(TransactionType::Expense, dec!(120.25), TransactionStatus::Approved),
            row(TransactionType::Expense, dec!(50), TransactionStatus::Rejected),
        ];
        let summary = summarize(&rows, None, None);

        assert_eq!(summary.total_income, dec!(500));
        assert_eq!(summary.total_expense, dec!(120.25));
        assert_eq!(summary.net, dec!(379.75));
        assert_eq!(summary.approved_count, 2);
        assert_eq!(summary.pending_count, 1);
    }
}
