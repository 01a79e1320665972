use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::debt::{self, DebtStatus, DebtType, Entity as DebtEntity},
    entities::debt_payment::{self, Entity as DebtPaymentEntity},
    entities::supplier::Entity as SupplierEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_counterparty"))]
pub struct CreateDebtRequest {
    pub debt_type: DebtType,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_positive_amount")]
    pub original_amount: Decimal,
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Receivables are owed by a customer, payables to a supplier.
fn validate_counterparty(request: &CreateDebtRequest) -> Result<(), ValidationError> {
    let (field, present) = match request.debt_type {
        DebtType::Receivable => ("customer_id", request.customer_id.is_some()),
        DebtType::Payable => ("supplier_id", request.supplier_id.is_some()),
    };
    if !present {
        let mut err = ValidationError::new("counterparty");
        err.message = Some(format!("{} is required for a {} debt", field, request.debt_type).into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("amount");
        err.message = Some("amount must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
    pub note: Option<String>,
    /// Defaults to the time the payment is recorded
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtFilter {
    pub debt_type: Option<DebtType>,
    pub status: Option<DebtStatus>,
    pub customer_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentRecorded {
    pub debt: debt::Model,
    pub payment: debt_payment::Model,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DebtSummary {
    pub receivable_outstanding: Decimal,
    pub receivable_overdue: Decimal,
    pub receivable_count: u64,
    pub payable_outstanding: Decimal,
    pub payable_overdue: Decimal,
    pub payable_count: u64,
}

impl DebtSummary {
    fn from_debts<'a>(debts: impl IntoIterator<Item = &'a debt::Model>) -> Self {
        let mut summary = Self::default();
        for debt in debts {
            if debt.status == DebtStatus::Paid {
                continue;
            }
            let overdue = if debt.status == DebtStatus::Overdue {
                debt.remaining_amount
            } else {
                Decimal::ZERO
            };
            match debt.debt_type {
                DebtType::Receivable => {
                    summary.receivable_outstanding += debt.remaining_amount;
                    summary.receivable_overdue += overdue;
                    summary.receivable_count += 1;
                }
                DebtType::Payable => {
                    summary.payable_outstanding += debt.remaining_amount;
                    summary.payable_overdue += overdue;
                    summary.payable_count += 1;
                }
            }
        }
        summary
    }
}

/// Receivables, payables and their payment history
#[derive(Clone)]
pub struct DebtService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_currency: String,
}

impl DebtService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, default_currency: String) -> Self {
        Self {
            db,
            event_sender,
            default_currency,
        }
    }

    /// New debts start `pending`; only the overdue sweep marks them overdue.
    #[instrument(skip(self, request), fields(debt_type = %request.debt_type))]
    pub async fn create_debt(&self, request: CreateDebtRequest) -> Result<debt::Model, ServiceError> {
        request.validate()?;
        if let Some(customer_id) = request.customer_id {
            CustomerEntity::find_by_id(customer_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Customer", customer_id))?;
        }
        if let Some(supplier_id) = request.supplier_id {
            SupplierEntity::find_by_id(supplier_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))?;
        }
        let now = Utc::now();

        let debt = debt::ActiveModel {
            id: Set(Uuid::new_v4()),
            debt_type: Set(request.debt_type),
            customer_id: Set(request.customer_id),
            supplier_id: Set(request.supplier_id),
            reference: Set(non_blank(request.reference)),
            description: Set(non_blank(request.description)),
            original_amount: Set(request.original_amount),
            paid_amount: Set(Decimal::ZERO),
            remaining_amount: Set(request.original_amount),
            currency: Set(request
                .currency
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| self.default_currency.clone())),
            due_date: Set(request.due_date),
            status: Set(DebtStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(debt_id = %debt.id, amount = %debt.original_amount, "Debt created");
        self.event_sender.send_or_log(Event::DebtCreated(debt.id)).await;
        Ok(debt)
    }

    pub async fn get_debt(&self, id: Uuid) -> Result<debt::Model, ServiceError> {
        DebtEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Debt", id))
    }

    pub async fn list_debts(
        &self,
        filter: DebtFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<debt::Model>, ServiceError> {
        let mut query = DebtEntity::find();
        if let Some(debt_type) = filter.debt_type {
            query = query.filter(debt::Column::DebtType.eq(debt_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(debt::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(debt::Column::CustomerId.eq(customer_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(debt::Column::SupplierId.eq(supplier_id));
        }
        paginate(query.order_by_desc(debt::Column::CreatedAt), &*self.db, page, limit).await
    }

    pub async fn list_payments(&self, debt_id: Uuid) -> Result<Vec<debt_payment::Model>, ServiceError> {
        self.get_debt(debt_id).await?;
        Ok(DebtPaymentEntity::find()
            .filter(debt_payment::Column::DebtId.eq(debt_id))
            .order_by_asc(debt_payment::Column::PaidAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn record_payment(
        &self,
        debt_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<PaymentRecorded, ServiceError> {
        self.record_payment_at(debt_id, request, Utc::now()).await
    }

    /// Applies a payment to a debt. The debt row stays locked from the
    /// balance check to the commit so concurrent payments cannot overpay.
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn record_payment_at(
        &self,
        debt_id: Uuid,
        request: RecordPaymentRequest,
        now: DateTime<Utc>,
    ) -> Result<PaymentRecorded, ServiceError> {
        request.validate()?;

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for debt payment");
            ServiceError::DatabaseError(e)
        })?;

        let debt = DebtEntity::find_by_id(debt_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Debt", debt_id))?;

        let outstanding = debt.original_amount - debt.paid_amount;
        if request.amount > outstanding {
            warn!(debt_id = %debt_id, outstanding = %outstanding, "Payment exceeds outstanding balance");
            return Err(ServiceError::ValidationError(format!(
                "Payment {} exceeds the outstanding balance {}",
                request.amount, outstanding
            )));
        }

        let paid_amount = debt.paid_amount + request.amount;
        let remaining_amount = debt.original_amount - paid_amount;
        let status = DebtStatus::derive(paid_amount, remaining_amount, debt.due_date, now.date_naive());

        let payment = debt_payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            debt_id: Set(debt_id),
            amount: Set(request.amount),
            payment_method: Set(non_blank(request.payment_method)),
            note: Set(non_blank(request.note)),
            paid_at: Set(request.paid_at.unwrap_or(now)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: debt::ActiveModel = debt.into();
        active.paid_amount = Set(paid_amount);
        active.remaining_amount = Set(remaining_amount);
        active.status = Set(status);
        active.updated_at = Set(now);
        let debt = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, debt_id = %debt_id, "Failed to commit debt payment");
            ServiceError::DatabaseError(e)
        })?;

        info!(debt_id = %debt_id, payment_id = %payment.id, status = %status, "Debt payment recorded");
        self.event_sender
            .send_or_log(Event::DebtPaymentRecorded {
                debt_id,
                payment_id: payment.id,
                amount: payment.amount,
                new_status: status.to_string(),
            })
            .await;

        Ok(PaymentRecorded { debt, payment })
    }

    /// Pending and partial debts due before `today` become overdue.
    #[instrument(skip(self))]
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, ServiceError> {
        let result = DebtEntity::update_many()
            .col_expr(debt::Column::Status, Expr::value(DebtStatus::Overdue))
            .col_expr(debt::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(debt::Column::Status.is_in([DebtStatus::Pending, DebtStatus::Partial]))
            .filter(debt::Column::DueDate.is_not_null())
            .filter(debt::Column::DueDate.lt(today))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(count = result.rows_affected, "Debts marked overdue");
        }
        self.event_sender
            .send_or_log(Event::DebtsMarkedOverdue(result.rows_affected))
            .await;
        Ok(result.rows_affected)
    }

    pub async fn summary(&self) -> Result<DebtSummary, ServiceError> {
        let open = DebtEntity::find()
            .filter(debt::Column::Status.ne(DebtStatus::Paid))
            .all(&*self.db)
            .await?;
        Ok(DebtSummary::from_debts(&open))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn debt(debt_type: DebtType, remaining: Decimal, status: DebtStatus) -> debt::Model {
        let now = Utc::now();
        debt::Model {
            id: Uuid::new_v4(),
            debt_type,
            customer_id: None,
            supplier_id: None,
            reference: None,
            description: None,
            original_amount: remaining,
            paid_amount: Decimal::ZERO,
            remaining_amount: remaining,
            currency: "VND".into(),
            due_date: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn summary_splits_by_direction() {
        let debts = vec![
            debt(DebtType::Receivable, dec!(100), DebtStatus::Pending),
            debt(DebtType::Receivable, dec!(40), DebtStatus::Overdue),
            debt(DebtType::Payable, dec!(75.50), DebtStatus::Partial),
            debt(DebtType::Payable, dec!(0), DebtStatus::Paid),
        ];
        let summary = DebtSummary::from_debts(&debts);

        assert_eq!(summary.receivable_outstanding, dec!(140));
        assert_eq!(summary.receivable_overdue, dec!(40));
        assert_eq!(summary.receivable_count, 2);
        assert_eq!(summary.payable_outstanding, dec!(75.50));
        assert_eq!(summary.payable_overdue, dec!(0));
        assert_eq!(summary.payable_count, 1);
    }

    #[test]
    fn receivable_requires_customer() {
        let request = CreateDebtRequest {
            debt_type: DebtType::Receivable,
            customer_id: None,
            supplier_id: Some(Uuid::new_v4()),
            reference: None,
            description: None,
            original_amount: dec!(10),
            currency: None,
            due_date: None,
        };
        assert!(request.validate().is_err());

        let request = CreateDebtRequest {
            customer_id: Some(Uuid::new_v4()),
            ..request
        };
        assert!(request.validate().is_ok());
    }
}
