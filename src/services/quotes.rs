use crate::{
    db::DbPool,
    entities::customer::Entity as CustomerEntity,
    entities::quote::{self, Entity as QuoteEntity, QuoteStatus},
    entities::tour_departure::Entity as DepartureEntity,
    entities::tour_version::Entity as TourVersionEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        non_blank, paginate,
        pricing::{self, AdditionalService, QuotePrice, QuotePriceRequest},
    },
    PaginatedResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuoteRequest {
    pub customer_id: Uuid,
    pub tour_version_id: Uuid,
    pub departure_id: Option<Uuid>,
    pub departure_date: NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub adult_count: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub child_count: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub infant_count: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub senior_count: i32,
    #[serde(default)]
    #[validate]
    pub additional_services: Vec<AdditionalService>,
    #[validate(custom = "validate_discount")]
    pub discount_amount: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuoteRequest {
    pub departure_id: Option<Uuid>,
    pub departure_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub adult_count: Option<i32>,
    #[validate(range(min = 0))]
    pub child_count: Option<i32>,
    #[validate(range(min = 0))]
    pub infant_count: Option<i32>,
    #[validate(range(min = 0))]
    pub senior_count: Option<i32>,
    #[validate]
    pub additional_services: Option<Vec<AdditionalService>>,
    #[validate(custom = "validate_discount")]
    pub discount_amount: Option<Decimal>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
    pub actor_id: Option<Uuid>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    pub customer_id: Option<Uuid>,
    pub search: Option<String>,
}

fn validate_discount(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("discount_amount");
        err.message = Some("discount_amount must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// `QT<unix-millis><3 random digits>`
pub fn generate_quote_number(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("QT{}{:03}", now.timestamp_millis(), suffix)
}

/// Discount must stay within `0..=subtotal`. Returns the final amount.
fn apply_discount(subtotal: Decimal, discount: Decimal) -> Result<Decimal, ServiceError> {
    if discount < Decimal::ZERO || discount > subtotal {
        return Err(ServiceError::ValidationError(format!(
            "discount_amount {} must be between 0 and the subtotal {}",
            discount, subtotal
        )));
    }
    Ok(subtotal - discount)
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, ServiceError> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::InternalError(format!("Failed to encode quote payload: {}", e)))
}

/// Decodes the services saved on a quote. A row that cannot be decoded is
/// an error rather than an empty list, so repricing never drops lines.
fn stored_services(quote: &quote::Model) -> Result<Vec<AdditionalService>, ServiceError> {
    serde_json::from_value(quote.additional_services.clone()).map_err(|e| {
        error!(quote_id = %quote.id, error = %e, "Stored additional services are unreadable");
        ServiceError::InternalError(format!(
            "Quote {} has unreadable additional services: {}",
            quote.id, e
        ))
    })
}

/// Quotes: transactional creation, lifecycle and expiry
#[derive(Clone)]
pub struct QuoteService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    default_currency: String,
}

impl QuoteService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, default_currency: String) -> Self {
        Self {
            db,
            event_sender,
            default_currency,
        }
    }

    /// Prices a prospective quote without persisting anything.
    pub async fn calculate(&self, request: QuotePriceRequest) -> Result<QuotePrice, ServiceError> {
        pricing::calculate_quote_price(&*self.db, &request, &self.default_currency).await
    }

    /// Creates a draft quote. All checks, the price lookup and the insert run
    /// in one transaction; any failure leaves no row behind.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_quote(&self, request: CreateQuoteRequest) -> Result<quote::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for quote creation");
            ServiceError::DatabaseError(e)
        })?;

        let model = match self.insert_quote(&txn, request, now).await {
            Ok(model) => model,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, "Failed to roll back quote creation");
                }
                warn!(error = %e, "Quote creation rolled back");
                return Err(e);
            }
        };

        txn.commit().await.map_err(|e| {
            error!(error = %e, quote_id = %model.id, "Failed to commit quote creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(quote_id = %model.id, quote_number = %model.quote_number, "Quote created");
        self.event_sender
            .send_or_log(Event::QuoteCreated {
                quote_id: model.id,
                quote_number: model.quote_number.clone(),
                final_amount: model.final_amount,
            })
            .await;
        Ok(model)
    }

    async fn insert_quote(
        &self,
        txn: &DatabaseTransaction,
        request: CreateQuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<quote::Model, ServiceError> {
        let customer = CustomerEntity::find_by_id(request.customer_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", request.customer_id))?;
        if customer.is_blacklisted {
            return Err(ServiceError::InvalidOperation(format!(
                "Customer {} is blacklisted",
                customer.id
            )));
        }

        self.check_version_and_departure(
            txn,
            request.tour_version_id,
            request.departure_id,
            request.departure_date,
        )
        .await?;

        let price_request = QuotePriceRequest {
            tour_version_id: request.tour_version_id,
            departure_date: request.departure_date,
            adult_count: request.adult_count,
            child_count: request.child_count,
            infant_count: request.infant_count,
            senior_count: request.senior_count,
            additional_services: request.additional_services,
        };
        let price =
            pricing::calculate_quote_price(txn, &price_request, &self.default_currency).await?;

        let discount = request.discount_amount.unwrap_or(Decimal::ZERO);
        let final_amount = apply_discount(price.subtotal, discount)?;

        let model = quote::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_number: Set(generate_quote_number(now)),
            customer_id: Set(customer.id),
            tour_version_id: Set(request.tour_version_id),
            departure_id: Set(request.departure_id),
            departure_date: Set(request.departure_date),
            adult_count: Set(price_request.adult_count),
            child_count: Set(price_request.child_count),
            infant_count: Set(price_request.infant_count),
            senior_count: Set(price_request.senior_count),
            additional_services: Set(to_json(&price_request.additional_services)?),
            price_breakdown: Set(to_json(&price.breakdown)?),
            subtotal: Set(price.subtotal),
            discount_amount: Set(discount),
            final_amount: Set(final_amount),
            currency: Set(price.currency),
            valid_until: Set(request.valid_until),
            status: Set(QuoteStatus::Draft),
            notes: Set(non_blank(request.notes)),
            created_by: Set(request.created_by),
            sent_at: Set(None),
            sent_by: Set(None),
            accepted_at: Set(None),
            accepted_by: Set(None),
            rejected_at: Set(None),
            rejected_by: Set(None),
            rejection_reason: Set(None),
            expired_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        Ok(model)
    }

    async fn check_version_and_departure(
        &self,
        txn: &DatabaseTransaction,
        tour_version_id: Uuid,
        departure_id: Option<Uuid>,
        departure_date: NaiveDate,
    ) -> Result<(), ServiceError> {
        TourVersionEntity::find_by_id(tour_version_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tour version", tour_version_id))?;

        if let Some(departure_id) = departure_id {
            let departure = DepartureEntity::find_by_id(departure_id)
                .one(txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("Departure", departure_id))?;
            if departure.tour_version_id != tour_version_id {
                return Err(ServiceError::ValidationError(format!(
                    "Departure {} does not belong to tour version {}",
                    departure_id, tour_version_id
                )));
            }
            if departure.departure_date != departure_date {
                return Err(ServiceError::ValidationError(format!(
                    "departure_date {} does not match departure {} on {}",
                    departure_date, departure_id, departure.departure_date
                )));
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_quote(&self, id: Uuid) -> Result<quote::Model, ServiceError> {
        QuoteEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", id))
    }

    pub async fn list_quotes(
        &self,
        filter: QuoteFilter,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<quote::Model>, ServiceError> {
        let mut query = QuoteEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(quote::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(quote::Column::CustomerId.eq(customer_id));
        }
        if let Some(search) = non_blank(filter.search) {
            query = query.filter(quote::Column::QuoteNumber.contains(&search));
        }
        paginate(
            query.order_by_desc(quote::Column::CreatedAt),
            &*self.db,
            page,
            limit,
        )
        .await
    }

    async fn lock_quote(&self, txn: &DatabaseTransaction, id: Uuid) -> Result<quote::Model, ServiceError> {
        QuoteEntity::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Quote", id))
    }

    /// Edits a draft. Changing head-counts, services, date or discount reprices it.
    #[instrument(skip(self, request))]
    pub async fn update_quote(
        &self,
        id: Uuid,
        request: UpdateQuoteRequest,
    ) -> Result<quote::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;

        let existing = self.lock_quote(&txn, id).await?;
        if existing.status != QuoteStatus::Draft {
            return Err(ServiceError::InvalidOperation(format!(
                "Only draft quotes can be edited; quote {} is {}",
                id, existing.status
            )));
        }

        let reprice = request.departure_id.is_some()
            || request.departure_date.is_some()
            || request.adult_count.is_some()
            || request.child_count.is_some()
            || request.infant_count.is_some()
            || request.senior_count.is_some()
            || request.additional_services.is_some()
            || request.discount_amount.is_some();

        let mut active: quote::ActiveModel = existing.clone().into();

        if reprice {
            let current_services = stored_services(&existing)?;
            let departure_id = request.departure_id.or(existing.departure_id);
            let price_request = QuotePriceRequest {
                tour_version_id: existing.tour_version_id,
                departure_date: request.departure_date.unwrap_or(existing.departure_date),
                adult_count: request.adult_count.unwrap_or(existing.adult_count),
                child_count: request.child_count.unwrap_or(existing.child_count),
                infant_count: request.infant_count.unwrap_or(existing.infant_count),
                senior_count: request.senior_count.unwrap_or(existing.senior_count),
                additional_services: request.additional_services.unwrap_or(current_services),
            };

            self.check_version_and_departure(
                &txn,
                price_request.tour_version_id,
                departure_id,
                price_request.departure_date,
            )
            .await?;
            let price =
                pricing::calculate_quote_price(&txn, &price_request, &self.default_currency)
                    .await?;
            let discount = request.discount_amount.unwrap_or(existing.discount_amount);
            let final_amount = apply_discount(price.subtotal, discount)?;

            active.departure_id = Set(departure_id);
            active.departure_date = Set(price_request.departure_date);
            active.adult_count = Set(price_request.adult_count);
            active.child_count = Set(price_request.child_count);
            active.infant_count = Set(price_request.infant_count);
            active.senior_count = Set(price_request.senior_count);
            active.additional_services = Set(to_json(&price_request.additional_services)?);
            active.price_breakdown = Set(to_json(&price.breakdown)?);
            active.subtotal = Set(price.subtotal);
            active.discount_amount = Set(discount);
            active.final_amount = Set(final_amount);
            active.currency = Set(price.currency);
        }

        if let Some(valid_until) = request.valid_until {
            active.valid_until = Set(Some(valid_until));
        }
        if request.notes.is_some() {
            active.notes = Set(non_blank(request.notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        self.event_sender.send_or_log(Event::QuoteUpdated(id)).await;
        Ok(updated)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateQuoteStatusRequest,
    ) -> Result<quote::Model, ServiceError> {
        self.update_status_at(id, request, Utc::now()).await
    }

    /// Moves a quote along its lifecycle, stamping the matching timestamp and actor.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_status_at(
        &self,
        id: Uuid,
        request: UpdateQuoteStatusRequest,
        now: DateTime<Utc>,
    ) -> Result<quote::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = self.lock_quote(&txn, id).await?;
        let old_status = existing.status;
        let new_status = request.status;

        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move quote from {} to {}",
                old_status, new_status
            )));
        }

        if new_status == QuoteStatus::Accepted {
            if let Some(valid_until) = existing.valid_until {
                if valid_until < now.date_naive() {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Quote {} expired on {}",
                        id, valid_until
                    )));
                }
            }
        }

        let mut active: quote::ActiveModel = existing.into();
        active.status = Set(new_status);
        match new_status {
            QuoteStatus::Sent => {
                active.sent_at = Set(Some(now));
                active.sent_by = Set(request.actor_id);
            }
            QuoteStatus::Accepted => {
                active.accepted_at = Set(Some(now));
                active.accepted_by = Set(request.actor_id);
            }
            QuoteStatus::Rejected => {
                active.rejected_at = Set(Some(now));
                active.rejected_by = Set(request.actor_id);
                active.rejection_reason = Set(non_blank(request.reason));
            }
            QuoteStatus::Expired => {
                active.expired_at = Set(Some(now));
            }
            QuoteStatus::Draft => {}
        }
        active.updated_at = Set(now);

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(quote_id = %id, from = %old_status, to = %new_status, "Quote status changed");
        self.event_sender
            .send_or_log(Event::QuoteStatusChanged {
                quote_id: id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Only drafts can be deleted.
    pub async fn delete_quote(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_quote(id).await?;
        if existing.status != QuoteStatus::Draft {
            return Err(ServiceError::InvalidOperation(format!(
                "Only draft quotes can be deleted; quote {} is {}",
                id, existing.status
            )));
        }
        QuoteEntity::delete_by_id(id).exec(&*self.db).await?;
        info!(quote_id = %id, "Quote deleted");
        Ok(())
    }

    /// Sent quotes whose `valid_until` is before `today` become expired.
    #[instrument(skip(self))]
    pub async fn expire_overdue_quotes(&self, today: NaiveDate) -> Result<u64, ServiceError> {
        let now = Utc::now();
        let result = QuoteEntity::update_many()
            .col_expr(quote::Column::Status, Expr::value(QuoteStatus::Expired))
            .col_expr(quote::Column::ExpiredAt, Expr::value(now))
            .col_expr(quote::Column::UpdatedAt, Expr::value(now))
            .filter(quote::Column::Status.eq(QuoteStatus::Sent))
            .filter(quote::Column::ValidUntil.is_not_null())
            .filter(quote::Column::ValidUntil.lt(today))
            .exec(&*self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(count = result.rows_affected, "Expired overdue quotes");
        }
        self.event_sender
            .send_or_log(Event::QuotesExpired(result.rows_affected))
            .await;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn quote_number_format() {
        let now = Utc::now();
        let number = generate_quote_number(now);
        let millis = now.timestamp_millis().to_string();

        assert!(number.starts_with("QT"));
        assert_eq!(number.len(), 2 + millis.len() + 3);
        assert_eq!(&number[2..2 + millis.len()], millis);
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
    }

    fn quote_with_services(services: serde_json::Value) -> quote::Model {
        let now = Utc::now();
        quote::Model {
            id: Uuid::new_v4(),
            quote_number: generate_quote_number(now),
            customer_id: Uuid::new_v4(),
            tour_version_id: Uuid::new_v4(),
            departure_id: None,
            departure_date: now.date_naive(),
            adult_count: 1,
            child_count: 0,
            infant_count: 0,
            senior_count: 0,
            additional_services: services,
            price_breakdown: serde_json::json!([]),
            subtotal: dec!(100),
            discount_amount: dec!(0),
            final_amount: dec!(100),
            currency: "VND".into(),
            valid_until: None,
            status: QuoteStatus::Draft,
            notes: None,
            created_by: None,
            sent_at: None,
            sent_by: None,
            accepted_at: None,
            accepted_by: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
            expired_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stored_services_decode_or_fail_loudly() {
        let quote = quote_with_services(serde_json::json!([
            { "name": "Airport transfer", "quantity": 2, "unit_price": "15" }
        ]));
        let services = stored_services(&quote).unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].unit_price, dec!(15));

        let corrupt = quote_with_services(serde_json::json!({ "name": "not a list" }));
        assert_matches!(stored_services(&corrupt), Err(ServiceError::InternalError(_)));
    }

    #[test]
    fn discount_bounds() {
        assert_eq!(apply_discount(dec!(250), dec!(50)).unwrap(), dec!(200));
        assert_eq!(apply_discount(dec!(250), dec!(250)).unwrap(), dec!(0));
        assert_matches!(
            apply_discount(dec!(250), dec!(251)),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            apply_discount(dec!(250), dec!(-1)),
            Err(ServiceError::ValidationError(_))
        );
    }
}
