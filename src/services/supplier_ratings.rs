use crate::{
    db::DbPool,
    entities::departure_guest::Entity as GuestEntity,
    entities::supplier::{self, Entity as SupplierEntity},
    entities::supplier_rating::{self, Entity as SupplierRatingEntity, RatingType},
    errors::ServiceError,
    events::{Event, EventSender},
    services::non_blank,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRatingRequest {
    pub guest_id: Uuid,
    pub departure_id: Option<Uuid>,
    #[serde(default = "default_rating_type")]
    pub rating_type: RatingType,
    #[validate(range(min = 1, max = 5, message = "score must be between 1 and 5"))]
    pub score: i32,
    pub comment: Option<String>,
}

fn default_rating_type() -> RatingType {
    RatingType::Overall
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRatingRequest {
    #[validate(range(min = 1, max = 5, message = "score must be between 1 and 5"))]
    pub score: Option<i32>,
    pub comment: Option<String>,
}

/// Average of `scores` rounded to two decimals, with the count.
pub fn average_score(scores: &[i32]) -> (Decimal, i32) {
    if scores.is_empty() {
        return (Decimal::ZERO, 0);
    }
    let total: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    let average = (Decimal::from(total) / Decimal::from(scores.len() as i64)).round_dp(2);
    (average, scores.len() as i32)
}

/// Guest ratings of suppliers. Every write refreshes the supplier's
/// cached `rating` and `rating_count` in the same transaction.
#[derive(Clone)]
pub struct SupplierRatingService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierRatingService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    async fn lock_supplier(
        txn: &DatabaseTransaction,
        supplier_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        SupplierEntity::find_by_id(supplier_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))
    }

    /// Recomputes the cached average; the caller holds the supplier lock.
    async fn refresh_average(
        txn: &DatabaseTransaction,
        supplier: supplier::Model,
    ) -> Result<supplier::Model, ServiceError> {
        let scores: Vec<i32> = SupplierRatingEntity::find()
            .filter(supplier_rating::Column::SupplierId.eq(supplier.id))
            .all(txn)
            .await?
            .into_iter()
            .map(|r| r.score)
            .collect();
        let (rating, rating_count) = average_score(&scores);

        let mut active: supplier::ActiveModel = supplier.into();
        active.rating = Set(rating);
        active.rating_count = Set(rating_count);
        active.updated_at = Set(Utc::now());
        Ok(active.update(txn).await?)
    }

    async fn announce(&self, supplier: &supplier::Model) {
        self.event_sender
            .send_or_log(Event::SupplierRatingChanged {
                supplier_id: supplier.id,
                rating: supplier.rating,
                rating_count: supplier.rating_count,
            })
            .await;
    }

    /// One rating per (guest, supplier, rating type).
    #[instrument(skip(self, request), fields(guest_id = %request.guest_id))]
    pub async fn create_rating(
        &self,
        supplier_id: Uuid,
        request: CreateSupplierRatingRequest,
    ) -> Result<supplier_rating::Model, ServiceError> {
        request.validate()?;
        GuestEntity::find_by_id(request.guest_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guest", request.guest_id))?;

        let txn = self.db.begin().await?;
        let supplier = Self::lock_supplier(&txn, supplier_id).await?;

        let duplicate = SupplierRatingEntity::find()
            .filter(supplier_rating::Column::SupplierId.eq(supplier_id))
            .filter(supplier_rating::Column::GuestId.eq(request.guest_id))
            .filter(supplier_rating::Column::RatingType.eq(request.rating_type))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Guest {} already rated supplier {} for {}",
                request.guest_id, supplier_id, request.rating_type
            )));
        }

        let now = Utc::now();
        let rating = supplier_rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            guest_id: Set(request.guest_id),
            departure_id: Set(request.departure_id),
            rating_type: Set(request.rating_type),
            score: Set(request.score),
            comment: Set(non_blank(request.comment)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let supplier = Self::refresh_average(&txn, supplier).await?;
        txn.commit().await?;

        info!(supplier_id = %supplier_id, rating = %supplier.rating, count = supplier.rating_count, "Supplier rated");
        self.announce(&supplier).await;
        Ok(rating)
    }

    pub async fn list_for_supplier(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<supplier_rating::Model>, ServiceError> {
        SupplierEntity::find_by_id(supplier_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier", supplier_id))?;
        Ok(SupplierRatingEntity::find()
            .filter(supplier_rating::Column::SupplierId.eq(supplier_id))
            .order_by_desc(supplier_rating::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    async fn get_rating(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<supplier_rating::Model, ServiceError> {
        SupplierRatingEntity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Supplier rating", id))
    }

    #[instrument(skip(self, request))]
    pub async fn update_rating(
        &self,
        id: Uuid,
        request: UpdateSupplierRatingRequest,
    ) -> Result<supplier_rating::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let existing = Self::get_rating(&txn, id).await?;
        let supplier = Self::lock_supplier(&txn, existing.supplier_id).await?;

        let mut active: supplier_rating::ActiveModel = existing.into();
        if let Some(score) = request.score {
            active.score = Set(score);
        }
        if request.comment.is_some() {
            active.comment = Set(non_blank(request.comment));
        }
        active.updated_at = Set(Utc::now());
        let rating = active.update(&txn).await?;

        let supplier = Self::refresh_average(&txn, supplier).await?;
        txn.commit().await?;

        self.announce(&supplier).await;
        Ok(rating)
    }

    pub async fn delete_rating(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let existing = Self::get_rating(&txn, id).await?;
        let supplier = Self::lock_supplier(&txn, existing.supplier_id).await?;

        SupplierRatingEntity::delete_by_id(id).exec(&txn).await?;
        let supplier = Self::refresh_average(&txn, supplier).await?;
        txn.commit().await?;

        info!(rating_id = %id, supplier_id = %supplier.id, "Supplier rating deleted");
        self.announce(&supplier).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn average_is_rounded() {
        assert_eq!(average_score(&[]), (Decimal::ZERO, 0));
        assert_eq!(average_score(&[5, 4, 4]), (dec!(4.33), 3));
        assert_eq!(average_score(&[3]), (dec!(3), 1));
    }
}
