use crate::{
    db::DbPool,
    entities::tour::{self, Entity as TourEntity},
    entities::tour_price::{self, Entity as TourPriceEntity, TravelerType},
    entities::tour_version::{self, Entity as TourVersionEntity},
    errors::ServiceError,
    services::{non_blank, paginate},
    PaginatedResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTourRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 365))]
    pub duration_days: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTourVersionRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_price_window"))]
pub struct CreateTourPriceRequest {
    pub traveler_type: TravelerType,
    #[validate(custom = "validate_non_negative")]
    pub price: Decimal,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub is_active: Option<bool>,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validate_price_window(request: &CreateTourPriceRequest) -> Result<(), ValidationError> {
    if request.valid_from > request.valid_to {
        let mut err = ValidationError::new("valid_from");
        err.message = Some("valid_from must not be after valid_to".into());
        return Err(err);
    }
    Ok(())
}

/// A tour with its versions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TourDetail {
    #[serde(flatten)]
    pub tour: tour::Model,
    pub versions: Vec<tour_version::Model>,
}

/// Tour catalog: tours, versions and their price lists
#[derive(Clone)]
pub struct TourService {
    db: Arc<DbPool>,
    default_currency: String,
}

impl TourService {
    pub fn new(db: Arc<DbPool>, default_currency: String) -> Self {
        Self {
            db,
            default_currency,
        }
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_tour(&self, request: CreateTourRequest) -> Result<tour::Model, ServiceError> {
        request.validate()?;
        let code = request.code.trim().to_uppercase();

        let duplicate = TourEntity::find()
            .filter(tour::Column::Code.eq(code.as_str()))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Tour code {} already exists",
                code
            )));
        }

        let now = Utc::now();
        let model = tour::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(request.name.trim().to_string()),
            description: Set(non_blank(request.description)),
            duration_days: Set(request.duration_days),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(tour_id = %model.id, "Tour created");
        Ok(model)
    }

    pub async fn list_tours(
        &self,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<PaginatedResponse<tour::Model>, ServiceError> {
        let mut query = TourEntity::find();
        if let Some(search) = non_blank(search) {
            query = query.filter(
                Condition::any()
                    .add(tour::Column::Code.contains(&search))
                    .add(tour::Column::Name.contains(&search)),
            );
        }
        paginate(query.order_by_asc(tour::Column::Code), &*self.db, page, limit).await
    }

    pub async fn get_tour(&self, id: Uuid) -> Result<TourDetail, ServiceError> {
        let tour = self.find_tour(id).await?;
        let versions = self.list_versions(id).await?;
        Ok(TourDetail { tour, versions })
    }

    async fn find_tour(&self, id: Uuid) -> Result<tour::Model, ServiceError> {
        TourEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tour", id))
    }

    pub async fn get_version(&self, id: Uuid) -> Result<tour_version::Model, ServiceError> {
        TourVersionEntity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tour version", id))
    }

    pub async fn create_version(
        &self,
        tour_id: Uuid,
        request: CreateTourVersionRequest,
    ) -> Result<tour_version::Model, ServiceError> {
        request.validate()?;
        self.find_tour(tour_id).await?;

        let now = Utc::now();
        let model = tour_version::ActiveModel {
            id: Set(Uuid::new_v4()),
            tour_id: Set(tour_id),
            name: Set(request.name.trim().to_string()),
            description: Set(non_blank(request.description)),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(tour_id = %tour_id, version_id = %model.id, "Tour version created");
        Ok(model)
    }

    pub async fn list_versions(&self, tour_id: Uuid) -> Result<Vec<tour_version::Model>, ServiceError> {
        Ok(TourVersionEntity::find()
            .filter(tour_version::Column::TourId.eq(tour_id))
            .order_by_asc(tour_version::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_price(
        &self,
        version_id: Uuid,
        request: CreateTourPriceRequest,
    ) -> Result<tour_price::Model, ServiceError> {
        request.validate()?;
        self.get_version(version_id).await?;

        let currency = non_blank(request.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| self.default_currency.clone());
        let now = Utc::now();
        let model = tour_price::ActiveModel {
            id: Set(Uuid::new_v4()),
            tour_version_id: Set(version_id),
            traveler_type: Set(request.traveler_type),
            price: Set(request.price),
            currency: Set(currency),
            valid_from: Set(request.valid_from),
            valid_to: Set(request.valid_to),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(version_id = %version_id, price_id = %model.id, "Tour price created");
        Ok(model)
    }

    pub async fn list_prices(&self, version_id: Uuid) -> Result<Vec<tour_price::Model>, ServiceError> {
        self.get_version(version_id).await?;
        Ok(TourPriceEntity::find()
            .filter(tour_price::Column::TourVersionId.eq(version_id))
            .order_by_asc(tour_price::Column::TravelerType)
            .order_by_desc(tour_price::Column::ValidFrom)
            .all(&*self.db)
            .await?)
    }
}
