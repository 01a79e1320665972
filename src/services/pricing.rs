/*!
 * Quote price calculation.
 *
 * Prices are looked up per traveler category among the active rows of a tour
 * version whose validity window contains the departure date. When several
 * rows match a category, the one with the latest `valid_from` wins.
 */

use crate::{
    entities::tour_price::{self, Entity as TourPriceEntity, TravelerType},
    errors::ServiceError,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Category order of the traveler lines in a breakdown
pub const TRAVELER_ORDER: [TravelerType; 4] = [
    TravelerType::Adult,
    TravelerType::Child,
    TravelerType::Infant,
    TravelerType::Senior,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdditionalService {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(custom = "validate_unit_price")]
    pub unit_price: Decimal,
}

fn validate_unit_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("unit_price");
        err.message = Some("unit_price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_has_travelers"))]
pub struct QuotePriceRequest {
    pub tour_version_id: Uuid,
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
}

fn validate_has_travelers(request: &QuotePriceRequest) -> Result<(), ValidationError> {
    if request.total_travelers() <= 0 {
        let mut err = ValidationError::new("travelers");
        err.message = Some("at least one traveler is required".into());
        return Err(err);
    }
    Ok(())
}

impl QuotePriceRequest {
    pub fn count_for(&self, traveler_type: TravelerType) -> i32 {
        match traveler_type {
            TravelerType::Adult => self.adult_count,
            TravelerType::Child => self.child_count,
            TravelerType::Infant => self.infant_count,
            TravelerType::Senior => self.senior_count,
        }
    }

    pub fn total_travelers(&self) -> i32 {
        TRAVELER_ORDER.iter().map(|t| self.count_for(*t).max(0)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    Traveler,
    Service,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceLine {
    pub item_type: LineItemType,
    pub label: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuotePrice {
    pub tour_version_id: Uuid,
    pub departure_date: NaiveDate,
    pub currency: String,
    pub breakdown: Vec<PriceLine>,
    pub subtotal: Decimal,
}

/// `unit_price * quantity`, refusing amounts that do not fit a decimal.
pub(crate) fn line_amount(unit_price: Decimal, quantity: i32) -> Result<Decimal, ServiceError> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(|| ServiceError::ValidationError("amount overflow".to_string()))
}

/// Picks, per category, the price row with the latest `valid_from`.
fn pick_price(rows: &[tour_price::Model], traveler_type: TravelerType) -> Option<&tour_price::Model> {
    rows.iter()
        .filter(|row| row.traveler_type == traveler_type)
        .max_by_key(|row| row.valid_from)
}

/// Builds the breakdown from candidate price rows. `rows` must already be
/// restricted to active rows valid on the departure date.
pub fn compute_price(
    request: &QuotePriceRequest,
    rows: &[tour_price::Model],
    default_currency: &str,
) -> Result<QuotePrice, ServiceError> {
    let mut breakdown = Vec::new();
    let mut currency: Option<String> = None;

    for traveler_type in TRAVELER_ORDER {
        let quantity = request.count_for(traveler_type);
        if quantity <= 0 {
            continue;
        }

        let row = pick_price(rows, traveler_type).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "No active {} price for tour version {} on {}",
                traveler_type, request.tour_version_id, request.departure_date
            ))
        })?;

        if currency.is_none() {
            currency = Some(row.currency.clone());
        }
        breakdown.push(PriceLine {
            item_type: LineItemType::Traveler,
            label: traveler_type.to_string(),
            quantity,
            unit_price: row.price,
            amount: line_amount(row.price, quantity)?,
        });
    }

    for service in &request.additional_services {
        breakdown.push(PriceLine {
            item_type: LineItemType::Service,
            label: service.name.clone(),
            quantity: service.quantity,
            unit_price: service.unit_price,
            amount: line_amount(service.unit_price, service.quantity)?,
        });
    }

    let subtotal = breakdown
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.amount))
        .ok_or_else(|| ServiceError::ValidationError("amount overflow".to_string()))?;

    Ok(QuotePrice {
        tour_version_id: request.tour_version_id,
        departure_date: request.departure_date,
        currency: currency.unwrap_or_else(|| default_currency.to_string()),
        breakdown,
        subtotal,
    })
}

/// Loads the candidate price rows and computes the price. Runs on any
/// connection so quote creation can call it inside its transaction.
pub async fn calculate_quote_price<C: ConnectionTrait>(
    conn: &C,
    request: &QuotePriceRequest,
    default_currency: &str,
) -> Result<QuotePrice, ServiceError> {
    request.validate()?;

    let rows = TourPriceEntity::find()
        .filter(tour_price::Column::TourVersionId.eq(request.tour_version_id))
        .filter(tour_price::Column::IsActive.eq(true))
        .filter(tour_price::Column::ValidFrom.lte(request.departure_date))
        .filter(tour_price::Column::ValidTo.gte(request.departure_date))
        .order_by_desc(tour_price::Column::ValidFrom)
        .all(conn)
        .await?;

    compute_price(request, &rows, default_currency)
}
