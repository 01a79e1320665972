use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-traveler-category price of a tour version over a validity window
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "tour_prices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tour_version_id: Uuid,
    pub traveler_type: TravelerType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub price: Decimal,
    pub currency: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tour_version::Entity",
        from = "Column::TourVersionId",
        to = "super::tour_version::Column::Id"
    )]
    TourVersion,
}

impl Related<super::tour_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TourVersion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Traveler category used for pricing and guest lists
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TravelerType {
    #[default]
    #[sea_orm(string_value = "adult")]
    Adult,
    #[sea_orm(string_value = "child")]
    Child,
    #[sea_orm(string_value = "infant")]
    Infant,
    #[sea_orm(string_value = "senior")]
    Senior,
}
