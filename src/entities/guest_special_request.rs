use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "guest_special_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub guest_id: Uuid,
    pub departure_id: Uuid,
    pub request_type: SpecialRequestType,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: SpecialRequestStatus,
    #[sea_orm(nullable)]
    pub handled_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub handled_at: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialRequestType {
    #[sea_orm(string_value = "dietary")]
    Dietary,
    #[sea_orm(string_value = "medical")]
    Medical,
    #[sea_orm(string_value = "accessibility")]
    Accessibility,
    #[sea_orm(string_value = "room")]
    Room,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,
    #[sea_orm(string_value = "fulfilled")]
    Fulfilled,
    #[sea_orm(string_value = "cannot_fulfill")]
    CannotFulfill,
}

impl SpecialRequestStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        use SpecialRequestStatus::*;
        matches!(
            (self, next),
            (Pending, Acknowledged)
                | (Pending, Fulfilled)
                | (Pending, CannotFulfill)
                | (Acknowledged, Fulfilled)
                | (Acknowledged, CannotFulfill)
        )
    }
}
