use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Priced proposal for a customer against a tour version and departure date
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub quote_number: String,
    pub customer_id: Uuid,
    pub tour_version_id: Uuid,
    #[sea_orm(nullable)]
    pub departure_id: Option<Uuid>,
    pub departure_date: NaiveDate,
    pub adult_count: i32,
    pub child_count: i32,
    pub infant_count: i32,
    pub senior_count: i32,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Object)]
    pub additional_services: Json,
    #[sea_orm(column_type = "Json")]
    #[schema(value_type = Object)]
    pub price_breakdown: Json,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub discount_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub final_amount: Decimal,
    pub currency: String,
    #[sea_orm(nullable)]
    pub valid_until: Option<NaiveDate>,
    pub status: QuoteStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(nullable)]
    pub created_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub sent_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub sent_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub accepted_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub accepted_by: Option<Uuid>,
    #[sea_orm(nullable)]
    pub rejected_at: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub rejected_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    #[sea_orm(nullable)]
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Quote lifecycle: `draft -> sent -> accepted | rejected | expired`, and `draft -> expired`.
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
pub enum QuoteStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl QuoteStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Expired) | (Sent, Accepted) | (Sent, Rejected) | (Sent, Expired)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::QuoteStatus::*;

    #[test]
    fn lifecycle_transitions() {
        assert!(Draft.can_transition_to(Sent));
        assert!(Draft.can_transition_to(Expired));
        assert!(Sent.can_transition_to(Accepted));
        assert!(Sent.can_transition_to(Rejected));
        assert!(Sent.can_transition_to(Expired));

        assert!(!Draft.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Expired.can_transition_to(Sent));
        assert!(!Sent.can_transition_to(Draft));
    }
}
