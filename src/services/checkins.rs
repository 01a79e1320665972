//! Guest attendance against the scheduled activities of a departure.
//!
//! Each (activity, guest) pair has at most one row. Rows start `pending`
//! and move to `checked_in`, `missed` or `excused`. The auto-processing
//! sweep only ever touches `pending` rows.

use crate::{
    db::DbPool,
    entities::activity_checkin::{self, CheckinMethod, CheckinStatus, Entity as CheckinEntity},
    entities::departure_activity::{self, Entity as ActivityEntity},
    entities::departure_guest::{self, Entity as GuestEntity},
    entities::tour_departure::Entity as DepartureEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::non_blank,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_coordinates"))]
pub struct CheckInRequest {
    pub guest_id: Uuid,
    pub checked_in_by: Option<Uuid>,
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be within [-90, 90]"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be within [-180, 180]"))]
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

fn validate_coordinates(request: &CheckInRequest) -> Result<(), ValidationError> {
    if request.latitude.is_some() != request.longitude.is_some() {
        let mut err = ValidationError::new("coordinates");
        err.message = Some("latitude and longitude must be given together".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkCheckInRequest {
    #[validate(length(min = 1, message = "guest_ids must not be empty"))]
    pub guest_ids: Vec<Uuid>,
    pub checked_in_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkCheckInResult {
    pub checked_in: Vec<Uuid>,
    pub already_checked_in: Vec<Uuid>,
    pub not_in_departure: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ExcuseRequest {
    pub guest_id: Uuid,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
    pub excused_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetRequest {
    pub guest_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AutoProcessRequest {
    pub departure_id: Option<Uuid>,
    /// Evaluation time; defaults to now
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AutoProcessResult {
    pub activities_processed: u64,
    pub auto_checked_in: u64,
    pub marked_missed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityStats {
    pub activity_id: Uuid,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub total: u64,
    pub pending: u64,
    pub checked_in: u64,
    pub missed: u64,
    pub excused: u64,
    /// Percentage of non-excused guests who checked in, two decimals
    pub attendance_rate: Decimal,
}

impl ActivityStats {
    fn from_rows<'a>(
        activity: &departure_activity::Model,
        rows: impl IntoIterator<Item = &'a activity_checkin::Model>,
    ) -> Self {
        let mut stats = Self {
            activity_id: activity.id,
            title: activity.title.clone(),
            starts_at: Some(activity.starts_at),
            ..Default::default()
        };
        for row in rows {
            stats.total += 1;
            match row.status {
                CheckinStatus::Pending => stats.pending += 1,
                CheckinStatus::CheckedIn => stats.checked_in += 1,
                CheckinStatus::Missed => stats.missed += 1,
                CheckinStatus::Excused => stats.excused += 1,
            }
        }
        stats.attendance_rate = attendance_rate(stats.checked_in, stats.total - stats.excused);
        stats
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartureCheckinSummary {
    pub departure_id: Uuid,
    pub guest_count: u64,
    pub activities: Vec<ActivityStats>,
    pub overall_attendance_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuestCheckinEntry {
    #[serde(flatten)]
    pub checkin: activity_checkin::Model,
    pub activity_title: Option<String>,
    pub activity_starts_at: Option<DateTime<Utc>>,
}

/// `checked_in / eligible` as a percentage rounded to two decimals; 0 when nobody is eligible.
pub fn attendance_rate(checked_in: u64, eligible: u64) -> Decimal {
    if eligible == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(checked_in) * Decimal::ONE_HUNDRED / Decimal::from(eligible)).round_dp(2)
}

async fn persist(
    txn: &DatabaseTransaction,
    active: activity_checkin::ActiveModel,
    is_new: bool,
) -> Result<activity_checkin::Model, ServiceError> {
    let saved = if is_new {
        active.insert(txn).await?
    } else {
        active.update(txn).await?
    };
    Ok(saved)
}

/// What the sweep does to the pending rows of `activity` at `now`, if anything.
pub fn auto_outcome(
    activity: &departure_activity::Model,
    now: DateTime<Utc>,
    missed_grace: Duration,
) -> Option<CheckinStatus> {
    if activity.starts_at > now {
        None
    } else if activity.auto_checkin {
        Some(CheckinStatus::CheckedIn)
    } else if activity.starts_at + missed_grace <= now {
        Some(CheckinStatus::Missed)
    } else {
        None
    }
}

#[derive(Clone)]
pub struct CheckinService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    missed_grace: Duration,
}

impl CheckinService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, missed_grace_minutes: i64) -> Self {
        Self {
            db,
            event_sender,
            missed_grace: Duration::minutes(missed_grace_minutes),
        }
    }

    async fn get_activity<C: ConnectionTrait>(
        &self,
        conn: &C,
        activity_id: Uuid,
    ) -> Result<departure_activity::Model, ServiceError> {
        ActivityEntity::find_by_id(activity_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Activity", activity_id))
    }

    /// Loads the guest and checks they travel on the activity's departure.
    async fn guest_of_activity<C: ConnectionTrait>(
        &self,
        conn: &C,
        activity: &departure_activity::Model,
        guest_id: Uuid,
    ) -> Result<departure_guest::Model, ServiceError> {
        let guest = GuestEntity::find_by_id(guest_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guest", guest_id))?;
        if guest.departure_id != activity.departure_id {
            return Err(ServiceError::ValidationError(format!(
                "Guest {} is not on departure {}",
                guest_id, activity.departure_id
            )));
        }
        Ok(guest)
    }

    async fn find_row(
        &self,
        txn: &DatabaseTransaction,
        activity_id: Uuid,
        guest_id: Uuid,
    ) -> Result<Option<activity_checkin::Model>, ServiceError> {
        Ok(CheckinEntity::find()
            .filter(activity_checkin::Column::ActivityId.eq(activity_id))
            .filter(activity_checkin::Column::GuestId.eq(guest_id))
            .lock_exclusive()
            .one(txn)
            .await?)
    }

    fn pending_row(
        activity: &departure_activity::Model,
        guest_id: Uuid,
        now: DateTime<Utc>,
    ) -> activity_checkin::ActiveModel {
        activity_checkin::ActiveModel {
            id: Set(Uuid::new_v4()),
            activity_id: Set(activity.id),
            departure_id: Set(activity.departure_id),
            guest_id: Set(guest_id),
            status: Set(CheckinStatus::Pending),
            method: Set(None),
            checked_in_at: Set(None),
            checked_in_by: Set(None),
            latitude: Set(None),
            longitude: Set(None),
            excuse_reason: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    /// Creates a pending row for every (activity, guest) pair of the
    /// departure that has none yet. Returns the number of rows created.
    #[instrument(skip(self))]
    pub async fn initialize(&self, departure_id: Uuid) -> Result<u64, ServiceError> {
        DepartureEntity::find_by_id(departure_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", departure_id))?;

        let txn = self.db.begin().await?;
        let activities = ActivityEntity::find()
            .filter(departure_activity::Column::DepartureId.eq(departure_id))
            .all(&txn)
            .await?;
        let guests = GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(departure_id))
            .all(&txn)
            .await?;
        let existing: HashSet<(Uuid, Uuid)> = CheckinEntity::find()
            .filter(activity_checkin::Column::DepartureId.eq(departure_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| (row.activity_id, row.guest_id))
            .collect();

        let now = Utc::now();
        let missing: Vec<activity_checkin::ActiveModel> = activities
            .iter()
            .flat_map(|activity| guests.iter().map(move |guest| (activity, guest.id)))
            .filter(|(activity, guest_id)| !existing.contains(&(activity.id, *guest_id)))
            .map(|(activity, guest_id)| Self::pending_row(activity, guest_id, now))
            .collect();

        let created = missing.len() as u64;
        if !missing.is_empty() {
            CheckinEntity::insert_many(missing)
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        info!(departure_id = %departure_id, created, "Check-in rows initialized");
        self.event_sender
            .send_or_log(Event::CheckinsInitialized {
                departure_id,
                created,
            })
            .await;
        Ok(created)
    }

    /// Records a manual check-in. Late arrivals (`missed`) and excused guests
    /// may still check in; a second check-in is a conflict.
    #[instrument(skip(self, request), fields(guest_id = %request.guest_id))]
    pub async fn check_in(
        &self,
        activity_id: Uuid,
        request: CheckInRequest,
    ) -> Result<activity_checkin::Model, ServiceError> {
        request.validate()?;
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let activity = self.get_activity(&txn, activity_id).await?;
        self.guest_of_activity(&txn, &activity, request.guest_id).await?;

        let (mut active, is_new) = match self.find_row(&txn, activity_id, request.guest_id).await? {
            Some(row) if row.status == CheckinStatus::CheckedIn => {
                return Err(ServiceError::Conflict(format!(
                    "Guest {} is already checked in to activity {}",
                    request.guest_id, activity_id
                )));
            }
            Some(row) => {
                let mut active: activity_checkin::ActiveModel = row.into();
                active.excuse_reason = Set(None);
                (active, false)
            }
            None => (Self::pending_row(&activity, request.guest_id, now), true),
        };

        active.status = Set(CheckinStatus::CheckedIn);
        active.method = Set(Some(CheckinMethod::Manual));
        active.checked_in_at = Set(Some(now));
        active.checked_in_by = Set(request.checked_in_by);
        active.latitude = Set(request.latitude);
        active.longitude = Set(request.longitude);
        if request.notes.is_some() {
            active.notes = Set(non_blank(request.notes));
        }
        active.updated_at = Set(now);
        let saved = persist(&txn, active, is_new).await?;
        txn.commit().await?;

        info!(activity_id = %activity_id, guest_id = %saved.guest_id, "Guest checked in");
        self.event_sender
            .send_or_log(Event::GuestCheckedIn {
                activity_id,
                guest_id: saved.guest_id,
                method: CheckinMethod::Manual.to_string(),
                at: now,
            })
            .await;
        Ok(saved)
    }

    /// Checks in many guests in one transaction and reports each guest's outcome.
    #[instrument(skip(self, request), fields(guests = request.guest_ids.len()))]
    pub async fn bulk_check_in(
        &self,
        activity_id: Uuid,
        request: BulkCheckInRequest,
    ) -> Result<BulkCheckInResult, ServiceError> {
        request.validate()?;
        let now = Utc::now();

        let mut seen = HashSet::new();
        let guest_ids: Vec<Uuid> = request
            .guest_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let txn = self.db.begin().await?;
        let activity = self.get_activity(&txn, activity_id).await?;

        let on_departure: HashSet<Uuid> = GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(activity.departure_id))
            .filter(departure_guest::Column::Id.is_in(guest_ids.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|guest| guest.id)
            .collect();
        let mut rows: HashMap<Uuid, activity_checkin::Model> = CheckinEntity::find()
            .filter(activity_checkin::Column::ActivityId.eq(activity_id))
            .filter(activity_checkin::Column::GuestId.is_in(guest_ids.clone()))
            .lock_exclusive()
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| (row.guest_id, row))
            .collect();

        let mut result = BulkCheckInResult::default();
        for guest_id in guest_ids {
            if !on_departure.contains(&guest_id) {
                result.not_in_departure.push(guest_id);
                continue;
            }
            let (mut active, is_new) = match rows.remove(&guest_id) {
                Some(row) if row.status == CheckinStatus::CheckedIn => {
                    result.already_checked_in.push(guest_id);
                    continue;
                }
                Some(row) => {
                    let mut active: activity_checkin::ActiveModel = row.into();
                    active.excuse_reason = Set(None);
                    (active, false)
                }
                None => (Self::pending_row(&activity, guest_id, now), true),
            };
            active.status = Set(CheckinStatus::CheckedIn);
            active.method = Set(Some(CheckinMethod::Bulk));
            active.checked_in_at = Set(Some(now));
            active.checked_in_by = Set(request.checked_in_by);
            active.updated_at = Set(now);
            persist(&txn, active, is_new).await?;
            result.checked_in.push(guest_id);
        }
        txn.commit().await?;

        info!(
            activity_id = %activity_id,
            checked_in = result.checked_in.len(),
            already = result.already_checked_in.len(),
            rejected = result.not_in_departure.len(),
            "Bulk check-in completed"
        );
        for guest_id in &result.checked_in {
            self.event_sender
                .send_or_log(Event::GuestCheckedIn {
                    activity_id,
                    guest_id: *guest_id,
                    method: CheckinMethod::Bulk.to_string(),
                    at: now,
                })
                .await;
        }
        Ok(result)
    }

    /// A checked-in guest cannot be excused.
    #[instrument(skip(self, request), fields(guest_id = %request.guest_id))]
    pub async fn mark_excused(
        &self,
        activity_id: Uuid,
        request: ExcuseRequest,
    ) -> Result<activity_checkin::Model, ServiceError> {
        request.validate()?;
        let reason = request.reason.trim().to_string();
        if reason.is_empty() {
            return Err(ServiceError::ValidationError("reason is required".into()));
        }
        let now = Utc::now();

        let txn = self.db.begin().await?;
        let activity = self.get_activity(&txn, activity_id).await?;
        self.guest_of_activity(&txn, &activity, request.guest_id).await?;

        let (mut active, is_new) = match self.find_row(&txn, activity_id, request.guest_id).await? {
            Some(row) if row.status == CheckinStatus::CheckedIn => {
                return Err(ServiceError::InvalidOperation(format!(
                    "Guest {} is already checked in and cannot be excused",
                    request.guest_id
                )));
            }
            Some(row) => (row.into(), false),
            None => (Self::pending_row(&activity, request.guest_id, now), true),
        };
        active.status = Set(CheckinStatus::Excused);
        active.excuse_reason = Set(Some(reason));
        active.updated_at = Set(now);
        let saved = persist(&txn, active, is_new).await?;
        txn.commit().await?;

        info!(activity_id = %activity_id, guest_id = %saved.guest_id, excused_by = ?request.excused_by, "Guest excused");
        Ok(saved)
    }

    /// Puts a row back to `pending`, clearing check-in and excuse details.
    #[instrument(skip(self))]
    pub async fn reset(
        &self,
        activity_id: Uuid,
        guest_id: Uuid,
    ) -> Result<activity_checkin::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let row = self
            .find_row(&txn, activity_id, guest_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No check-in for guest {} on activity {}",
                    guest_id, activity_id
                ))
            })?;

        let mut active: activity_checkin::ActiveModel = row.into();
        active.status = Set(CheckinStatus::Pending);
        active.method = Set(None);
        active.checked_in_at = Set(None);
        active.checked_in_by = Set(None);
        active.latitude = Set(None);
        active.longitude = Set(None);
        active.excuse_reason = Set(None);
        active.updated_at = Set(Utc::now());
        let saved = active.update(&txn).await?;
        txn.commit().await?;

        info!(activity_id = %activity_id, guest_id = %guest_id, "Check-in reset");
        Ok(saved)
    }

    /// Applies [`auto_outcome`] to every started activity, optionally
    /// restricted to one departure. Only `pending` rows change.
    #[instrument(skip(self))]
    pub async fn run_auto_processing(
        &self,
        now: DateTime<Utc>,
        departure_id: Option<Uuid>,
    ) -> Result<AutoProcessResult, ServiceError> {
        let mut query = ActivityEntity::find().filter(departure_activity::Column::StartsAt.lte(now));
        if let Some(departure_id) = departure_id {
            query = query.filter(departure_activity::Column::DepartureId.eq(departure_id));
        }
        let activities = query.all(&*self.db).await?;

        let mut result = AutoProcessResult::default();
        for activity in &activities {
            let Some(outcome) = auto_outcome(activity, now, self.missed_grace) else {
                continue;
            };
            result.activities_processed += 1;

            let mut update = CheckinEntity::update_many()
                .col_expr(activity_checkin::Column::Status, Expr::value(outcome))
                .col_expr(activity_checkin::Column::UpdatedAt, Expr::value(now));
            if outcome == CheckinStatus::CheckedIn {
                update = update
                    .col_expr(
                        activity_checkin::Column::Method,
                        Expr::value(CheckinMethod::Auto),
                    )
                    .col_expr(activity_checkin::Column::CheckedInAt, Expr::value(now));
            }
            let affected = update
                .filter(activity_checkin::Column::ActivityId.eq(activity.id))
                .filter(activity_checkin::Column::Status.eq(CheckinStatus::Pending))
                .exec(&*self.db)
                .await?
                .rows_affected;

            debug!(activity_id = %activity.id, outcome = %outcome, affected, "Auto-processed activity");
            match outcome {
                CheckinStatus::CheckedIn => result.auto_checked_in += affected,
                CheckinStatus::Missed => result.marked_missed += affected,
                _ => {}
            }
        }

        if result.marked_missed > 0 {
            warn!(marked_missed = result.marked_missed, "Guests marked missed");
        }
        info!(
            activities = result.activities_processed,
            auto_checked_in = result.auto_checked_in,
            marked_missed = result.marked_missed,
            "Check-in auto-processing finished"
        );
        self.event_sender
            .send_or_log(Event::AutoProcessingCompleted {
                activities_processed: result.activities_processed,
                auto_checked_in: result.auto_checked_in,
                marked_missed: result.marked_missed,
            })
            .await;
        Ok(result)
    }

    pub async fn list_for_activity(
        &self,
        activity_id: Uuid,
    ) -> Result<Vec<activity_checkin::Model>, ServiceError> {
        self.get_activity(&*self.db, activity_id).await?;
        Ok(CheckinEntity::find()
            .filter(activity_checkin::Column::ActivityId.eq(activity_id))
            .order_by_asc(activity_checkin::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn activity_stats(&self, activity_id: Uuid) -> Result<ActivityStats, ServiceError> {
        let activity = self.get_activity(&*self.db, activity_id).await?;
        let rows = CheckinEntity::find()
            .filter(activity_checkin::Column::ActivityId.eq(activity_id))
            .all(&*self.db)
            .await?;
        Ok(ActivityStats::from_rows(&activity, &rows))
    }

    pub async fn departure_summary(
        &self,
        departure_id: Uuid,
    ) -> Result<DepartureCheckinSummary, ServiceError> {
        DepartureEntity::find_by_id(departure_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Departure", departure_id))?;

        let activities = ActivityEntity::find()
            .filter(departure_activity::Column::DepartureId.eq(departure_id))
            .order_by_asc(departure_activity::Column::StartsAt)
            .all(&*self.db)
            .await?;
        let guest_count = GuestEntity::find()
            .filter(departure_guest::Column::DepartureId.eq(departure_id))
            .all(&*self.db)
            .await?
            .len() as u64;

        let mut by_activity: HashMap<Uuid, Vec<activity_checkin::Model>> = HashMap::new();
        for row in CheckinEntity::find()
            .filter(activity_checkin::Column::DepartureId.eq(departure_id))
            .all(&*self.db)
            .await?
        {
            by_activity.entry(row.activity_id).or_default().push(row);
        }

        let stats: Vec<ActivityStats> = activities
            .iter()
            .map(|activity| {
                let rows = by_activity.get(&activity.id).map(Vec::as_slice).unwrap_or(&[]);
                ActivityStats::from_rows(activity, rows)
            })
            .collect();

        let checked_in: u64 = stats.iter().map(|s| s.checked_in).sum();
        let eligible: u64 = stats.iter().map(|s| s.total - s.excused).sum();

        Ok(DepartureCheckinSummary {
            departure_id,
            guest_count,
            overall_attendance_rate: attendance_rate(checked_in, eligible),
            activities: stats,
        })
    }

    pub async fn guest_history(&self, guest_id: Uuid) -> Result<Vec<GuestCheckinEntry>, ServiceError> {
        GuestEntity::find_by_id(guest_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guest", guest_id))?;

        let rows = CheckinEntity::find()
            .filter(activity_checkin::Column::GuestId.eq(guest_id))
            .find_also_related(ActivityEntity)
            .order_by_asc(activity_checkin::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut entries: Vec<GuestCheckinEntry> = rows
            .into_iter()
            .map(|(checkin, activity)| GuestCheckinEntry {
                checkin,
                activity_title: activity.as_ref().map(|a| a.title.clone()),
                activity_starts_at: activity.map(|a| a.starts_at),
            })
            .collect();
        entries.sort_by_key(|entry| entry.activity_starts_at);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn activity(starts_in_minutes: i64, auto_checkin: bool, now: DateTime<Utc>) -> departure_activity::Model {
        departure_activity::Model {
            id: Uuid::new_v4(),
            departure_id: Uuid::new_v4(),
            day_number: 1,
            title: "Ha Long Bay cruise".into(),
            location: None,
            starts_at: now + Duration::minutes(starts_in_minutes),
            ends_at: None,
            auto_checkin,
            created_at: now,
        }
    }

    #[rstest]
    #[case(10, true, None)]
    #[case(0, true, Some(CheckinStatus::CheckedIn))]
    #[case(-5, true, Some(CheckinStatus::CheckedIn))]
    #[case(-5, false, None)]
    #[case(-30, false, Some(CheckinStatus::Missed))]
    #[case(-90, false, Some(CheckinStatus::Missed))]
    fn auto_outcome_rule(
        #[case] starts_in_minutes: i64,
        #[case] auto_checkin: bool,
        #[case] expected: Option<CheckinStatus>,
    ) {
        let now = Utc::now();
        let activity = activity(starts_in_minutes, auto_checkin, now);
        assert_eq!(auto_outcome(&activity, now, Duration::minutes(30)), expected);
    }

    #[test]
    fn attendance_rate_rounds_to_two_decimals() {
        assert_eq!(attendance_rate(2, 3), dec!(66.67));
        assert_eq!(attendance_rate(3, 3), dec!(100));
        assert_eq!(attendance_rate(0, 0), Decimal::ZERO);
    }

    #[test]
    fn coordinates_come_in_pairs() {
        let mut request = CheckInRequest {
            guest_id: Uuid::new_v4(),
            checked_in_by: None,
            latitude: Some(21.0),
            longitude: None,
            notes: None,
        };
        assert!(request.validate().is_err());

        request.longitude = Some(105.8);
        assert!(request.validate().is_ok());

        request.latitude = Some(91.0);
        assert!(request.validate().is_err());
    }
}
