//! Periodic housekeeping: overdue debts, expired quotes and check-in auto-processing.

use crate::{errors::ServiceError, handlers::AppServices, services::checkins::AutoProcessResult};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// What one sweep round changed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    pub debts_overdue: u64,
    pub quotes_expired: u64,
    pub checkins: AutoProcessResult,
}

/// Runs every sweep once, evaluated at `now`. A failing step is logged and
/// does not stop the steps after it.
pub async fn sweep_once(services: &AppServices, now: DateTime<Utc>) -> SweepReport {
    let today = now.date_naive();
    let mut report = SweepReport::default();

    match services.debts.mark_overdue(today).await {
        Ok(count) => report.debts_overdue = count,
        Err(e) => log_failure("debts.mark_overdue", &e),
    }
    match services.quotes.expire_overdue_quotes(today).await {
        Ok(count) => report.quotes_expired = count,
        Err(e) => log_failure("quotes.expire", &e),
    }
    match services.checkins.run_auto_processing(now, None).await {
        Ok(result) => report.checkins = result,
        Err(e) => log_failure("checkins.auto_process", &e),
    }

    debug!(?report, "Sweep round finished");
    report
}

fn log_failure(step: &str, e: &ServiceError) {
    error!(step, error = %e, "Sweep step failed");
}

/// Spawns the sweep loop on the current runtime.
pub fn spawn_sweeper(services: AppServices, every: Duration) -> tokio::task::JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting background sweeper");
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&services, Utc::now()).await;
        }
    })
}
