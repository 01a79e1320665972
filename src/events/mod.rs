use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Capacity of the in-process event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end of a fresh channel
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

/// Domain events emitted by the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CustomerCreated(Uuid),
    CustomerUpdated(Uuid),
    CustomerDeleted(Uuid),

    SupplierCreated(Uuid),
    SupplierRatingChanged {
        supplier_id: Uuid,
        rating: Decimal,
        rating_count: i32,
    },

    QuoteCreated {
        quote_id: Uuid,
        quote_number: String,
        final_amount: Decimal,
    },
    QuoteUpdated(Uuid),
    QuoteStatusChanged {
        quote_id: Uuid,
        old_status: String,
        new_status: String,
    },
    QuotesExpired(u64),

    DepartureCreated(Uuid),
    DepartureStatusChanged {
        departure_id: Uuid,
        old_status: String,
        new_status: String,
    },
    GuestAdded {
        departure_id: Uuid,
        guest_id: Uuid,
    },
    GuestRemoved {
        departure_id: Uuid,
        guest_id: Uuid,
    },
    StaffAssigned {
        departure_id: Uuid,
        staff_user_id: Uuid,
        role: String,
    },

    ServiceBookingCreated(Uuid),
    ServiceBookingStatusChanged {
        booking_id: Uuid,
        old_status: String,
        new_status: String,
    },

    DebtCreated(Uuid),
    DebtPaymentRecorded {
        debt_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
        new_status: String,
    },
    DebtsMarkedOverdue(u64),

    TransactionCreated(Uuid),
    TransactionApproved(Uuid),
    TransactionRejected(Uuid),

    FeedbackCreated(Uuid),
    FeedbackAssigned {
        feedback_id: Uuid,
        assigned_to: Uuid,
    },
    FeedbackResolved(Uuid),

    SpecialRequestCreated(Uuid),
    SpecialRequestStatusChanged {
        request_id: Uuid,
        new_status: String,
    },

    CheckinsInitialized {
        departure_id: Uuid,
        created: u64,
    },
    GuestCheckedIn {
        activity_id: Uuid,
        guest_id: Uuid,
        method: String,
        at: DateTime<Utc>,
    },
    AutoProcessingCompleted {
        activities_processed: u64,
        auto_checked_in: u64,
        marked_missed: u64,
    },

    RolePermissionsChanged {
        role_id: Uuid,
        added: usize,
        removed: usize,
    },
}

impl Event {
    /// Short stable name used as a log field
    pub fn name(&self) -> &'static str {
        match self {
            Event::CustomerCreated(_) => "customer.created",
            Event::CustomerUpdated(_) => "customer.updated",
            Event::CustomerDeleted(_) => "customer.deleted",
            Event::SupplierCreated(_) => "supplier.created",
            Event::SupplierRatingChanged { .. } => "supplier.rating_changed",
            Event::QuoteCreated { .. } => "quote.created",
            Event::QuoteUpdated(_) => "quote.updated",
            Event::QuoteStatusChanged { .. } => "quote.status_changed",
            Event::QuotesExpired(_) => "quote.expired_sweep",
            Event::DepartureCreated(_) => "departure.created",
            Event::DepartureStatusChanged { .. } => "departure.status_changed",
            Event::GuestAdded { .. } => "departure.guest_added",
            Event::GuestRemoved { .. } => "departure.guest_removed",
            Event::StaffAssigned { .. } => "departure.staff_assigned",
            Event::ServiceBookingCreated(_) => "service_booking.created",
            Event::ServiceBookingStatusChanged { .. } => "service_booking.status_changed",
            Event::DebtCreated(_) => "debt.created",
            Event::DebtPaymentRecorded { .. } => "debt.payment_recorded",
            Event::DebtsMarkedOverdue(_) => "debt.overdue_sweep",
            Event::TransactionCreated(_) => "transaction.created",
            Event::TransactionApproved(_) => "transaction.approved",
            Event::TransactionRejected(_) => "transaction.rejected",
            Event::FeedbackCreated(_) => "feedback.created",
            Event::FeedbackAssigned { .. } => "feedback.assigned",
            Event::FeedbackResolved(_) => "feedback.resolved",
            Event::SpecialRequestCreated(_) => "special_request.created",
            Event::SpecialRequestStatusChanged { .. } => "special_request.status_changed",
            Event::CheckinsInitialized { .. } => "checkin.initialized",
            Event::GuestCheckedIn { .. } => "checkin.checked_in",
            Event::AutoProcessingCompleted { .. } => "checkin.auto_processed",
            Event::RolePermissionsChanged { .. } => "rbac.role_permissions_changed",
        }
    }
}

/// Drains the event channel and logs each event until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::DebtsMarkedOverdue(count) if *count > 0 => {
                warn!(event = event.name(), count, "Debts became overdue");
            }
            Event::AutoProcessingCompleted { marked_missed, .. } if *marked_missed > 0 => {
                warn!(event = event.name(), payload = ?event, "Guests marked missed");
            }
            _ => {
                info!(event = event.name(), payload = ?event, "Domain event");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_survives_closed_channel() {
        let (sender, rx) = EventSender::channel();
        drop(rx);
        sender.send_or_log(Event::CustomerCreated(Uuid::new_v4())).await;
        assert!(sender.send(Event::QuotesExpired(0)).await.is_err());
    }

    #[tokio::test]
    async fn events_reach_the_receiver_in_order() {
        let (sender, mut rx) = EventSender::channel();
        let id = Uuid::new_v4();
        sender.send_or_log(Event::FeedbackCreated(id)).await;
        sender.send_or_log(Event::FeedbackResolved(id)).await;

        assert_eq!(rx.recv().await.map(|e| e.name()), Some("feedback.created"));
        assert_eq!(rx.recv().await.map(|e| e.name()), Some("feedback.resolved"));
    }
}
