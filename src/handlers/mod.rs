pub mod checkins;
pub mod common;
pub mod customers;
pub mod departures;
pub mod feedbacks;
pub mod financial;
pub mod quotes;
pub mod rbac;
pub mod service_bookings;
pub mod suppliers;
pub mod tours;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        checkins::CheckinService, customers::CustomerService, debts::DebtService,
        departures::DepartureService, feedbacks::FeedbackService, quotes::QuoteService,
        rbac::RbacService, service_bookings::ServiceBookingService,
        special_requests::SpecialRequestService, staff::StaffAssignmentService,
        supplier_ratings::SupplierRatingService, suppliers::SupplierService, tours::TourService,
        transactions::TransactionService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub suppliers: Arc<SupplierService>,
    pub supplier_ratings: Arc<SupplierRatingService>,
    pub tours: Arc<TourService>,
    pub departures: Arc<DepartureService>,
    pub staff: Arc<StaffAssignmentService>,
    pub special_requests: Arc<SpecialRequestService>,
    pub service_bookings: Arc<ServiceBookingService>,
    pub quotes: Arc<QuoteService>,
    pub debts: Arc<DebtService>,
    pub transactions: Arc<TransactionService>,
    pub checkins: Arc<CheckinService>,
    pub rbac: Arc<RbacService>,
    pub feedbacks: Arc<FeedbackService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let currency = config.default_currency.clone();

        Self {
            customers: Arc::new(CustomerService::new(db_pool.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone(), event_sender.clone())),
            supplier_ratings: Arc::new(SupplierRatingService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            tours: Arc::new(TourService::new(db_pool.clone(), currency.clone())),
            departures: Arc::new(DepartureService::new(db_pool.clone(), event_sender.clone())),
            staff: Arc::new(StaffAssignmentService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            special_requests: Arc::new(SpecialRequestService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            service_bookings: Arc::new(ServiceBookingService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            quotes: Arc::new(QuoteService::new(
                db_pool.clone(),
                event_sender.clone(),
                currency.clone(),
            )),
            debts: Arc::new(DebtService::new(
                db_pool.clone(),
                event_sender.clone(),
                currency.clone(),
            )),
            transactions: Arc::new(TransactionService::new(
                db_pool.clone(),
                event_sender.clone(),
                currency,
            )),
            checkins: Arc::new(CheckinService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.checkin_missed_grace_minutes,
            )),
            rbac: Arc::new(RbacService::new(db_pool.clone(), event_sender.clone())),
            feedbacks: Arc::new(FeedbackService::new(db_pool, event_sender)),
        }
    }
}
