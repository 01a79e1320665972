pub mod activity_checkin;
pub mod customer;
pub mod debt;
pub mod debt_payment;
pub mod departure_activity;
pub mod departure_guest;
pub mod feedback;
pub mod guest_special_request;
pub mod permission;
pub mod permission_role;
pub mod quote;
pub mod role;
pub mod service_booking;
pub mod staff_assignment;
pub mod supplier;
pub mod supplier_rating;
pub mod tour;
pub mod tour_departure;
pub mod tour_price;
pub mod tour_version;
pub mod transaction;
