//! Services module
//!
//! Business logic of the rental engine: the rental state machine, the
//! billing calculator and the availability ledger's read side.

pub mod billing_calculator;
pub mod billing_service;
pub mod rental_service;
pub mod vehicle_service;

pub use billing_service::{BillingService, CostEstimate};
pub use rental_service::{Completion, RentalPolicy, RentalService};
pub use vehicle_service::VehicleService;
