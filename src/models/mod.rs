//! System models
//!
//! Data models mapping the PostgreSQL schema in `migrations/`.

pub mod invoice;
pub mod membership;
pub mod rental;
pub mod vehicle;

pub use invoice::{Invoice, NewInvoice};
pub use membership::Membership;
pub use rental::{NewRental, Rental, RentalStatus};
pub use vehicle::Vehicle;
