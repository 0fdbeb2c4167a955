//! Persistence
//!
//! The rental engine talks to storage through two traits:
//!
//! * [`RentalStore`] answers plain reads and opens units of work.
//! * [`UnitOfWork`] is one all-or-nothing transaction. Every `lock_*` read
//!   inside it takes a row lock that is held until the unit of work ends, so
//!   the invariant checks performed on its results stay valid until commit.
//!
//! A unit of work that is dropped without [`UnitOfWork::commit`] rolls back,
//! which makes every early `?` return in a transition a rollback.
//!
//! Lock order is always user, then rental, then vehicle, then invoice.

pub mod memory_store;
pub mod postgres_store;

pub use memory_store::{MemoryRentalStore, SeedData, SeedUser};
pub use postgres_store::PgRentalStore;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::{Invoice, Membership, NewInvoice, NewRental, Rental, RentalStatus, Vehicle};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> AppResult<()>;

    /// Open a new unit of work.
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    async fn find_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Membership of a user, `None` when the user or membership is missing.
    async fn find_membership(&self, user_id: Uuid) -> AppResult<Option<Membership>>;

    /// Available vehicles; VIP-only vehicles are included only when
    /// `vip_eligible` is set.
    async fn list_available_vehicles(&self, vip_eligible: bool) -> AppResult<Vec<Vehicle>>;

    /// Rental history of a user, newest first.
    async fn list_rentals(&self, user_id: Uuid) -> AppResult<Vec<Rental>>;

    /// Invoices of a user, newest first.
    async fn list_invoices(&self, user_id: Uuid, unpaid_only: bool) -> AppResult<Vec<Invoice>>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// Lock the user row and return the user's membership.
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<Membership>>;

    /// Lock and return the user's active rental, if any.
    async fn lock_active_rental(&mut self, user_id: Uuid) -> AppResult<Option<Rental>>;

    async fn lock_vehicle(&mut self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Lock an invoice, only if it belongs to `user_id`.
    async fn lock_invoice(&mut self, invoice_id: Uuid, user_id: Uuid) -> AppResult<Option<Invoice>>;

    async fn insert_rental(&mut self, rental: NewRental) -> AppResult<Rental>;

    async fn update_rental_status(
        &mut self,
        rental_id: Uuid,
        status: RentalStatus,
        overtime_hours: i32,
    ) -> AppResult<Rental>;

    async fn update_rental_end(&mut self, rental_id: Uuid, scheduled_end: NaiveDateTime) -> AppResult<Rental>;

    async fn set_vehicle_available(&mut self, vehicle_id: Uuid, available: bool) -> AppResult<()>;

    async fn insert_invoice(&mut self, invoice: NewInvoice) -> AppResult<Invoice>;

    async fn mark_invoice_paid(&mut self, invoice_id: Uuid) -> AppResult<Invoice>;

    /// Publish every write made through this unit of work.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
