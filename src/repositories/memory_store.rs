//! In-memory rental store
//!
//! The whole state sits behind one async mutex. A unit of work owns the lock
//! for its lifetime and mutates a private copy; commit publishes the copy.
//! Transactions are therefore fully serialized.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Invoice, Membership, NewInvoice, NewRental, Rental, RentalStatus, Vehicle};
use crate::repositories::{RentalStore, UnitOfWork};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// A user as far as this engine cares: an id and a membership tier.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: Uuid,
    pub membership_id: Uuid,
}

/// Initial contents, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    memberships: HashMap<Uuid, Membership>,
    users: HashMap<Uuid, Uuid>,
    vehicles: HashMap<Uuid, Vehicle>,
    rentals: Vec<Rental>,
    invoices: Vec<Invoice>,
}

impl MemoryState {
    fn membership_of(&self, user_id: Uuid) -> Option<Membership> {
        self.users
            .get(&user_id)
            .and_then(|membership_id| self.memberships.get(membership_id))
            .cloned()
    }

    fn rental_mut(&mut self, rental_id: Uuid) -> AppResult<&mut Rental> {
        self.rentals
            .iter_mut()
            .find(|r| r.id == rental_id)
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryRentalStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data.
    ///
    /// A seed carries no rentals, so every seeded vehicle starts available.
    pub fn with_seed(seed: SeedData) -> Self {
        let mut state = MemoryState::default();
        for membership in seed.memberships {
            state.memberships.insert(membership.id, membership);
        }
        for user in seed.users {
            state.users.insert(user.id, user.membership_id);
        }
        for mut vehicle in seed.vehicles {
            if !vehicle.available {
                warn!(vehicle_id = %vehicle.id, "Seeded vehicle marked unavailable without a rental, resetting");
                vehicle.available = true;
            }
            state.vehicles.insert(vehicle.id, vehicle);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn insert_membership(&self, membership: Membership) {
        self.state.lock().await.memberships.insert(membership.id, membership);
    }

    pub async fn insert_user(&self, user_id: Uuid, membership_id: Uuid) {
        self.state.lock().await.users.insert(user_id, membership_id);
    }

    pub async fn insert_vehicle(&self, vehicle: Vehicle) {
        self.state.lock().await.vehicles.insert(vehicle.id, vehicle);
    }

    /// Every rental referencing `vehicle_id`, in insertion order.
    pub async fn rentals_for_vehicle(&self, vehicle_id: Uuid) -> Vec<Rental> {
        self.state
            .lock()
            .await
            .rentals
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RentalStore for MemoryRentalStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn find_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.state.lock().await.vehicles.get(&vehicle_id).cloned())
    }

    async fn find_membership(&self, user_id: Uuid) -> AppResult<Option<Membership>> {
        Ok(self.state.lock().await.membership_of(user_id))
    }

    async fn list_available_vehicles(&self, vip_eligible: bool) -> AppResult<Vec<Vehicle>> {
        let state = self.state.lock().await;
        let mut vehicles: Vec<Vehicle> = state
            .vehicles
            .values()
            .filter(|v| v.available && v.bookable_by(vip_eligible))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| (&a.make, &a.model, a.id).cmp(&(&b.make, &b.model, b.id)));
        Ok(vehicles)
    }

    async fn list_rentals(&self, user_id: Uuid) -> AppResult<Vec<Rental>> {
        let state = self.state.lock().await;
        let mut rentals: Vec<Rental> = state
            .rentals
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        // Reversing first makes later inserts win ties in the stable sort.
        rentals.reverse();
        rentals.sort_by(|a, b| b.scheduled_start.cmp(&a.scheduled_start));
        Ok(rentals)
    }

    async fn list_invoices(&self, user_id: Uuid, unpaid_only: bool) -> AppResult<Vec<Invoice>> {
        let state = self.state.lock().await;
        let mut invoices: Vec<Invoice> = state
            .invoices
            .iter()
            .filter(|i| i.user_id == user_id && !(unpaid_only && i.paid))
            .cloned()
            .collect();
        invoices.reverse();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invoices)
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_user(&mut self, user_id: Uuid) -> AppResult<Option<Membership>> {
        Ok(self.working.membership_of(user_id))
    }

    async fn lock_active_rental(&mut self, user_id: Uuid) -> AppResult<Option<Rental>> {
        Ok(self
            .working
            .rentals
            .iter()
            .find(|r| r.user_id == user_id && r.is_active())
            .cloned())
    }

    async fn lock_vehicle(&mut self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.working.vehicles.get(&vehicle_id).cloned())
    }

    async fn lock_invoice(&mut self, invoice_id: Uuid, user_id: Uuid) -> AppResult<Option<Invoice>> {
        Ok(self
            .working
            .invoices
            .iter()
            .find(|i| i.id == invoice_id && i.user_id == user_id)
            .cloned())
    }

    async fn insert_rental(&mut self, rental: NewRental) -> AppResult<Rental> {
        // Same guarantees as the partial unique indexes in Postgres.
        let clash = self.working.rentals.iter().any(|r| {
            r.is_active() && (r.user_id == rental.user_id || r.vehicle_id == rental.vehicle_id)
        });
        if clash {
            return Err(AppError::Conflict(
                "an active rental already exists for this user or vehicle".to_string(),
            ));
        }

        let rental = Rental {
            id: Uuid::new_v4(),
            user_id: rental.user_id,
            vehicle_id: rental.vehicle_id,
            scheduled_start: rental.scheduled_start,
            scheduled_end: rental.scheduled_end,
            status: RentalStatus::Active,
            overtime_hours: 0,
        };
        self.working.rentals.push(rental.clone());
        Ok(rental)
    }

    async fn update_rental_status(
        &mut self,
        rental_id: Uuid,
        status: RentalStatus,
        overtime_hours: i32,
    ) -> AppResult<Rental> {
        let rental = self.working.rental_mut(rental_id)?;
        rental.status = status;
        rental.overtime_hours = overtime_hours;
        Ok(rental.clone())
    }

    async fn update_rental_end(&mut self, rental_id: Uuid, scheduled_end: NaiveDateTime) -> AppResult<Rental> {
        let rental = self.working.rental_mut(rental_id)?;
        rental.scheduled_end = scheduled_end;
        Ok(rental.clone())
    }

    async fn set_vehicle_available(&mut self, vehicle_id: Uuid, available: bool) -> AppResult<()> {
        let vehicle = self
            .working
            .vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))?;
        vehicle.available = available;
        Ok(())
    }

    async fn insert_invoice(&mut self, invoice: NewInvoice) -> AppResult<Invoice> {
        if self.working.invoices.iter().any(|i| i.rental_id == invoice.rental_id) {
            return Err(AppError::Conflict(format!(
                "rental '{}' is already invoiced",
                invoice.rental_id
            )));
        }

        let invoice = Invoice {
            id: Uuid::new_v4(),
            rental_id: invoice.rental_id,
            user_id: invoice.user_id,
            billed_hours: invoice.billed_hours,
            overdue_hours: invoice.overdue_hours,
            final_cost: invoice.final_cost,
            paid: false,
            created_at: invoice.created_at,
        };
        self.working.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn mark_invoice_paid(&mut self, invoice_id: Uuid) -> AppResult<Invoice> {
        let invoice = self
            .working
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice_id)
            .ok_or_else(|| not_found_error("Invoice", &invoice_id.to_string()))?;
        invoice.paid = true;
        Ok(invoice.clone())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
