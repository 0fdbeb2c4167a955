//! Rental state machine
//!
//! A rental is `active` from creation until it is either cancelled or
//! completed; both are terminal. Each transition runs in a single unit of
//! work that re-reads and locks the caller, the active rental and the
//! vehicle before deciding anything, so concurrent requests can never both
//! observe a free vehicle or an empty rental slot.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Invoice, Membership, NewInvoice, NewRental, Rental, RentalStatus};
use crate::repositories::{RentalStore, UnitOfWork};
use crate::services::billing_calculator::{compute_bill, Bill, BillingInput};
use crate::utils::errors::{invalid_input_error, not_found_error, AppError, AppResult};
use crate::utils::time::{Clock, OperatingZone};

/// Business rules that are configuration rather than code.
#[derive(Debug, Clone, Copy)]
pub struct RentalPolicy {
    /// How long after the scheduled start a rental may still be cancelled.
    pub cancellation_window: Duration,
}

impl Default for RentalPolicy {
    fn default() -> Self {
        Self {
            cancellation_window: Duration::hours(1),
        }
    }
}

/// Outcome of completing a rental.
#[derive(Debug, Clone)]
pub struct Completion {
    pub rental: Rental,
    pub invoice: Invoice,
    pub bill: Bill,
}

pub struct RentalService {
    store: Arc<dyn RentalStore>,
    clock: Arc<dyn Clock>,
    zone: OperatingZone,
    policy: RentalPolicy,
}

impl RentalService {
    pub fn new(
        store: Arc<dyn RentalStore>,
        clock: Arc<dyn Clock>,
        zone: OperatingZone,
        policy: RentalPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            zone,
            policy,
        }
    }

    pub fn zone(&self) -> OperatingZone {
        self.zone
    }

    /// Book `vehicle_id` for `hours` hours starting now.
    pub async fn create_rental(&self, user_id: Uuid, vehicle_id: Uuid, hours: i32) -> AppResult<Rental> {
        let length = positive_hours(hours)?;

        let mut uow = self.store.begin().await?;
        let membership = lock_caller(uow.as_mut(), user_id).await?;

        if uow.lock_active_rental(user_id).await?.is_some() {
            return Err(AppError::Conflict("User already has an ongoing rental".to_string()));
        }

        let vehicle = uow
            .lock_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))?;

        if !vehicle.available {
            return Err(AppError::Conflict("Vehicle is not available".to_string()));
        }
        if !vehicle.bookable_by(membership.vip_access) {
            return Err(AppError::Forbidden(
                "Vehicle requires VIP access, but user is not a VIP".to_string(),
            ));
        }

        let scheduled_start = self.zone.now_local(self.clock.as_ref());
        let scheduled_end = scheduled_start
            .checked_add_signed(length)
            .ok_or_else(|| invalid_input_error("rental end is out of range"))?;

        let rental = uow
            .insert_rental(NewRental {
                user_id,
                vehicle_id,
                scheduled_start,
                scheduled_end,
            })
            .await?;
        uow.set_vehicle_available(vehicle_id, false).await?;
        uow.commit().await?;

        info!(
            rental_id = %rental.id,
            user_id = %user_id,
            vehicle_id = %vehicle_id,
            hours,
            "Rental created"
        );
        Ok(rental)
    }

    /// Cancel the caller's active rental while still inside the window.
    pub async fn cancel_rental(&self, user_id: Uuid) -> AppResult<Rental> {
        let mut uow = self.store.begin().await?;
        lock_caller(uow.as_mut(), user_id).await?;
        let rental = lock_active(uow.as_mut(), user_id).await?;

        let elapsed = self.zone.now_local(self.clock.as_ref()) - rental.scheduled_start;
        if elapsed > self.policy.cancellation_window {
            warn!(
                rental_id = %rental.id,
                elapsed_minutes = elapsed.num_minutes(),
                "Cancellation refused, window elapsed"
            );
            return Err(AppError::PolicyRejected(format!(
                "Cancellation is only allowed within {} minutes of the rental start time",
                self.policy.cancellation_window.num_minutes()
            )));
        }

        let cancelled = uow
            .update_rental_status(rental.id, RentalStatus::Cancelled, 0)
            .await?;
        uow.set_vehicle_available(rental.vehicle_id, true).await?;
        uow.commit().await?;

        info!(rental_id = %cancelled.id, user_id = %user_id, "Rental cancelled");
        Ok(cancelled)
    }

    /// Push the scheduled end of the caller's active rental back by `hours`.
    pub async fn extend_rental(&self, user_id: Uuid, hours: i32) -> AppResult<Rental> {
        let extra = positive_hours(hours)?;

        let mut uow = self.store.begin().await?;
        lock_caller(uow.as_mut(), user_id).await?;
        let rental = lock_active(uow.as_mut(), user_id).await?;

        let scheduled_end = rental
            .scheduled_end
            .checked_add_signed(extra)
            .ok_or_else(|| invalid_input_error("extended end is out of range"))?;

        let extended = uow.update_rental_end(rental.id, scheduled_end).await?;
        uow.commit().await?;

        info!(
            rental_id = %extended.id,
            user_id = %user_id,
            hours,
            scheduled_end = %extended.scheduled_end,
            "Rental extended"
        );
        Ok(extended)
    }

    /// Return the vehicle, bill the rental and issue its invoice.
    pub async fn complete_rental(&self, user_id: Uuid) -> AppResult<Completion> {
        let mut uow = self.store.begin().await?;
        let membership = lock_caller(uow.as_mut(), user_id).await?;
        let rental = lock_active(uow.as_mut(), user_id).await?;

        let vehicle = uow
            .lock_vehicle(rental.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &rental.vehicle_id.to_string()))?;

        // One reading of the clock serves both time domains.
        let now = self.clock.now();
        let bill = compute_bill(&BillingInput {
            scheduled_start: rental.scheduled_start,
            scheduled_end: rental.scheduled_end,
            completed_at: self.zone.to_local(now),
            hourly_rate: vehicle.hourly_rate,
            discount_pct: membership.discount_pct,
        });

        let invoice = uow
            .insert_invoice(NewInvoice {
                rental_id: rental.id,
                user_id,
                billed_hours: bill.billed_hours,
                overdue_hours: bill.overtime_hours,
                final_cost: bill.final_cost,
                created_at: now,
            })
            .await?;
        let completed = uow
            .update_rental_status(rental.id, RentalStatus::Completed, bill.overtime_hours)
            .await?;
        uow.set_vehicle_available(rental.vehicle_id, true).await?;
        uow.commit().await?;

        info!(
            rental_id = %completed.id,
            invoice_id = %invoice.id,
            billed_hours = bill.billed_hours,
            overtime_hours = bill.overtime_hours,
            final_cost = %bill.final_cost,
            "Rental completed"
        );
        Ok(Completion {
            rental: completed,
            invoice,
            bill,
        })
    }

    /// The caller's rental history, newest first.
    pub async fn list_rentals(&self, user_id: Uuid) -> AppResult<Vec<Rental>> {
        self.store.list_rentals(user_id).await
    }

    pub async fn active_rental(&self, user_id: Uuid) -> AppResult<Rental> {
        self.store
            .list_rentals(user_id)
            .await?
            .into_iter()
            .find(Rental::is_active)
            .ok_or_else(no_active_rental)
    }
}

fn positive_hours(hours: i32) -> AppResult<Duration> {
    if hours < 1 {
        return Err(invalid_input_error("hours must be a positive integer"));
    }
    Ok(Duration::hours(i64::from(hours)))
}

fn no_active_rental() -> AppError {
    AppError::NotFound("No active rental found for the user".to_string())
}

async fn lock_caller(uow: &mut dyn UnitOfWork, user_id: Uuid) -> AppResult<Membership> {
    uow.lock_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found or membership not set".to_string()))
}

async fn lock_active(uow: &mut dyn UnitOfWork, user_id: Uuid) -> AppResult<Rental> {
    uow.lock_active_rental(user_id).await?.ok_or_else(no_active_rental)
}
