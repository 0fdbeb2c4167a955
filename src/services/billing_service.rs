//! Billing service
//!
//! Cost previews, invoice listing and payment. Invoices themselves are
//! issued by [`crate::services::rental_service::RentalService::complete_rental`].

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Invoice;
use crate::repositories::RentalStore;
use crate::services::billing_calculator::{discounted_rate, estimate};
use crate::utils::errors::{invalid_input_error, not_found_error, AppError, AppResult};

/// Pre-booking cost preview
#[derive(Debug, Clone, PartialEq)]
pub struct CostEstimate {
    pub vehicle_id: Uuid,
    pub hours: i32,
    /// Hourly rate after the member discount.
    pub hourly_rate: Decimal,
    pub total_cost: Decimal,
}

pub struct BillingService {
    store: Arc<dyn RentalStore>,
}

impl BillingService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Price `hours` hours of `vehicle_id` for the caller. Reads only.
    pub async fn estimate_cost(&self, user_id: Uuid, vehicle_id: Uuid, hours: i32) -> AppResult<CostEstimate> {
        if hours < 1 {
            return Err(invalid_input_error("hours must be a positive integer"));
        }

        let membership = self
            .store
            .find_membership(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User or membership not found".to_string()))?;
        let vehicle = self
            .store
            .find_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))?;

        Ok(CostEstimate {
            vehicle_id,
            hours,
            hourly_rate: discounted_rate(vehicle.hourly_rate, membership.discount_pct),
            total_cost: estimate(vehicle.hourly_rate, membership.discount_pct, hours),
        })
    }

    /// Mark an invoice of the caller as paid.
    ///
    /// Paying an invoice that is already paid succeeds and changes nothing.
    pub async fn pay_invoice(&self, user_id: Uuid, invoice_id: Uuid) -> AppResult<Invoice> {
        let mut uow = self.store.begin().await?;

        // Missing and foreign invoices are indistinguishable to the caller.
        let invoice = uow
            .lock_invoice(invoice_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice not found or not associated with user".to_string()))?;

        if invoice.paid {
            debug!(invoice_id = %invoice.id, "Invoice already paid");
            return Ok(invoice);
        }

        let paid = uow.mark_invoice_paid(invoice.id).await?;
        uow.commit().await?;

        info!(invoice_id = %paid.id, user_id = %user_id, amount = %paid.final_cost, "Invoice paid");
        Ok(paid)
    }

    /// The caller's invoices, newest first.
    pub async fn list_invoices(&self, user_id: Uuid, unpaid_only: bool) -> AppResult<Vec<Invoice>> {
        self.store.list_invoices(user_id, unpaid_only).await
    }
}
