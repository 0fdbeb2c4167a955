//! Availability ledger
//!
//! Availability is never written here: it flips only inside rental
//! transitions. This service exposes the read side used by the booking flow.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::Vehicle;
use crate::repositories::RentalStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct VehicleService {
    store: Arc<dyn RentalStore>,
}

impl VehicleService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Available vehicles, VIP-only ones included only when `vip_eligible`.
    pub async fn list_available(&self, vip_eligible: bool) -> AppResult<Vec<Vehicle>> {
        self.store.list_available_vehicles(vip_eligible).await
    }

    /// Available vehicles the caller's membership allows them to book.
    pub async fn list_available_for(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let membership = self
            .store
            .find_membership(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found or membership not set".to_string()))?;

        self.list_available(membership.vip_access).await
    }

    pub async fn get_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))
    }
}
