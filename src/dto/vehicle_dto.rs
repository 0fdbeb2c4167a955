use serde::Serialize;
use uuid::Uuid;

use crate::dto::api_response::money;
use crate::models::Vehicle;

// Vehicle as shown to members
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub hourly_rate: String,
    pub vip_only: bool,
    pub available: bool,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            hourly_rate: money(vehicle.hourly_rate),
            vip_only: vehicle.vip_only,
            available: vehicle.available,
        }
    }
}
