use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, FixedOffset};
use validator::Validate;

use crate::dto::api_response::money;
use crate::dto::billing_dto::InvoiceResponse;
use crate::models::{Rental, RentalStatus};
use crate::services::Completion;
use crate::utils::time::OperatingZone;

// Request to book a vehicle
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRentalRequest {
    pub vehicle_id: Uuid,

    #[validate(range(min = 1))]
    pub hours: i32,
}

// Request to extend the active rental
#[derive(Debug, Deserialize, Validate)]
pub struct ExtendRentalRequest {
    #[validate(range(min = 1))]
    pub hours: i32,
}

// Rental with its schedule rendered in the operating time zone
#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub scheduled_start: DateTime<FixedOffset>,
    pub scheduled_end: DateTime<FixedOffset>,
    pub status: RentalStatus,
    pub overtime_hours: i32,
}

impl RentalResponse {
    pub fn from_rental(rental: Rental, zone: OperatingZone) -> Self {
        Self {
            id: rental.id,
            user_id: rental.user_id,
            vehicle_id: rental.vehicle_id,
            scheduled_start: zone.localize(rental.scheduled_start),
            scheduled_end: zone.localize(rental.scheduled_end),
            status: rental.status,
            overtime_hours: rental.overtime_hours,
        }
    }
}

// Result of returning a vehicle
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub rental: RentalResponse,
    pub invoice: InvoiceResponse,
    pub discounted_rate: String,
    pub overtime_rate: String,
}

impl CompletionResponse {
    pub fn from_completion(completion: Completion, zone: OperatingZone) -> Self {
        Self {
            rental: RentalResponse::from_rental(completion.rental, zone),
            invoice: InvoiceResponse::from(completion.invoice),
            discounted_rate: money(completion.bill.discounted_rate),
            overtime_rate: money(completion.bill.overtime_rate),
        }
    }
}
