use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::dto::api_response::money;
use crate::models::Invoice;
use crate::services::CostEstimate;

// Request for a cost preview
#[derive(Debug, Deserialize, Validate)]
pub struct EstimateCostRequest {
    pub vehicle_id: Uuid,

    #[validate(range(min = 1))]
    pub hours: i32,
}

// Cost preview
#[derive(Debug, Serialize)]
pub struct CostEstimateResponse {
    pub vehicle_id: Uuid,
    pub hours: i32,
    pub hourly_rate: String,
    pub total_cost: String,
}

impl From<CostEstimate> for CostEstimateResponse {
    fn from(estimate: CostEstimate) -> Self {
        Self {
            vehicle_id: estimate.vehicle_id,
            hours: estimate.hours,
            hourly_rate: money(estimate.hourly_rate),
            total_cost: money(estimate.total_cost),
        }
    }
}

// Invoice listing filters
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilters {
    #[serde(default)]
    pub unpaid_only: bool,
}

// Invoice
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub user_id: Uuid,
    pub billed_hours: i32,
    pub overdue_hours: i32,
    pub final_cost: String,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            rental_id: invoice.rental_id,
            user_id: invoice.user_id,
            billed_hours: invoice.billed_hours,
            overdue_hours: invoice.overdue_hours,
            final_cost: money(invoice.final_cost),
            paid: invoice.paid,
            created_at: invoice.created_at,
        }
    }
}
