//! Invoice model
//!
//! One invoice per completed rental. Only `paid` changes after insertion.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub user_id: Uuid,
    pub billed_hours: i32,
    pub overdue_hours: i32,
    pub final_cost: Decimal,
    pub paid: bool,
    /// Reference time (UTC), never the operating zone.
    pub created_at: DateTime<Utc>,
}

/// Values for an invoice about to be inserted
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub rental_id: Uuid,
    pub user_id: Uuid,
    pub billed_hours: i32,
    pub overdue_hours: i32,
    pub final_cost: Decimal,
    pub created_at: DateTime<Utc>,
}
