//! Rental model
//!
//! Maps the `rentals` table. Schedules are naive wall-clock values in the
//! operating time zone (see [`crate::utils::time::OperatingZone`]).

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Rental status - maps the `rental_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Active,
    Cancelled,
    Completed,
}

/// Rental row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    pub status: RentalStatus,
    /// Zero until the rental is completed.
    pub overtime_hours: i32,
}

impl Rental {
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }
}

/// Values for a rental about to be inserted
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
}
