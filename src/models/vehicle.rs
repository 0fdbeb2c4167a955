//! Vehicle model
//!
//! Maps the `vehicles` table. The fleet itself is managed out-of-band; the
//! only column this service ever writes is `available`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Vehicle row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub hourly_rate: Decimal,
    /// Bookable only by members whose tier grants VIP access.
    pub vip_only: bool,
    /// `false` exactly while an active rental holds the vehicle.
    pub available: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether a member with the given VIP access may book this vehicle.
    pub fn bookable_by(&self, vip_access: bool) -> bool {
        !self.vip_only || vip_access
    }
}
