//! Membership model
//!
//! Read-only view of a user's membership tier, owned by the account service.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use rust_decimal::Decimal;

/// Membership tier as seen by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub name: String,
    /// Percentage knocked off the hourly rate, `0..=100`.
    pub discount_pct: Decimal,
    pub vip_access: bool,
}
