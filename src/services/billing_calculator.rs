//! Cost calculator
//!
//! Pure functions turning a rental schedule, the completion instant, the
//! vehicle's hourly rate and the member's discount into billing figures.
//! All hour arithmetic happens on operating-zone wall-clock values.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::utils::time::whole_hours;

/// Overtime is charged at 1.5x the base rate, without the member discount.
pub fn overtime_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

/// `hourly_rate × (1 − discount_pct / 100)`, with the discount clamped to `0..=100`.
pub fn discounted_rate(hourly_rate: Decimal, discount_pct: Decimal) -> Decimal {
    let pct = discount_pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    hourly_rate * (Decimal::ONE - pct / Decimal::ONE_HUNDRED)
}

/// Round a currency amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Cost preview for `hours` hours at the member's discounted rate.
pub fn estimate(hourly_rate: Decimal, discount_pct: Decimal, hours: i32) -> Decimal {
    round_money(discounted_rate(hourly_rate, discount_pct) * Decimal::from(hours))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillingInput {
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    /// Completion instant, operating-zone wall clock.
    pub completed_at: NaiveDateTime,
    pub hourly_rate: Decimal,
    pub discount_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bill {
    pub billed_hours: i32,
    pub overtime_hours: i32,
    pub discounted_rate: Decimal,
    pub overtime_rate: Decimal,
    pub final_cost: Decimal,
}

pub fn compute_bill(input: &BillingInput) -> Bill {
    let billed_hours = whole_hours(input.scheduled_end - input.scheduled_start);
    let overtime_hours = whole_hours(input.completed_at - input.scheduled_end);

    let discounted_rate = discounted_rate(input.hourly_rate, input.discount_pct);
    let overtime_rate = input.hourly_rate * overtime_multiplier();

    let final_cost = round_money(
        Decimal::from(billed_hours) * discounted_rate + Decimal::from(overtime_hours) * overtime_rate,
    );

    Bill {
        billed_hours,
        overtime_hours,
        discounted_rate,
        overtime_rate,
        final_cost,
    }
}
