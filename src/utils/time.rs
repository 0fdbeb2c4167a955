//! Time domains
//!
//! Rental schedules live in the *operating* time zone, a fixed UTC offset in
//! which storage keeps naive wall-clock values and against which the
//! cancellation window and overtime are measured. Invoice timestamps live in
//! UTC. The two never mix implicitly: converting between them always goes
//! through [`OperatingZone`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::utils::errors::{AppError, AppResult};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The fixed-offset zone business rules are evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingZone {
    offset: FixedOffset,
}

impl OperatingZone {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse an offset such as `+08:00`, `-05:30` or `Z`.
    pub fn parse(value: &str) -> AppResult<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }

        let invalid = || AppError::InvalidInput(format!("invalid UTC offset '{}'", value));

        let (sign, rest) = match value.as_bytes().first() {
            Some(b'+') => (1, &value[1..]),
            Some(b'-') => (-1, &value[1..]),
            _ => return Err(invalid()),
        };
        let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(invalid)
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Naive wall-clock value of `instant` in this zone, as stored.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    /// Current wall-clock value in this zone.
    pub fn now_local(&self, clock: &dyn Clock) -> NaiveDateTime {
        self.to_local(clock.now())
    }

    /// Attach the offset back to a stored wall-clock value.
    pub fn localize(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        // A fixed offset has no gaps or folds, so the mapping is unique.
        self.offset
            .from_local_datetime(&local)
            .single()
            .unwrap_or_else(|| self.offset.from_utc_datetime(&(local - self.offset_duration())))
    }

    fn offset_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.offset.local_minus_utc()))
    }
}

impl Default for OperatingZone {
    fn default() -> Self {
        // Singapore, UTC+08:00 with no daylight saving.
        Self::new(FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()))
    }
}

/// Whole hours in `span`, floored and clamped at zero.
pub fn whole_hours(span: Duration) -> i32 {
    let hours = span.num_hours().max(0);
    i32::try_from(hours).unwrap_or(i32::MAX)
}
