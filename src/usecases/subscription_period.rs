use anyhow::{Context, Result};
use chrono::{DateTime, Months, Utc};

/// One subscription term. `ends_at` is always strictly after `starts_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPeriod {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Term for a first-time subscriber: starts now, runs one calendar month.
pub fn compute_fresh_period(now: DateTime<Utc>) -> Result<SubscriptionPeriod> {
    Ok(SubscriptionPeriod {
        starts_at: now,
        ends_at: add_one_calendar_month(now)?,
    })
}

/// Term renewing a prior one. A prior term still running continues without a
/// gap; a lapsed one restarts from now.
pub fn compute_renewal_period(
    prior_ends_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<SubscriptionPeriod> {
    let starts_at = if prior_ends_at < now { now } else { prior_ends_at };

    Ok(SubscriptionPeriod {
        starts_at,
        ends_at: add_one_calendar_month(starts_at)?,
    })
}

/// Calendar-month increment. Days past the end of the target month clamp to
/// its last valid day (Jan 31 -> Feb 29 in a leap year), never a fixed 30-day
/// offset.
pub fn add_one_calendar_month(date: DateTime<Utc>) -> Result<DateTime<Utc>> {
    date.checked_add_months(Months::new(1))
        .context("subscription end date out of calendar range")
}
