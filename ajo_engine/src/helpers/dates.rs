use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::db_types::ContributionCycle;

/// The billing period that `day` falls in, i.e. the first day of its calendar month.
pub fn cycle_period(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// When a member's next contribution is due, given how many contributions they have completed so far.
///
/// Weekly groups expect a payment every week after joining, monthly groups every four weeks.
pub fn next_due_date(joined_at: DateTime<Utc>, cycle: ContributionCycle, completed: i64) -> DateTime<Utc> {
    joined_at + Duration::weeks(cycle.weeks() * (completed + 1))
}
