//! Calendar helpers bound to the portal's reporting timezone.
//!
//! Day boundaries are always computed in Europe/Berlin, never in the
//! timezone of the machine running the scraper.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Timezone the portal reports in.
pub const REPORTING_TZ: Tz = chrono_tz::Europe::Berlin;

/// Start of `day` in the reporting timezone.
///
/// Midnight exists in Europe/Berlin on every day, but if a timezone ever
/// skipped it the first valid instant of the day is returned instead.
#[must_use]
pub fn local_midnight(day: NaiveDate) -> DateTime<Tz> {
    let mut time = day.and_time(NaiveTime::MIN);
    loop {
        match REPORTING_TZ.from_local_datetime(&time) {
            LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => return instant,
            LocalResult::None => time += Duration::minutes(15),
        }
    }
}

/// Today's calendar date in the reporting timezone.
#[must_use]
pub fn today() -> NaiveDate {
    today_at(Utc::now())
}

/// The reporting-timezone date at instant `now`.
#[must_use]
pub fn today_at(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&REPORTING_TZ).date_naive()
}
