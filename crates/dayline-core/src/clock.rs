//! Local wall-clock helpers.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Converts a local date and hour-of-day to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// fall into a spring-forward gap move one hour later.
pub fn local_instant<Tz: TimeZone>(date: NaiveDate, hour: u32, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour));
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Local midnight at the start of `date`.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    local_instant(date, 0, tz)
}

/// The calendar date an instant falls on in `tz`.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}
