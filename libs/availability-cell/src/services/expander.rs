// libs/availability-cell/src/services/expander.rs
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use shared_models::agenda::AvailabilityTemplate;

use crate::models::SlotInterval;

/// Resolve a clinic-local wall-clock time on `date` to an instant.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant. Times that
/// fall inside a spring-forward gap are read with the offset in force before the
/// gap, which moves them forward by the gap length.
pub fn localize(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => Some(at.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let before_gap = tz.from_local_datetime(&(naive - Duration::hours(3))).earliest()?;
            let offset = before_gap.offset().fix().local_minus_utc();
            Some(Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(offset)))))
        }
    }
}

/// First instant of the clinic-local calendar day containing `now`.
pub fn start_of_local_day(tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(tz).date_naive();
    localize(tz, today, NaiveTime::MIN).unwrap_or(now)
}

/// Tile `[start_time, end_time)` of `template` on `date` with back-to-back
/// intervals of `duration_minutes`. A trailing remainder shorter than one
/// interval is dropped. Dates on another weekday yield nothing.
pub fn expand_template(template: &AvailabilityTemplate, date: NaiveDate, tz: &Tz) -> Vec<SlotInterval> {
    if template.weekday() != Some(date.weekday()) || template.duration_minutes == 0 {
        return Vec::new();
    }

    let (Some(window_start), Some(window_end)) = (
        localize(tz, date, template.start_time),
        localize(tz, date, template.end_time),
    ) else {
        return Vec::new();
    };

    let step = Duration::minutes(i64::from(template.duration_minutes));
    let mut intervals = Vec::new();
    let mut cursor = window_start;

    while cursor + step <= window_end {
        intervals.push(SlotInterval {
            start: cursor,
            end: cursor + step,
        });
        cursor += step;
    }

    intervals
}
