use super::models::{EnrichedEventRecord, RawEventRecord};
use crate::utils::time::{next_local_midnight, to_iso};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Resolve a raw record into `zone` and annotate it relative to `now`.
///
/// `now` must be the same instant for every record of one run.
pub fn normalize(raw: RawEventRecord, zone: &Tz, now: DateTime<Utc>) -> EnrichedEventRecord {
    let now_local = now.with_timezone(zone);
    let start_local = raw.start.with_timezone(zone);
    let mut end_local = raw.end.with_timezone(zone);

    // All-day events span whole local days with an exclusive end
    if raw.all_day && start_local.date_naive() == end_local.date_naive() {
        end_local = next_local_midnight(&start_local);
    }

    let ongoing = start_local <= now_local && now_local < end_local;

    let days_remaining = raw.all_day.then(|| {
        let days = end_local
            .date_naive()
            .signed_duration_since(now_local.date_naive())
            .num_days();
        (days - if ongoing { 0 } else { 1 }).max(0)
    });

    EnrichedEventRecord {
        start_iso: to_iso(&start_local),
        end_iso: to_iso(&end_local),
        seconds_until_start: (start_local - now_local).num_seconds(),
        seconds_until_end: (end_local - now_local).num_seconds(),
        duration_seconds: (end_local - start_local).num_seconds(),
        days_remaining,
        ongoing,
        start_local,
        end_local,
        raw,
    }
}
