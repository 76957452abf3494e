use super::models::EnrichedEventRecord;
use chrono::{DateTime, Utc};

/// Drop finished events, put ongoing ones first, then order by start.
///
/// The sort is stable, so records with equal keys keep their input order.
pub fn filter_and_sort(
    mut records: Vec<EnrichedEventRecord>,
    now: DateTime<Utc>,
    include_ended: bool,
    limit: Option<usize>,
) -> Vec<EnrichedEventRecord> {
    if !include_ended {
        records.retain(|record| record.end_local().with_timezone(&Utc) > now);
    }

    records.sort_by_key(|record| (!record.ongoing(), record.start_local()));

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    records
}
