pub mod filter;
pub mod models;
pub mod normalize;

pub use filter::filter_and_sort;
pub use models::{EnrichedEventRecord, EventView, RawEventRecord, SourceTag};
pub use normalize::normalize;

use crate::error::FeedResult;
use crate::parser::{extract_events, FeedWindow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Inputs of one pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineParams {
    pub window: FeedWindow,
    pub local_zone: Tz,
    /// Shared by every record of the run
    pub now: DateTime<Utc>,
    pub include_ended: bool,
    pub limit: Option<usize>,
}

/// Parse, normalize, filter and order the events of a raw feed
pub fn run_pipeline(raw_text: &str, params: &PipelineParams) -> FeedResult<Vec<EventView>> {
    let raw_events = extract_events(raw_text, &params.window)?;
    Ok(process_records(raw_events, params))
}

/// Everything after parsing: normalize, filter, sort, truncate and render
pub fn process_records(raw_events: Vec<RawEventRecord>, params: &PipelineParams) -> Vec<EventView> {
    let enriched = raw_events
        .into_iter()
        .map(|raw| normalize(raw, &params.local_zone, params.now))
        .collect();

    filter_and_sort(enriched, params.now, params.include_ended, params.limit)
        .into_iter()
        .map(EnrichedEventRecord::into_view)
        .collect()
}
