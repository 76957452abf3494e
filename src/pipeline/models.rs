use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// Which parser produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Primary,
    Fallback,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Primary => write!(f, "primary"),
            SourceTag::Fallback => write!(f, "fallback"),
        }
    }
}

/// An event occurrence as extracted by either parser
#[derive(Debug, Clone, PartialEq)]
pub struct RawEventRecord {
    pub summary: Option<String>,
    pub uid: Option<String>,
    pub start: DateTime<FixedOffset>,
    /// Equal to `start` when the source had no usable end
    pub end: DateTime<FixedOffset>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub all_day: bool,
    pub created: Option<DateTime<FixedOffset>>,
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub url: Option<String>,
    pub recurrence_id: Option<String>,
    pub source: SourceTag,
}

impl RawEventRecord {
    /// Create a record with only its time span set
    pub fn new(
        start: DateTime<FixedOffset>,
        end: Option<DateTime<FixedOffset>>,
        source: SourceTag,
    ) -> Self {
        Self {
            summary: None,
            uid: None,
            start,
            end: end.unwrap_or(start),
            description: None,
            location: None,
            status: None,
            all_day: false,
            created: None,
            last_modified: None,
            url: None,
            recurrence_id: None,
            source,
        }
    }
}

/// A record resolved into the caller's zone and annotated relative to "now".
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct EnrichedEventRecord {
    pub(crate) raw: RawEventRecord,
    pub(crate) start_local: DateTime<Tz>,
    pub(crate) end_local: DateTime<Tz>,
    pub(crate) start_iso: String,
    pub(crate) end_iso: String,
    pub(crate) seconds_until_start: i64,
    pub(crate) seconds_until_end: i64,
    pub(crate) duration_seconds: i64,
    /// Only present for all-day events
    pub(crate) days_remaining: Option<i64>,
    pub(crate) ongoing: bool,
}

impl EnrichedEventRecord {
    pub fn raw(&self) -> &RawEventRecord {
        &self.raw
    }

    pub fn start_local(&self) -> DateTime<Tz> {
        self.start_local
    }

    pub fn end_local(&self) -> DateTime<Tz> {
        self.end_local
    }

    pub fn ongoing(&self) -> bool {
        self.ongoing
    }

    /// Drop the instant values, keeping the rendered fields
    pub fn into_view(self) -> EventView {
        let raw = self.raw;
        EventView {
            name: raw.summary,
            uid: raw.uid,
            start: self.start_iso,
            end: self.end_iso,
            all_day: raw.all_day,
            seconds_until_start: self.seconds_until_start,
            seconds_until_end: self.seconds_until_end,
            duration_seconds: self.duration_seconds,
            days_remaining: self.days_remaining,
            ongoing: self.ongoing,
            url: raw.url,
            description: raw.description,
            location: raw.location,
            status: raw.status,
            created: raw.created.map(|dt| dt.to_rfc3339()),
            last_modified: raw.last_modified.map(|dt| dt.to_rfc3339()),
            recurrence_id: raw.recurrence_id,
            source: raw.source,
        }
    }
}

/// The public, serialisable shape of an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventView {
    pub name: Option<String>,
    pub uid: Option<String>,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    #[serde(rename = "secondsUntilStart")]
    pub seconds_until_start: i64,
    #[serde(rename = "secondsUntilEnd")]
    pub seconds_until_end: i64,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: i64,
    #[serde(rename = "daysRemaining")]
    pub days_remaining: Option<i64>,
    pub ongoing: bool,
    pub url: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub created: Option<String>,
    pub last_modified: Option<String>,
    pub recurrence_id: Option<String>,
    pub source: SourceTag,
}
